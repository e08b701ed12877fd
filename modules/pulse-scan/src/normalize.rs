use regex::Regex;
use std::sync::LazyLock;

static SUBREDDIT_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:www\.)?reddit\.com/r/([^/\s?]+)").unwrap()
});

/// Canonicalize a free-form subject ("https://reddit.com/r/Name/", "r/Name", "Name")
/// into the bare community name. Returns an empty string when nothing is left.
pub fn normalize_subject(input: &str) -> String {
    let trimmed = input.trim();
    if let Some(caps) = SUBREDDIT_URL_RE.captures(trimmed) {
        return caps[1].to_string();
    }
    let without_prefix = match trimmed.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("r/") => &trimmed[2..],
        _ => trimmed,
    };
    without_prefix.trim_end_matches('/').to_string()
}

/// Cache and throttle key for a subject.
pub fn subject_key(subject: &str) -> String {
    subject.to_lowercase()
}
