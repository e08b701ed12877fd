use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DATA_SOURCE: &str = "arctic-shift";

// --- Comment samples ---

/// Public projection of a selected comment. Author and timestamp are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledComment {
    pub id: String,
    pub body: String,
    pub score: i64,
}

/// Selected comments for one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentBundle {
    pub post_id: String,
    pub post_title: String,
    pub comments: Vec<SampledComment>,
}

// --- Diagnostics ---

/// Per-stage counts and upstream details for a single scan attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub subject_normalized: String,
    pub posts_url: String,
    pub posts_status: Option<u16>,
    pub raw_post_count: usize,
    pub after_quality_filter: usize,
    pub final_post_count: usize,
    pub comments_fetched_for: usize,
    pub total_comments: usize,
    /// Window label such as "8d..36h"; empty when no window produced posts.
    pub window_used: String,
    pub error_details: Option<String>,
    pub data_source: String,
}

impl DebugInfo {
    pub fn for_subject(subject: &str) -> Self {
        Self {
            subject_normalized: subject.to_string(),
            posts_url: String::new(),
            posts_status: None,
            raw_post_count: 0,
            after_quality_filter: 0,
            final_post_count: 0,
            comments_fetched_for: 0,
            total_comments: 0,
            window_used: String::new(),
            error_details: None,
            data_source: DATA_SOURCE.to_string(),
        }
    }
}

// --- Summaries ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Mixed,
    Negative,
    Unknown,
}

impl SentimentLabel {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => SentimentLabel::Positive,
            "mixed" => SentimentLabel::Mixed,
            "negative" => SentimentLabel::Negative,
            _ => SentimentLabel::Unknown,
        }
    }
}

/// A pain point or win, backed by links to the posts that support it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub text: String,
    pub evidence: Vec<String>,
}

/// Structured output of the summarizer, already coerced into a safe shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub sentiment_label: SentimentLabel,
    pub sentiment_summary: String,
    pub themes: Vec<String>,
    pub pain_points: Vec<Finding>,
    pub wins: Vec<Finding>,
}

impl Summary {
    /// Placeholder used when analysis could not run or its output was unusable.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            sentiment_label: SentimentLabel::Unknown,
            sentiment_summary: reason.into(),
            themes: Vec::new(),
            pain_points: Vec::new(),
            wins: Vec::new(),
        }
    }
}

// --- Scan results ---

/// A selected post as shown alongside the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePost {
    pub id: String,
    pub title: String,
    pub score: i64,
    pub created_utc: i64,
    pub permalink: String,
    pub num_comments: i64,
    pub selftext_preview: String,
}

/// Everything a caller needs to persist one scan attempt, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub id: Uuid,
    pub subject: String,
    pub created_at: DateTime<Utc>,
    pub post_count: usize,
    pub posts_last_7_days: usize,
    pub comments_sampled: usize,
    pub sentiment_label: SentimentLabel,
    pub sentiment_summary: String,
    pub themes: Vec<String>,
    pub pain_points: Vec<Finding>,
    pub wins: Vec<Finding>,
    pub source_posts: Vec<SourcePost>,
    pub error: Option<String>,
    pub cached: bool,
    pub debug_info: Option<DebugInfo>,
}

impl ScanResult {
    /// A failed attempt: no posts, an error message, and whatever diagnostics were gathered.
    pub fn failed(subject: &str, error: String, debug_info: DebugInfo, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.to_string(),
            created_at,
            post_count: 0,
            posts_last_7_days: 0,
            comments_sampled: 0,
            sentiment_label: SentimentLabel::Unknown,
            sentiment_summary: String::new(),
            themes: Vec::new(),
            pain_points: Vec::new(),
            wins: Vec::new(),
            source_posts: Vec::new(),
            error: Some(error),
            cached: false,
            debug_info: Some(debug_info),
        }
    }
}

/// Read-only view of a cached scan for a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub cached: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<usize>,
}

impl CacheStatus {
    pub fn missing() -> Self {
        Self {
            cached: false,
            valid: false,
            age_seconds: None,
            expires_in: None,
            post_count: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_label_parses_case_insensitively() {
        assert_eq!(SentimentLabel::parse("Positive"), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::parse(" mixed "), SentimentLabel::Mixed);
        assert_eq!(SentimentLabel::parse("NEGATIVE"), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::parse("ecstatic"), SentimentLabel::Unknown);
    }

    #[test]
    fn missing_cache_status_serializes_minimally() {
        let json = serde_json::to_value(CacheStatus::missing()).unwrap();
        assert_eq!(json, serde_json::json!({"cached": false, "valid": false}));
    }

    #[test]
    fn debug_info_defaults_to_arctic_shift() {
        let debug = DebugInfo::for_subject("TestGame");
        assert_eq!(debug.data_source, "arctic-shift");
        assert_eq!(debug.subject_normalized, "TestGame");
        assert_eq!(debug.window_used, "");
    }
}
