use std::time::Duration;

use pulse_common::Config;

/// A relative time range: look back to `after`, excluding everything newer than `before`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub after: &'static str,
    pub before: &'static str,
}

impl TimeWindow {
    pub const fn new(after: &'static str, before: &'static str) -> Self {
        Self { after, before }
    }

    /// Label recorded in diagnostics, e.g. "8d..36h".
    pub fn label(&self) -> String {
        format!("{}..{}", self.after, self.before)
    }
}

/// Progressively wider windows: skip the last 36h, then the last 12h, then nothing.
pub const DEFAULT_WINDOWS: [TimeWindow; 3] = [
    TimeWindow::new("8d", "36h"),
    TimeWindow::new("8d", "12h"),
    TimeWindow::new("8d", "0h"),
];

/// Every limit the curation pipeline enforces.
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    pub windows: Vec<TimeWindow>,
    /// Filtered count at which a window is accepted without trying wider ones.
    pub accept_threshold: usize,

    pub max_posts: usize,
    pub max_posts_per_author: usize,
    pub max_zero_reply_posts: usize,
    pub min_recent_posts: usize,
    pub recent_window: chrono::Duration,

    pub comment_posts: usize,
    pub comments_per_post: usize,
    pub comment_truncate: usize,

    pub cache_ttl: Duration,
    pub throttle_interval: Duration,
    pub comment_delay: Duration,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            windows: DEFAULT_WINDOWS.to_vec(),
            accept_threshold: 150,
            max_posts: 100,
            max_posts_per_author: 3,
            max_zero_reply_posts: 20,
            min_recent_posts: 20,
            recent_window: chrono::Duration::days(3),
            comment_posts: 15,
            comments_per_post: 10,
            comment_truncate: 400,
            cache_ttl: Duration::from_secs(600),
            throttle_interval: Duration::from_secs(30),
            comment_delay: Duration::from_millis(200),
        }
    }
}

impl ScanPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache_ttl: config.cache_ttl,
            throttle_interval: config.throttle_interval,
            comment_delay: config.comment_delay,
            ..Self::default()
        }
    }
}
