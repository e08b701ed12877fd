// Test mocks and fixtures for the scan pipeline.
//
// - MockSearch (ContentSearch): window label → canned response, post id → comments
// - StaticSummarizer (Summarizer): returns a fixed Summary and records requests
// - post()/comment(): fixture constructors with neutral defaults

use std::collections::HashMap;
use std::sync::Mutex;

use arctic_client::{permalink, ArcticError, Comment, Post};
use async_trait::async_trait;
use pulse_common::{PulseError, Summary};

use crate::policy::TimeWindow;
use crate::summarize::{Summarizer, SummaryRequest};
use crate::traits::ContentSearch;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A post with an id and everything else empty or zero.
pub fn post(id: &str) -> Post {
    Post {
        id: id.to_string(),
        title: String::new(),
        selftext: String::new(),
        score: 0,
        created_utc: 0,
        num_comments: 0,
        author: String::new(),
        permalink: permalink(id),
    }
}

pub fn comment(id: &str, body: &str, score: i64, created_utc: i64) -> Comment {
    Comment {
        id: id.to_string(),
        body: body.to_string(),
        score,
        created_utc,
        author: format!("author_{id}"),
    }
}

// ---------------------------------------------------------------------------
// MockSearch
// ---------------------------------------------------------------------------

/// Window-label-based search mock. Unregistered windows return no posts;
/// unregistered posts return no comments. Every request is logged.
#[derive(Default)]
pub struct MockSearch {
    windows: HashMap<String, arctic_client::Result<Vec<Post>>>,
    fallback: Option<Vec<Post>>,
    comments: HashMap<String, arctic_client::Result<Vec<Comment>>>,
    yield_on_search: bool,
    window_log: Mutex<Vec<String>>,
    comment_log: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to the window labelled `label` (e.g. "8d..36h") with `posts`.
    pub fn on_window(mut self, label: &str, posts: Vec<Post>) -> Self {
        self.windows.insert(label.to_string(), Ok(posts));
        self
    }

    pub fn on_window_error(mut self, label: &str, err: ArcticError) -> Self {
        self.windows.insert(label.to_string(), Err(err));
        self
    }

    /// Respond to every unregistered window with `posts`.
    pub fn on_any_window(mut self, posts: Vec<Post>) -> Self {
        self.fallback = Some(posts);
        self
    }

    pub fn on_comments(mut self, post_id: &str, comments: Vec<Comment>) -> Self {
        self.comments.insert(post_id.to_string(), Ok(comments));
        self
    }

    pub fn on_comments_error(mut self, post_id: &str, err: ArcticError) -> Self {
        self.comments.insert(post_id.to_string(), Err(err));
        self
    }

    /// Suspend once inside every post search so concurrent scans interleave.
    pub fn yielding(mut self) -> Self {
        self.yield_on_search = true;
        self
    }

    /// Window labels requested so far, in order.
    pub fn window_requests(&self) -> Vec<String> {
        self.window_log.lock().unwrap().clone()
    }

    /// Post ids whose comments were requested so far, in order.
    pub fn comment_requests(&self) -> Vec<String> {
        self.comment_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentSearch for MockSearch {
    fn posts_url(&self, subject: &str, window: &TimeWindow) -> String {
        format!("mock://posts/{subject}/{}", window.label())
    }

    async fn search_posts(&self, _subject: &str, window: &TimeWindow) -> arctic_client::Result<Vec<Post>> {
        let label = window.label();
        self.window_log.lock().unwrap().push(label.clone());
        if self.yield_on_search {
            tokio::task::yield_now().await;
        }
        match self.windows.get(&label) {
            Some(response) => response.clone(),
            None => Ok(self.fallback.clone().unwrap_or_default()),
        }
    }

    async fn search_comments(&self, post_id: &str) -> arctic_client::Result<Vec<Comment>> {
        self.comment_log.lock().unwrap().push(post_id.to_string());
        self.comments
            .get(post_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ---------------------------------------------------------------------------
// StaticSummarizer
// ---------------------------------------------------------------------------

/// Returns the same Summary for every request and records what it was shown.
pub struct StaticSummarizer {
    summary: Summary,
    seen: Mutex<Vec<(String, usize, usize)>>,
}

impl StaticSummarizer {
    pub fn new(summary: Summary) -> Self {
        Self {
            summary,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// (subject label, post count, bundle count) for each call.
    pub fn calls(&self) -> Vec<(String, usize, usize)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for StaticSummarizer {
    async fn summarize(&self, request: &SummaryRequest<'_>) -> Result<Summary, PulseError> {
        self.seen.lock().unwrap().push((
            request.subject_label.to_string(),
            request.posts.len(),
            request.comments.len(),
        ));
        Ok(self.summary.clone())
    }
}
