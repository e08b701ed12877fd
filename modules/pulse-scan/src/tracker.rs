use std::sync::Arc;

use arctic_client::Post;
use chrono::Duration;
use pulse_common::{ScanResult, SourcePost, Summary};
use tracing::{info, warn};
use uuid::Uuid;

use crate::scanner::Scanner;
use crate::summarize::{Summarizer, SummaryRequest};

const PREVIEW_CHARS: usize = 200;
const LAST_WEEK_DAYS: i64 = 7;

/// A subject to track, with the display label and keyword hints handed to
/// the summarizer.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub subject: String,
    pub label: Option<String>,
    pub keywords: Option<String>,
}

impl ScanRequest {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }
}

/// Scanner plus summarizer: one call in, one persistable [`ScanResult`] out.
pub struct Tracker {
    scanner: Arc<Scanner>,
    summarizer: Arc<dyn Summarizer>,
}

impl Tracker {
    pub fn new(scanner: Arc<Scanner>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            scanner,
            summarizer,
        }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub async fn run(&self, request: &ScanRequest) -> ScanResult {
        let created_at = self.scanner.clock().now();
        let outcome = self.scanner.scan(&request.subject).await;

        if let Some(err) = &outcome.error {
            let subject = if outcome.subject.is_empty() {
                request.subject.trim()
            } else {
                outcome.subject.as_str()
            };
            return ScanResult::failed(subject, err.to_string(), outcome.debug, created_at);
        }

        let label = request.label.as_deref().unwrap_or(&outcome.subject);
        let summary_request = SummaryRequest {
            subject_label: label,
            keywords: request.keywords.as_deref(),
            posts: &outcome.posts,
            comments: &outcome.comments,
        };
        let summary = match self.summarizer.summarize(&summary_request).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(subject = %outcome.subject, error = %e, "Summary failed");
                Summary::unavailable(format!("AI analysis failed: {e}"))
            }
        };

        let week_ago = (created_at - Duration::days(LAST_WEEK_DAYS)).timestamp();
        let posts_last_7_days = outcome
            .posts
            .iter()
            .filter(|p| p.created_utc > week_ago)
            .count();

        info!(
            subject = %outcome.subject,
            posts = outcome.posts.len(),
            comments = outcome.comment_count(),
            cached = outcome.cached,
            "Scan complete"
        );

        ScanResult {
            id: Uuid::new_v4(),
            subject: outcome.subject.clone(),
            created_at,
            post_count: outcome.posts.len(),
            posts_last_7_days,
            comments_sampled: outcome.comment_count(),
            sentiment_label: summary.sentiment_label,
            sentiment_summary: summary.sentiment_summary,
            themes: summary.themes,
            pain_points: summary.pain_points,
            wins: summary.wins,
            source_posts: outcome.posts.iter().map(source_post).collect(),
            error: None,
            cached: outcome.cached,
            debug_info: Some(outcome.debug),
        }
    }
}

fn source_post(post: &Post) -> SourcePost {
    SourcePost {
        id: post.id.clone(),
        title: post.title.clone(),
        score: post.score,
        created_utc: post.created_utc,
        permalink: post.permalink.clone(),
        num_comments: post.num_comments,
        selftext_preview: post.selftext.chars().take(PREVIEW_CHARS).collect(),
    }
}
