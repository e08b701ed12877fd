use std::sync::Arc;

use arctic_client::{ArcticError, Post};
use pulse_common::{CacheStatus, Clock, CommentBundle, DebugInfo};
use thiserror::Error;
use tracing::{info, warn};

use crate::cache::TtlCache;
use crate::comments::CommentSampler;
use crate::normalize::{normalize_subject, subject_key};
use crate::policy::ScanPolicy;
use crate::select::select_diverse;
use crate::throttle::ThrottleGuard;
use crate::traits::ContentSearch;
use crate::window::fetch_windows;

/// Why a scan produced no posts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Invalid subreddit name.")]
    InvalidSubject,

    #[error("Please wait {remaining_secs} seconds before scanning r/{subject} again.")]
    Throttled { subject: String, remaining_secs: u64 },

    #[error(transparent)]
    Upstream(#[from] ArcticError),

    #[error("No posts found for r/{subject}. The subreddit may be empty, private, or the name may be incorrect.")]
    NoContent { subject: String },
}

/// Result of one scan attempt. Failures carry the same diagnostics as
/// successes so callers can persist them.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub subject: String,
    pub posts: Vec<Post>,
    pub comments: Vec<CommentBundle>,
    pub cached: bool,
    pub error: Option<ScanError>,
    pub debug: DebugInfo,
}

impl ScanOutcome {
    fn failed(subject: &str, error: ScanError, diag: DebugInfo) -> Self {
        Self {
            subject: subject.to_string(),
            posts: Vec::new(),
            comments: Vec::new(),
            cached: false,
            error: Some(error),
            debug: diag,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.iter().map(|b| b.comments.len()).sum()
    }
}

#[derive(Debug, Clone)]
struct CachedScan {
    posts: Vec<Post>,
    comments: Vec<CommentBundle>,
}

/// Runs the curation pipeline for a subject, guarded by a per-subject
/// throttle and a short-lived result cache.
///
/// Concurrent scans of the same subject are not coalesced: both may miss the
/// cache, both hit upstream, and the later write wins.
pub struct Scanner {
    search: Arc<dyn ContentSearch>,
    policy: ScanPolicy,
    clock: Arc<dyn Clock>,
    results: TtlCache<CachedScan>,
    throttle: ThrottleGuard,
    sampler: CommentSampler,
}

impl Scanner {
    pub fn new(search: Arc<dyn ContentSearch>, policy: ScanPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            results: TtlCache::new(policy.cache_ttl, clock.clone()),
            throttle: ThrottleGuard::new(policy.throttle_interval, clock.clone()),
            sampler: CommentSampler::new(&policy, clock.clone()),
            search,
            policy,
            clock,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Scan `raw_subject`. Never fails outright; see [`ScanOutcome::error`].
    pub async fn scan(&self, raw_subject: &str) -> ScanOutcome {
        let subject = normalize_subject(raw_subject);
        if subject.is_empty() {
            let mut diag = DebugInfo::for_subject("");
            diag.error_details = Some("Empty subreddit after normalization".to_string());
            return ScanOutcome::failed("", ScanError::InvalidSubject, diag);
        }

        let key = subject_key(&subject);
        let mut diag = DebugInfo::for_subject(&subject);

        if let Some(remaining_secs) = self.throttle.remaining(&key).await {
            info!(subject = %subject, remaining_secs, "Scan throttled");
            diag.error_details = Some(format!("Throttled: {remaining_secs}s remaining"));
            let err = ScanError::Throttled {
                subject: subject.clone(),
                remaining_secs,
            };
            return ScanOutcome::failed(&subject, err, diag);
        }

        let outcome = self.run_pipeline(&subject, &key, diag).await;
        self.throttle.record(&key).await;
        outcome
    }

    async fn run_pipeline(&self, subject: &str, key: &str, mut diag: DebugInfo) -> ScanOutcome {
        if let Some(hit) = self.results.get(key).await {
            let age = hit.age.as_secs();
            info!(subject, age_secs = age, "Using cached data");
            diag.error_details = Some(format!("Using cached data (age: {age}s)"));
            diag.final_post_count = hit.value.posts.len();
            diag.comments_fetched_for = hit.value.comments.len();
            diag.total_comments = hit.value.comments.iter().map(|b| b.comments.len()).sum();
            return ScanOutcome {
                subject: subject.to_string(),
                posts: hit.value.posts,
                comments: hit.value.comments,
                cached: true,
                error: None,
                debug: diag,
            };
        }

        let windowed = match fetch_windows(self.search.as_ref(), subject, &self.policy, &mut diag).await {
            Ok(windowed) => windowed,
            Err(err) => {
                warn!(subject, error = %err, "Post search failed");
                return ScanOutcome::failed(subject, ScanError::Upstream(err), diag);
            }
        };

        if windowed.posts.is_empty() {
            diag.error_details = Some("No posts found in any time window".to_string());
            let err = ScanError::NoContent {
                subject: subject.to_string(),
            };
            return ScanOutcome::failed(subject, err, diag);
        }

        let posts = select_diverse(windowed.posts, self.clock.now(), &self.policy);
        diag.final_post_count = posts.len();
        info!(subject, window = %diag.window_used, count = posts.len(), "Selected posts");

        let comments = self.sampler.sample(self.search.as_ref(), &posts).await;
        diag.comments_fetched_for = comments.len();
        diag.total_comments = comments.iter().map(|b| b.comments.len()).sum();

        self.results
            .put(
                key,
                CachedScan {
                    posts: posts.clone(),
                    comments: comments.clone(),
                },
            )
            .await;

        ScanOutcome {
            subject: subject.to_string(),
            posts,
            comments,
            cached: false,
            error: None,
            debug: diag,
        }
    }

    /// Report on the cached scan for `raw_subject` without fetching anything.
    pub async fn cache_status(&self, raw_subject: &str) -> CacheStatus {
        let key = subject_key(&normalize_subject(raw_subject));
        let ttl = self.results.ttl();
        match self.results.inspect(&key, |scan| scan.posts.len()).await {
            Some((post_count, age)) => CacheStatus {
                cached: true,
                valid: age < ttl,
                age_seconds: Some(age.as_secs()),
                expires_in: Some(ttl.saturating_sub(age).as_secs()),
                post_count: Some(post_count),
            },
            None => CacheStatus::missing(),
        }
    }
}
