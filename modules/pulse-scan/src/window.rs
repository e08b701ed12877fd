use arctic_client::{ArcticError, Post};
use pulse_common::DebugInfo;
use tracing::{info, warn};

use crate::policy::{ScanPolicy, TimeWindow};
use crate::quality::apply_quality_filter;
use crate::traits::ContentSearch;

/// Filtered posts from the chosen window.
#[derive(Debug, Clone)]
pub struct WindowedPosts {
    pub posts: Vec<Post>,
    pub window: Option<TimeWindow>,
}

/// Search progressively wider windows, stopping at the first one whose
/// filtered output reaches `policy.accept_threshold`. Otherwise the window
/// with the largest filtered output wins (ties go to the earlier window).
///
/// Overload and rejection errors abort the sequence. Transport and format
/// errors only end their own window; they surface only if no window
/// succeeded at all.
pub async fn fetch_windows(
    search: &dyn ContentSearch,
    subject: &str,
    policy: &ScanPolicy,
    diag: &mut DebugInfo,
) -> Result<WindowedPosts, ArcticError> {
    let mut best = WindowedPosts {
        posts: Vec::new(),
        window: None,
    };
    let mut best_raw = 0;
    let mut best_url = String::new();
    let mut last_error = None;
    let mut any_success = false;

    for window in &policy.windows {
        let url = search.posts_url(subject, window);
        diag.posts_url = url.clone();

        let raw = match search.search_posts(subject, window).await {
            Ok(raw) => raw,
            Err(err) => {
                diag.posts_status = err.status();
                diag.error_details = Some(err.to_string());
                if err.is_overload() || err.is_rejection() {
                    warn!(subject, window = %window.label(), error = %err, "Aborting window sequence");
                    return Err(err);
                }
                warn!(subject, window = %window.label(), error = %err, "Window failed, trying next");
                last_error = Some(err);
                continue;
            }
        };

        any_success = true;
        diag.posts_status = Some(200);
        diag.raw_post_count = raw.len();
        let raw_count = raw.len();
        let filtered = apply_quality_filter(raw);
        diag.after_quality_filter = filtered.len();

        if filtered.len() >= policy.accept_threshold {
            best = WindowedPosts {
                posts: filtered,
                window: Some(*window),
            };
            best_raw = raw_count;
            best_url = url;
            break;
        }
        if filtered.len() > best.posts.len() {
            best = WindowedPosts {
                posts: filtered,
                window: Some(*window),
            };
            best_raw = raw_count;
            best_url = url;
        }
    }

    // Diagnostics describe the chosen window, not the last one attempted.
    if let Some(window) = best.window {
        diag.window_used = window.label();
        diag.posts_url = best_url;
        diag.posts_status = Some(200);
        diag.raw_post_count = best_raw;
        diag.after_quality_filter = best.posts.len();
        info!(subject, window = %diag.window_used, count = best.posts.len(), "Selected window");
        return Ok(best);
    }

    match last_error {
        Some(err) if !any_success => Err(err),
        _ => Ok(best),
    }
}
