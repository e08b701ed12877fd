use std::borrow::Cow;
use std::sync::Arc;

use arctic_client::{Comment, Post};
use pulse_common::{Clock, CommentBundle, SampledComment};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::pacer::Pacer;
use crate::policy::ScanPolicy;
use crate::rank::rank_order;
use crate::traits::ContentSearch;

static USER_MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/?u/[A-Za-z0-9_-]+").unwrap());

const USER_PLACEHOLDER: &str = "[user]";
const ELLIPSIS: &str = "...";

/// Replace `u/name` and `/u/name` mentions with a placeholder.
pub fn redact_mentions(body: &str) -> Cow<'_, str> {
    USER_MENTION_RE.replace_all(body, USER_PLACEHOLDER)
}

/// Cut `body` to `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_chars(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &body[..cut]),
        None => body.to_string(),
    }
}

/// Pick up to `max_count` comments by score, then body length, then recency,
/// all descending. Bodies are redacted before truncation so a placeholder can
/// never push a body past `max_chars` plus the ellipsis.
pub fn select_best_comments(comments: &[Comment], max_count: usize, max_chars: usize) -> Vec<SampledComment> {
    let mut ordered: Vec<&Comment> = comments.iter().collect();
    ordered.sort_by(|a, b| {
        (b.score, b.body.chars().count(), b.created_utc).cmp(&(
            a.score,
            a.body.chars().count(),
            a.created_utc,
        ))
    });

    ordered
        .into_iter()
        .take(max_count)
        .map(|c| SampledComment {
            id: c.id.clone(),
            body: truncate_chars(&redact_mentions(&c.body), max_chars),
            score: c.score,
        })
        .collect()
}

/// Fetches and condenses replies for the highest-ranked posts.
pub struct CommentSampler {
    cache: TtlCache<Vec<Comment>>,
    pacer: Pacer,
    top_posts: usize,
    per_post: usize,
    max_chars: usize,
}

impl CommentSampler {
    pub fn new(policy: &ScanPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: TtlCache::new(policy.cache_ttl, clock),
            pacer: Pacer::new(policy.comment_delay),
            top_posts: policy.comment_posts,
            per_post: policy.comments_per_post,
            max_chars: policy.comment_truncate,
        }
    }

    /// Sample comments for the top posts by rank. Posts whose comments fail
    /// to load or yield nothing are left out; a failure never aborts the scan.
    pub async fn sample(&self, search: &dyn ContentSearch, posts: &[Post]) -> Vec<CommentBundle> {
        let mut bundles = Vec::new();

        for (idx, _) in rank_order(posts).into_iter().take(self.top_posts) {
            let post = &posts[idx];
            let Some(comments) = self.comments_for(search, &post.id).await else {
                continue;
            };
            let best = select_best_comments(&comments, self.per_post, self.max_chars);
            if best.is_empty() {
                continue;
            }
            bundles.push(CommentBundle {
                post_id: post.id.clone(),
                post_title: post.title.clone(),
                comments: best,
            });
        }

        bundles
    }

    /// Cached comments for `post_id`, or a paced upstream fetch.
    async fn comments_for(&self, search: &dyn ContentSearch, post_id: &str) -> Option<Vec<Comment>> {
        if let Some(hit) = self.cache.get(post_id).await {
            debug!(post_id, age_secs = hit.age.as_secs(), "Using cached comments");
            return Some(hit.value);
        }

        self.pacer.wait().await;
        match search.search_comments(post_id).await {
            Ok(comments) => {
                self.cache.put(post_id, comments.clone()).await;
                Some(comments)
            }
            Err(err) => {
                warn!(post_id, error = %err, "Failed to fetch comments");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::comment;

    #[test]
    fn orders_by_score_then_length_then_recency() {
        let comments = vec![
            comment("short", "ok", 5, 300),
            comment("long", "a much longer reply", 5, 100),
            comment("top", "x", 9, 0),
            comment("long_new", "a much longer reply", 5, 200),
        ];
        let picked = select_best_comments(&comments, 10, 400);
        let ids: Vec<&str> = picked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "long_new", "long", "short"]);
    }

    #[test]
    fn keeps_at_most_max_count() {
        let comments: Vec<Comment> = (0..25)
            .map(|i| comment(&format!("c{i}"), "body", i, 0))
            .collect();
        let picked = select_best_comments(&comments, 10, 400);
        assert_eq!(picked.len(), 10);
        assert_eq!(picked[0].id, "c24");
    }

    #[test]
    fn truncates_long_bodies_with_ellipsis() {
        let comments = vec![comment("c", &"é".repeat(450), 1, 0)];
        let picked = select_best_comments(&comments, 10, 400);
        assert_eq!(picked[0].body.chars().count(), 403);
        assert!(picked[0].body.ends_with("..."));
    }

    #[test]
    fn exact_length_body_is_untouched() {
        assert_eq!(truncate_chars(&"a".repeat(400), 400), "a".repeat(400));
    }

    #[test]
    fn redacts_user_mentions() {
        let comments = vec![comment(
            "c",
            "thanks /u/Some_User and u/other-one, ask u/third",
            1,
            0,
        )];
        let picked = select_best_comments(&comments, 10, 400);
        assert_eq!(picked[0].body, "thanks [user] and [user], ask [user]");
        assert!(!USER_MENTION_RE.is_match(&picked[0].body));
    }

    #[test]
    fn redaction_never_exceeds_length_bound() {
        let body = "u/a ".repeat(200);
        let picked = select_best_comments(&[comment("c", &body, 1, 0)], 10, 400);
        assert!(picked[0].body.chars().count() <= 403);
        assert!(!USER_MENTION_RE.is_match(&picked[0].body));
    }

    #[test]
    fn projection_drops_author() {
        let picked = select_best_comments(&[comment("c", "hi", 3, 7)], 10, 400);
        assert_eq!(
            picked[0],
            SampledComment {
                id: "c".into(),
                body: "hi".into(),
                score: 3
            }
        );
    }
}
