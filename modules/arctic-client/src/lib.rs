pub mod error;
pub mod types;

pub use error::{ArcticError, Result};
pub use types::{parse_comments, parse_posts, permalink, Comment, Post, RawComment, RawPost};

use std::time::Duration;

use reqwest::header::{ACCEPT, RETRY_AFTER, USER_AGENT};
use types::{error_detail, COMMENT_FIELDS, POST_FIELDS};

pub const DEFAULT_BASE_URL: &str = "https://arctic-shift.photon-reddit.com";

/// Hard upstream cap on items per search request.
pub const MAX_LIMIT: u32 = 100;

const POST_SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
const COMMENT_SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

pub struct ArcticClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl ArcticClient {
    pub fn new(base_url: &str, user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Display form of a post search request, recorded in scan diagnostics.
    pub fn posts_url(&self, subreddit: &str, after: &str, before: &str) -> String {
        format!(
            "{}/api/posts/search?subreddit={subreddit}&after={after}&before={before}&sort=desc&limit={MAX_LIMIT}&fields={POST_FIELDS}",
            self.base_url
        )
    }

    /// Search posts in a subreddit between two relative offsets ("8d", "36h", "0h").
    pub async fn search_posts(&self, subreddit: &str, after: &str, before: &str) -> Result<Vec<Post>> {
        let url = format!("{}/api/posts/search", self.base_url);
        let limit = MAX_LIMIT.to_string();
        tracing::debug!(subreddit, after, before, "Arctic Shift post search");

        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .timeout(POST_SEARCH_TIMEOUT)
            .query(&[
                ("subreddit", subreddit),
                ("after", after),
                ("before", before),
                ("sort", "desc"),
                ("limit", limit.as_str()),
                ("fields", POST_FIELDS),
            ])
            .send()
            .await?;

        let body = read_checked(resp).await?;
        let posts = parse_posts(&body)?;
        tracing::debug!(subreddit, count = posts.len(), "Fetched posts");
        Ok(posts)
    }

    /// Fetch top-level comments for a post.
    pub async fn search_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let url = format!("{}/api/comments/search", self.base_url);
        let link_id = format!("t3_{post_id}");
        let limit = MAX_LIMIT.to_string();

        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .timeout(COMMENT_SEARCH_TIMEOUT)
            .query(&[
                ("link_id", link_id.as_str()),
                ("sort", "desc"),
                ("limit", limit.as_str()),
                ("fields", COMMENT_FIELDS),
            ])
            .send()
            .await?;

        let body = read_checked(resp).await?;
        let comments = parse_comments(&body)?;
        tracing::debug!(post_id, count = comments.len(), "Fetched comments");
        Ok(comments)
    }
}

/// Read the response body, mapping non-200 statuses into the error taxonomy.
async fn read_checked(resp: reqwest::Response) -> Result<String> {
    let status = resp.status().as_u16();
    let retry_after = resp
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = resp.text().await?;

    match classify_status(status, retry_after.as_deref(), &body) {
        Some(err) => {
            tracing::warn!(status, error = %err, "Arctic Shift request failed");
            Err(err)
        }
        None => Ok(body),
    }
}

/// Map an HTTP status to the error taxonomy. `None` means success.
pub fn classify_status(status: u16, retry_after: Option<&str>, body: &str) -> Option<ArcticError> {
    let err = match status {
        200 => return None,
        400 => ArcticError::BadRequest {
            detail: error_detail(body),
        },
        403 => ArcticError::Forbidden,
        404 => ArcticError::NotFound,
        429 => ArcticError::RateLimited {
            retry_after: retry_after.and_then(|v| v.trim().parse().ok()),
        },
        502 | 503 => ArcticError::Unavailable { status },
        504 => ArcticError::GatewayTimeout,
        other => ArcticError::UnexpectedStatus { status: other },
    };
    Some(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_status_is_not_an_error() {
        assert_eq!(classify_status(200, None, ""), None);
    }

    #[test]
    fn rate_limit_carries_retry_after() {
        let err = classify_status(429, Some("12"), "").unwrap();
        assert_eq!(err.retry_after(), Some(12));
        assert!(err.is_overload());
        assert_eq!(
            err.to_string(),
            "Rate limited (retry after 12s). Try again later."
        );
    }

    #[test]
    fn rate_limit_without_header_has_no_hint() {
        let err = classify_status(429, Some("soon"), "").unwrap();
        assert_eq!(err.retry_after(), None);
        assert_eq!(err.to_string(), "Rate limited. Try again later.");
    }

    #[test]
    fn server_errors_are_overload() {
        for status in [502, 503, 504] {
            let err = classify_status(status, None, "").unwrap();
            assert!(err.is_overload(), "{status} should abort the window sequence");
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn rejections_are_not_overload() {
        for status in [400, 403, 404] {
            let err = classify_status(status, None, "").unwrap();
            assert!(err.is_rejection());
            assert!(!err.is_overload());
        }
    }

    #[test]
    fn bad_request_reports_upstream_detail() {
        let err = classify_status(400, None, r#"{"error":"unknown field"}"#).unwrap();
        assert_eq!(
            err,
            ArcticError::BadRequest {
                detail: Some("unknown field".into())
            }
        );
        assert_eq!(
            err.to_string(),
            "Bad request. Check subreddit name. (unknown field)"
        );
    }

    #[test]
    fn unknown_status_is_neither_overload_nor_rejection() {
        let err = classify_status(418, None, "").unwrap();
        assert_eq!(err, ArcticError::UnexpectedStatus { status: 418 });
        assert!(!err.is_overload());
        assert!(!err.is_rejection());
    }

    #[test]
    fn posts_url_describes_the_query() {
        let client = ArcticClient::new("https://example.test/", "test/1.0");
        let url = client.posts_url("TestGame", "8d", "36h");
        assert!(url.starts_with("https://example.test/api/posts/search?subreddit=TestGame"));
        assert!(url.contains("after=8d&before=36h"));
        assert!(url.contains("limit=100"));
    }
}
