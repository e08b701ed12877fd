// Seam between the curation pipeline and the upstream archive.
//
// Scanner only ever talks to ContentSearch, so tests drive it with
// testing::MockSearch: no network, deterministic windows.

use arctic_client::{ArcticClient, Comment, Post};
use async_trait::async_trait;

use crate::policy::TimeWindow;

#[async_trait]
pub trait ContentSearch: Send + Sync {
    /// Display form of the post query for `window`, kept in diagnostics.
    fn posts_url(&self, subject: &str, window: &TimeWindow) -> String;

    /// One bounded post search over a relative window.
    async fn search_posts(&self, subject: &str, window: &TimeWindow) -> arctic_client::Result<Vec<Post>>;

    /// Top-level comments for a post.
    async fn search_comments(&self, post_id: &str) -> arctic_client::Result<Vec<Comment>>;
}

#[async_trait]
impl ContentSearch for ArcticClient {
    fn posts_url(&self, subject: &str, window: &TimeWindow) -> String {
        ArcticClient::posts_url(self, subject, window.after, window.before)
    }

    async fn search_posts(&self, subject: &str, window: &TimeWindow) -> arctic_client::Result<Vec<Post>> {
        ArcticClient::search_posts(self, subject, window.after, window.before).await
    }

    async fn search_comments(&self, post_id: &str) -> arctic_client::Result<Vec<Comment>> {
        ArcticClient::search_comments(self, post_id).await
    }
}
