use arctic_client::Post;

const BODY_BONUS_CHARS: f64 = 500.0;
const BODY_BONUS_WEIGHT: f64 = 0.35;
const REPLY_WEIGHT: f64 = 2.0;

/// Relevance score: log-damped engagement with replies weighted double, plus
/// a small capped bonus for body length. Negative counts are clamped to zero.
pub fn rank(post: &Post) -> f64 {
    let score = post.score.max(0) as f64;
    let replies = post.num_comments.max(0) as f64;
    let body_bonus = (post.selftext.chars().count() as f64 / BODY_BONUS_CHARS).min(1.0);

    (score + 1.0).ln() + REPLY_WEIGHT * (replies + 1.0).ln() + BODY_BONUS_WEIGHT * body_bonus
}

/// Indices of `posts` ordered by rank, highest first. Equal ranks keep input order.
pub fn rank_order(posts: &[Post]) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = posts.iter().map(rank).enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}
