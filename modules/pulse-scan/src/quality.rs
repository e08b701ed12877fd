use arctic_client::Post;

const MIN_BODY_CHARS: usize = 80;
const MIN_TITLE_CHARS: usize = 25;

/// A post is low-signal only when every signal is weak: no replies, score of
/// at most 1, a short or empty body, and a short title.
pub fn is_low_signal(post: &Post) -> bool {
    post.num_comments == 0
        && post.score <= 1
        && post.selftext.chars().count() < MIN_BODY_CHARS
        && post.title.chars().count() < MIN_TITLE_CHARS
}

/// Drop low-signal posts, preserving order.
pub fn apply_quality_filter(posts: Vec<Post>) -> Vec<Post> {
    posts.into_iter().filter(|p| !is_low_signal(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::post;

    fn weak() -> Post {
        let mut p = post("weak");
        p.title = "short".into();
        p.selftext = String::new();
        p.score = 1;
        p.num_comments = 0;
        p
    }

    #[test]
    fn drops_post_with_every_signal_weak() {
        assert!(is_low_signal(&weak()));
    }

    #[test]
    fn any_single_strong_signal_rescues() {
        let mut replies = weak();
        replies.num_comments = 1;
        assert!(!is_low_signal(&replies));

        let mut score = weak();
        score.score = 2;
        assert!(!is_low_signal(&score));

        let mut body = weak();
        body.selftext = "x".repeat(80);
        assert!(!is_low_signal(&body));

        let mut title = weak();
        title.title = "t".repeat(25);
        assert!(!is_low_signal(&title));
    }

    #[test]
    fn boundaries_just_below_thresholds_are_dropped() {
        let mut p = weak();
        p.selftext = "x".repeat(79);
        p.title = "t".repeat(24);
        p.score = -5;
        assert!(is_low_signal(&p));
    }

    #[test]
    fn filter_preserves_order_of_survivors() {
        let mut a = post("a");
        a.num_comments = 3;
        let mut c = post("c");
        c.score = 10;
        let kept = apply_quality_filter(vec![a, weak(), c]);
        let ids: Vec<&str> = kept.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
