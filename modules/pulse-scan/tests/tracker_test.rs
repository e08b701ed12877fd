//! Tracker integration tests: scan outcome plus summary into a ScanResult.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pulse_common::{Finding, ManualClock, PulseError, SentimentLabel, Summary};
use pulse_scan::testing::{comment, post, MockSearch, StaticSummarizer};
use pulse_scan::{ScanPolicy, ScanRequest, Scanner, Summarizer, SummaryRequest, Tracker};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn scanner(search: MockSearch) -> (Arc<ManualClock>, Arc<Scanner>) {
    let clock = Arc::new(ManualClock::new(start()));
    let policy = ScanPolicy {
        comment_delay: Duration::ZERO,
        ..Default::default()
    };
    let scanner = Arc::new(Scanner::new(Arc::new(search), policy, clock.clone()));
    (clock, scanner)
}

fn search() -> MockSearch {
    let fresh = (start() - chrono::Duration::days(2)).timestamp();
    let stale = (start() - chrono::Duration::days(9)).timestamp();
    let posts = (0..4)
        .map(|i| {
            let mut p = post(&format!("p{i}"));
            p.title = format!("A fairly descriptive post title {i}");
            p.selftext = "y".repeat(250);
            p.author = format!("writer{i}");
            p.score = 5;
            p.num_comments = 3;
            p.created_utc = if i < 3 { fresh } else { stale };
            p
        })
        .collect();
    MockSearch::new()
        .on_any_window(posts)
        .on_comments("p0", vec![comment("c1", "first", 2, 0), comment("c2", "second", 1, 0)])
        .on_comments("p1", vec![comment("c3", "third", 4, 0)])
}

fn summary() -> Summary {
    Summary {
        sentiment_label: SentimentLabel::Mixed,
        sentiment_summary: "People like the update but hate the queue times.".into(),
        themes: vec!["matchmaking".into()],
        pain_points: vec![Finding {
            text: "Long queues".into(),
            evidence: vec!["https://www.reddit.com/comments/p0/".into()],
        }],
        wins: vec![],
    }
}

struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(&self, _request: &SummaryRequest<'_>) -> Result<Summary, PulseError> {
        Err(anyhow!("connection reset").into())
    }
}

#[tokio::test]
async fn successful_scan_becomes_a_full_result() {
    let (_clock, scanner) = scanner(search());
    let summarizer = Arc::new(StaticSummarizer::new(summary()));
    let tracker = Tracker::new(scanner, summarizer.clone());

    let request = ScanRequest::new("r/TestGame")
        .with_label("Test Game")
        .with_keywords("queue");
    let result = tracker.run(&request).await;

    assert_eq!(result.error, None);
    assert_eq!(result.subject, "TestGame");
    assert_eq!(result.created_at, start());
    assert_eq!(result.post_count, 4);
    assert_eq!(result.posts_last_7_days, 3);
    assert_eq!(result.comments_sampled, 3);
    assert_eq!(result.sentiment_label, SentimentLabel::Mixed);
    assert_eq!(result.pain_points, summary().pain_points);
    assert!(!result.cached);

    let source = result.source_posts.iter().find(|p| p.id == "p0").unwrap();
    assert_eq!(source.permalink, "https://www.reddit.com/comments/p0/");
    assert_eq!(source.selftext_preview.chars().count(), 200);

    let debug = result.debug_info.unwrap();
    assert_eq!(debug.after_quality_filter, 4);
    assert_eq!(debug.comments_fetched_for, 2);

    assert_eq!(summarizer.calls(), vec![("Test Game".to_string(), 4, 2)]);
}

#[tokio::test]
async fn label_defaults_to_normalized_subject() {
    let (_clock, scanner) = scanner(search());
    let summarizer = Arc::new(StaticSummarizer::new(summary()));
    let tracker = Tracker::new(scanner, summarizer.clone());

    tracker.run(&ScanRequest::new("reddit.com/r/TestGame")).await;

    assert_eq!(summarizer.calls()[0].0, "TestGame");
}

#[tokio::test]
async fn failed_scan_still_yields_a_persistable_record() {
    let (_clock, scanner) = scanner(MockSearch::new());
    let summarizer = Arc::new(StaticSummarizer::new(summary()));
    let tracker = Tracker::new(scanner, summarizer.clone());

    let result = tracker.run(&ScanRequest::new("Ghosttown")).await;

    assert_eq!(result.post_count, 0);
    assert!(result.source_posts.is_empty());
    assert_eq!(result.sentiment_label, SentimentLabel::Unknown);
    assert!(result
        .error
        .as_deref()
        .unwrap()
        .starts_with("No posts found for r/Ghosttown."));
    assert_eq!(
        result.debug_info.unwrap().error_details.as_deref(),
        Some("No posts found in any time window")
    );
    assert!(summarizer.calls().is_empty());
}

#[tokio::test]
async fn summarizer_error_is_folded_into_the_summary() {
    let (_clock, scanner) = scanner(search());
    let tracker = Tracker::new(scanner, Arc::new(FailingSummarizer));

    let result = tracker.run(&ScanRequest::new("TestGame")).await;

    assert_eq!(result.error, None);
    assert_eq!(result.post_count, 4);
    assert_eq!(result.sentiment_label, SentimentLabel::Unknown);
    assert_eq!(result.sentiment_summary, "AI analysis failed: connection reset");
}

#[tokio::test]
async fn repeat_run_reports_cache_use() {
    let (clock, scanner) = scanner(search());
    let tracker = Tracker::new(scanner, Arc::new(StaticSummarizer::new(summary())));

    let first = tracker.run(&ScanRequest::new("TestGame")).await;
    clock.advance(chrono::Duration::seconds(45));
    let second = tracker.run(&ScanRequest::new("TestGame")).await;

    assert!(!first.cached);
    assert!(second.cached);
    assert_ne!(first.id, second.id);
    assert_eq!(second.post_count, first.post_count);
}
