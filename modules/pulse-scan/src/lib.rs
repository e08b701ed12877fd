pub mod cache;
pub mod comments;
pub mod normalize;
pub mod pacer;
pub mod policy;
pub mod quality;
pub mod rank;
pub mod scanner;
pub mod select;
pub mod summarize;
pub mod throttle;
pub mod tracker;
pub mod traits;
pub mod window;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use normalize::normalize_subject;
pub use policy::{ScanPolicy, TimeWindow};
pub use scanner::{ScanError, ScanOutcome, Scanner};
pub use summarize::{OpenAiSummarizer, Summarizer, SummaryRequest, UnavailableSummarizer};
pub use tracker::{ScanRequest, Tracker};
pub use traits::ContentSearch;
