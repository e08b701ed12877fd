use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pulse_common::Clock;
use tokio::sync::Mutex;

/// Minimum interval between upstream attempts per subject key.
pub struct ThrottleGuard {
    last_attempt: Mutex<HashMap<String, DateTime<Utc>>>,
    interval: Duration,
    clock: Arc<dyn Clock>,
}

impl ThrottleGuard {
    pub fn new(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            last_attempt: Mutex::new(HashMap::new()),
            interval,
            clock,
        }
    }

    /// Whole seconds left before `key` may be scanned again, rounded up.
    /// `None` means the attempt is allowed.
    pub async fn remaining(&self, key: &str) -> Option<u64> {
        let last_attempt = self.last_attempt.lock().await;
        let last = last_attempt.get(key)?;
        let elapsed = (self.clock.now() - *last).to_std().unwrap_or(Duration::ZERO);
        let left = self.interval.checked_sub(elapsed).filter(|d| !d.is_zero())?;
        Some(left.as_millis().div_ceil(1000) as u64)
    }

    /// Record an attempt for `key`, whatever its outcome.
    pub async fn record(&self, key: &str) {
        let now = self.clock.now();
        self.last_attempt.lock().await.insert(key.to_string(), now);
    }
}
