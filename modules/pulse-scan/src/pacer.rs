use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Fixed-interval gate for upstream requests. Successive `wait` calls return
/// at least `interval` apart, across every task sharing the pacer.
pub struct Pacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait for the next free slot and claim it.
    pub async fn wait(&self) {
        let mut next_slot = self.next_slot.lock().await;
        if let Some(at) = *next_slot {
            tokio::time::sleep_until(at).await;
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_wait_is_immediate() {
        let pacer = Pacer::new(Duration::from_millis(200));
        let start = Instant::now();
        pacer.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn successive_waits_are_spaced() {
        let pacer = Pacer::new(Duration::from_millis(200));
        let start = Instant::now();
        for _ in 0..4 {
            pacer.wait().await;
        }
        assert_eq!(start.elapsed(), Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_time_counts_toward_the_interval() {
        let pacer = Pacer::new(Duration::from_millis(200));
        pacer.wait().await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        let before = Instant::now();
        pacer.wait().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_the_budget() {
        let pacer = Pacer::new(Duration::from_millis(200));
        let start = Instant::now();
        tokio::join!(pacer.wait(), pacer.wait(), pacer.wait());
        assert_eq!(start.elapsed(), Duration::from_millis(400));
    }
}
