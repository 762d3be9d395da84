//! Spacing between consecutive target-network lookups.

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait Pacer: Send + Sync {
    /// Called once after every enrichment request.
    async fn pause(&self);
}

/// Sleeps for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self) {
        tokio::time::sleep(self.0).await;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self) {}
}

/// `0` disables pacing entirely.
#[must_use]
pub fn from_millis(delay_ms: u64) -> std::sync::Arc<dyn Pacer> {
    if delay_ms == 0 {
        std::sync::Arc::new(NoDelay)
    } else {
        std::sync::Arc::new(FixedDelay(Duration::from_millis(delay_ms)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_sleeps() {
        let start = tokio::time::Instant::now();
        FixedDelay(Duration::from_secs(2)).pause().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_returns_immediately() {
        let start = tokio::time::Instant::now();
        from_millis(0).pause().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
