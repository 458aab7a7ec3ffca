//! Waiting between device-code polls.

use std::time::Duration;

use async_trait::async_trait;

/// Amount added to the poll interval each time Root answers `slow_down`
pub const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Suspends the device-code poll loop between attempts
#[async_trait]
pub trait PollSleeper: Send + Sync {
    /// Wait for `duration` before the next poll
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl PollSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
