//! Miscellaneous helpers for the swapper

use std::{
    fmt::Display,
    future::Future,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use tracing::warn;

// -------------
// | Constants |
// -------------

/// The default number of attempts for a read-only call
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
/// The default delay before the first retry
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(250);
/// The default cap on the delay between retries
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(2);

// ---------
// | Retry |
// ---------

/// A bounded exponential backoff policy
///
/// Only read-only calls are retried; submissions are never passed through this
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// The total number of attempts, including the first
    pub max_attempts: usize,
    /// The delay before the first retry
    pub initial_backoff: Duration,
    /// The cap on the delay between retries
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryConfig {
    /// A policy that makes a single attempt
    pub fn no_retry() -> Self {
        Self { max_attempts: 1, ..Default::default() }
    }

    /// The longest a retried operation can take when each attempt is bounded
    /// by `attempt_timeout`, including the backoff between attempts
    pub fn max_elapsed(&self, attempt_timeout: Duration) -> Duration {
        let attempts = self.max_attempts.max(1);
        let mut total = attempt_timeout * attempts as u32;
        let mut backoff = self.initial_backoff;
        for _ in 1..attempts {
            total += backoff;
            backoff = (backoff * 2).min(self.max_backoff);
        }

        total
    }
}

/// Run `op`, retrying errors accepted by `is_retryable` with exponential
/// backoff until the attempts are exhausted
pub async fn retry_with_backoff<T, E, F, Fut, R>(
    config: &RetryConfig,
    label: &str,
    is_retryable: R,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let mut backoff = config.initial_backoff;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(res) => return Ok(res),
            Err(e) if attempt < config.max_attempts && is_retryable(&e) => {
                warn!("{label} failed (attempt {attempt}/{}): {e}", config.max_attempts);
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(config.max_backoff);
                attempt += 1;
            },
            Err(e) => return Err(e),
        }
    }
}

// --------
// | Time |
// --------

/// The current unix timestamp in seconds
pub fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}
