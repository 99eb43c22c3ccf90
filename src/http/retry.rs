//! Retry policies for gateway requests.
//!
//! Ledger writes are never retried: a resubmitted transaction could execute twice.

use crate::error::HttpError;
use std::time::Duration;

/// How a gateway read is retried.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// One attempt. Every write uses this; reads do unless the client opts in.
    #[default]
    None,
    /// `RetryConfig::for_reads()`.
    Idempotent,
    Custom(RetryConfig),
}

impl RetryPolicy {
    /// Resolved config, or `None` for a single attempt.
    pub fn config(&self) -> Option<RetryConfig> {
        match self {
            RetryPolicy::None => None,
            RetryPolicy::Idempotent => Some(RetryConfig::for_reads()),
            RetryPolicy::Custom(c) => Some(c.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, the first request included. Values below 1 act as 1.
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Growth of the delay between consecutive retries.
    pub multiplier: u32,
    /// Spread each delay by up to ±25%.
    pub jitter: bool,
    /// Server statuses worth another attempt.
    pub retry_on: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::for_reads()
    }
}

impl RetryConfig {
    /// Gateway reads: four attempts, 250ms doubling up to 8s, on 429 and 5xx gateway errors.
    pub fn for_reads() -> Self {
        Self {
            attempts: 4,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(8),
            multiplier: 2,
            jitter: true,
            retry_on: vec![429, 502, 503, 504],
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.attempts.max(1)
    }

    /// Whether a failed attempt is worth repeating.
    pub fn should_retry(&self, error: &HttpError) -> bool {
        match error {
            HttpError::ServerError { status, .. } => self.retry_on.contains(status),
            HttpError::RateLimited { .. } | HttpError::Timeout => true,
            HttpError::Reqwest(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Wait before retry `n` (0 = the wait after the first failure).
    pub fn backoff(&self, n: u32) -> Duration {
        let factor = u64::from(self.multiplier.max(1)).saturating_pow(n.min(16));
        let base = (self.base_delay.as_millis() as u64).saturating_mul(factor);
        let capped = base.min(self.max_delay.as_millis() as u64);

        if !self.jitter || capped == 0 {
            return Duration::from_millis(capped);
        }
        let spread = capped / 4;
        let offset = rand::random::<u64>() % (2 * spread + 1);
        Duration::from_millis(capped - spread + offset)
    }
}
