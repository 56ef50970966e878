//! Token bucket rate limiter.
//!
//! Models a token bucket: tokens accrue at `refill_rate` tokens/second up to
//! `capacity`. Each request consumes one token. [`RateLimiter::acquire`]
//! suspends until a token is available, or fails straight away when the
//! caller's deadline would pass first.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::ClientError;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum tokens in the bucket (burst size).
    pub capacity: f64,
    /// Token refill rate (tokens per second).
    pub refill_rate: f64,
}

impl RateLimiterConfig {
    /// `n` requests per second with a burst of `n`.
    pub fn per_second(n: u32) -> Self {
        let n = f64::from(n.max(1));
        Self {
            capacity: n,
            refill_rate: n,
        }
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::per_second(33)
    }
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Thread-safe token bucket.
pub struct TokenBucket {
    config: RateLimiterConfig,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            state: Mutex::new(BucketState {
                tokens: config.capacity,
                last_refill: Instant::now(),
            }),
            config,
        }
    }

    /// Try to take `cost` tokens; `false` when the bucket is short.
    pub fn try_acquire(&self, cost: f64) -> bool {
        let mut state = self.lock();
        self.refill(&mut state);

        if state.tokens >= cost {
            state.tokens -= cost;
            true
        } else {
            false
        }
    }

    /// Estimated wait before `cost` tokens are available; `None` when a
    /// bucket that does not refill is short.
    pub fn wait_time(&self, cost: f64) -> Option<Duration> {
        let mut state = self.lock();
        self.refill(&mut state);
        let deficit = cost - state.tokens;
        if deficit <= 0.0 {
            Some(Duration::ZERO)
        } else if self.config.refill_rate <= 0.0 {
            None
        } else {
            Some(Duration::from_secs_f64(deficit / self.config.refill_rate))
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BucketState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.config.refill_rate).min(self.config.capacity);
        state.last_refill = now;
    }
}

/// A rate limiter wrapping the token bucket.
pub struct RateLimiter {
    bucket: TokenBucket,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            bucket: TokenBucket::new(config),
        }
    }

    pub fn try_acquire(&self) -> bool {
        self.bucket.try_acquire(1.0)
    }

    pub fn wait_time(&self) -> Option<Duration> {
        self.bucket.wait_time(1.0)
    }

    /// Wait for one token. Returns [`ClientError::Cancelled`] without
    /// waiting when the token cannot be had before `deadline`, or at all.
    pub async fn acquire(&self, deadline: Option<Instant>) -> Result<(), ClientError> {
        loop {
            if self.try_acquire() {
                return Ok(());
            }
            let Some(wait) = self.wait_time() else {
                tracing::warn!("rate limiter does not refill, giving up");
                return Err(ClientError::Cancelled);
            };
            let wait = wait.max(Duration::from_millis(1));
            if let Some(deadline) = deadline {
                if Instant::now() + wait > deadline {
                    return Err(ClientError::Cancelled);
                }
            }
            tracing::trace!(wait_ms = wait.as_millis(), "rate limited, waiting for token");
            tokio::time::sleep(wait).await;
        }
    }
}
