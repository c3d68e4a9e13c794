//! Bounded retry policy for randomized operations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::CryptoError;

/// Default attempt bound for signing and key generation.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1024;

/// How many times a randomized operation is attempted before giving up.
///
/// Deserializes from host configuration with camelCase keys; missing fields
/// take their defaults.
///
/// ```
/// use chain_crypto::ecdsa::RetryPolicy;
///
/// let policy: RetryPolicy = serde_json::from_str(r#"{"maxAttempts": 8}"#).unwrap();
/// assert_eq!(policy.max_attempts, 8);
/// assert_eq!(policy.backoff(), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Maximum number of attempts; zero fails immediately.
    pub max_attempts: usize,
    /// Pause between failed attempts, in milliseconds.
    pub backoff_ms: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_ms: None,
        }
    }
}

impl RetryPolicy {
    /// A policy with the given attempt bound and no backoff.
    pub fn new(max_attempts: usize) -> Self {
        RetryPolicy {
            max_attempts,
            backoff_ms: None,
        }
    }

    /// Set the pause between failed attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff_ms = Some(u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// The pause between failed attempts, if any.
    pub fn backoff(&self) -> Option<Duration> {
        self.backoff_ms.map(Duration::from_millis)
    }

    /// Run `attempt` until it succeeds or the attempt bound is reached.
    ///
    /// # Arguments
    /// * `operation` - Name used in log events.
    /// * `attempt` - Called with the 1-based attempt number.
    ///
    /// # Returns
    /// The first successful result, or `RetryExhausted` once every attempt failed.
    pub(crate) fn run<T, F>(&self, operation: &'static str, mut attempt: F) -> Result<T, CryptoError>
    where
        F: FnMut(usize) -> Result<T, CryptoError>,
    {
        for n in 1..=self.max_attempts {
            match attempt(n) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::trace!(operation, attempt = n, error = %e, "attempt failed");
                    if let Some(pause) = self.backoff() {
                        if n < self.max_attempts {
                            std::thread::sleep(pause);
                        }
                    }
                }
            }
        }
        tracing::warn!(operation, attempts = self.max_attempts, "retry limit reached");
        Err(CryptoError::RetryExhausted {
            attempts: self.max_attempts,
        })
    }
}
