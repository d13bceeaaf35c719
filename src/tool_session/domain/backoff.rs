//! Capped exponential backoff between connection attempts.

use super::ToolSessionDomainError;
use std::time::Duration;

/// Retry policy for establishing a tool-provider session.
///
/// Attempts are numbered from 1. After failed attempt `k` the manager waits
/// `min(max_delay, base_delay * 2^(k - 1))` before trying again; no delay
/// follows the final attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl BackoffPolicy {
    /// Creates a validated backoff policy.
    ///
    /// `max_retries` counts retries after the initial attempt, so a server
    /// gets `max_retries + 1` attempts in total. Zero still allows the
    /// initial attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ToolSessionDomainError::InvalidBackoff`] when the base delay
    /// exceeds the maximum delay.
    pub fn new(
        max_retries: u32,
        base_delay: Duration,
        max_delay: Duration,
    ) -> Result<Self, ToolSessionDomainError> {
        if base_delay > max_delay {
            return Err(ToolSessionDomainError::InvalidBackoff {
                base_ms: base_delay.as_millis(),
                max_ms: max_delay.as_millis(),
            });
        }

        Ok(Self {
            max_attempts: max_retries.saturating_add(1),
            base_delay,
            max_delay,
        })
    }

    /// Returns the total number of connection attempts per server.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay before the first retry.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns the delay ceiling.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Returns the delay that follows failed attempt `attempt`.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        2_u32
            .checked_pow(exponent)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Returns whether another attempt follows failed attempt `attempt`.
    #[must_use]
    pub const fn has_attempt_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
        }
    }
}
