//! Retry pacing for transient sampling failures.
//!
//! Kept as an explicit policy value rather than an inlined sleep so the
//! runner's retry behavior can be asserted without real waiting.

use std::time::Duration;

/// Delay applied between retries of a failed sampling query.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Delay schedule for re-entering a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Same delay before every retry.
    Fixed(Duration),
}

impl BackoffPolicy {
    pub fn fixed(delay: Duration) -> Self {
        BackoffPolicy::Fixed(delay)
    }

    /// Delay to wait before retry number `attempt` (1-based).
    pub fn delay(&self, _attempt: u32) -> Duration {
        match self {
            BackoffPolicy::Fixed(delay) => *delay,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy::Fixed(DEFAULT_RETRY_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay_is_attempt_independent() {
        let policy = BackoffPolicy::fixed(Duration::from_secs(3));
        assert_eq!(policy.delay(1), Duration::from_secs(3));
        assert_eq!(policy.delay(2), Duration::from_secs(3));
        assert_eq!(policy.delay(100), Duration::from_secs(3));
    }

    #[test]
    fn test_default_delay_is_ten_seconds() {
        assert_eq!(BackoffPolicy::default().delay(1), Duration::from_secs(10));
    }
}
