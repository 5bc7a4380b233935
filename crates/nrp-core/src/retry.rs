//! Retry with exponential backoff for API requests

use std::time::Duration;

use crate::error::FetchError;

/// Bounded exponential backoff schedule.
///
/// Delay before retry `i` (0-based) is `base_delay * 2^i + extra_delay`,
/// so the default schedule is 1.5s, 2.5s, 4.5s, 8.5s, 16.5s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first request
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub extra_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base_delay: Duration::from_secs(1),
            extra_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// No sleeping between attempts (tests)
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            extra_delay: Duration::ZERO,
        }
    }

    pub fn backoff_duration(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry) + self.extra_delay
    }
}

/// Retry a fallible request with exponential backoff.
///
/// Retryable errors (429/5xx) are retried until `max_attempts` is reached;
/// anything else is returned immediately.
pub fn retry_with_backoff<T>(
    label: &str,
    policy: &RetryPolicy,
    mut attempt_fn: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, FetchError> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt + 1 < policy.max_attempts && e.is_retryable() => {
                let delay = policy.backoff_duration(attempt);
                attempt += 1;
                log::warn!(
                    "{label}: {e}, retry {attempt}/{} in {delay:?}",
                    policy.max_attempts - 1
                );
                std::thread::sleep(delay);
            }
            Err(e) => {
                if e.is_retryable() {
                    log::error!("{label}: giving up after {} attempts: {e}", attempt + 1);
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(s: u16) -> FetchError {
        FetchError::Http {
            status: Some(s),
            message: "test".into(),
        }
    }

    #[test]
    fn default_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_duration(0), Duration::from_millis(1500));
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(2500));
        assert_eq!(policy.backoff_duration(2), Duration::from_millis(4500));
        assert_eq!(policy.backoff_duration(3), Duration::from_millis(8500));
    }

    #[test]
    fn succeeds_after_transient_errors() {
        let mut calls = 0;
        let result = retry_with_backoff("t", &RetryPolicy::immediate(6), || {
            calls += 1;
            if calls < 3 { Err(status(503)) } else { Ok(calls) }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with_backoff("t", &RetryPolicy::immediate(4), || {
            calls += 1;
            Err(status(429))
        });
        assert_eq!(result.unwrap_err().status(), Some(429));
        assert_eq!(calls, 4);
    }

    #[test]
    fn fatal_error_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with_backoff("t", &RetryPolicy::immediate(6), || {
            calls += 1;
            Err(status(404))
        });
        assert_eq!(result.unwrap_err().status(), Some(404));
        assert_eq!(calls, 1);
    }

    #[test]
    fn max_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::with_max_attempts(0).max_attempts, 1);
        assert_eq!(RetryPolicy::immediate(0).max_attempts, 1);
    }
}
