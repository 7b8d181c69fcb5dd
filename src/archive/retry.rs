//! Retry with exponential backoff for archive requests.
//!
//! Retried:
//! - timeouts, connection failures and bodies cut off mid-read
//! - 5xx server errors, 408 Request Timeout and 429 Too Many Requests
//!
//! Not retried:
//! - requests that could not be built
//! - any other 4xx (the archive rejected the parameters)

use crate::archive::error::{RetrievalError, TransportError, TransportErrorKind};
use crate::archive::response::rejection_reason;
use crate::archive::transport::HttpResponse;
use bon::Builder;
use log::{debug, info, warn};
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 200;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5_000;

/// How often and how patiently a request is retried.
///
/// # Examples
///
/// ```
/// use climate_anomaly::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::builder()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(50))
///     .build();
/// assert_eq!(policy.delay_before_attempt(2), Duration::from_millis(50));
/// assert_eq!(policy.delay_before_attempt(3), Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after that.
    #[builder(default = Duration::from_millis(DEFAULT_INITIAL_DELAY_MS))]
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    #[builder(default = Duration::from_millis(DEFAULT_MAX_DELAY_MS))]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    /// Delay to wait before `attempt` (1-based). The first attempt never waits.
    pub fn delay_before_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 2);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Blocks the current thread between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] that parks the calling thread with [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryDecision {
    Retry,
    NoRetry,
}

pub(crate) fn classify_transport_error(error: &TransportError) -> RetryDecision {
    match error.kind {
        TransportErrorKind::Timeout | TransportErrorKind::Connect | TransportErrorKind::Body => {
            RetryDecision::Retry
        }
        TransportErrorKind::Request => RetryDecision::NoRetry,
    }
}

pub(crate) fn classify_status(status: u16) -> RetryDecision {
    match status {
        408 | 429 => RetryDecision::Retry,
        500..=599 => RetryDecision::Retry,
        _ => RetryDecision::NoRetry,
    }
}

/// Calls `send` until it yields a 2xx response body, a permanent failure, or the
/// policy's attempt budget is spent.
pub(crate) fn with_retry<F>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    url: &str,
    mut send: F,
) -> Result<String, RetrievalError>
where
    F: FnMut() -> Result<HttpResponse, TransportError>,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_reason = String::from("no attempt made");

    for attempt in 1..=attempts {
        if attempt > 1 {
            let delay = policy.delay_before_attempt(attempt);
            debug!(
                "Waiting {:?} before attempt {} of {} for {}",
                delay, attempt, attempts, url
            );
            sleeper.sleep(delay);
        }

        let reason = match send() {
            Ok(response) if response.is_success() => {
                if attempt > 1 {
                    info!("Archive request succeeded after {} retries", attempt - 1);
                }
                return Ok(response.body);
            }
            Ok(response) => match classify_status(response.status) {
                RetryDecision::Retry => format!("HTTP status {}", response.status),
                RetryDecision::NoRetry if (400..500).contains(&response.status) => {
                    debug!("Archive rejected request with status {}", response.status);
                    return Err(RetrievalError::InvalidRequest(rejection_reason(&response)));
                }
                RetryDecision::NoRetry => {
                    return Err(RetrievalError::MalformedResponse(format!(
                        "unexpected HTTP status {}",
                        response.status
                    )));
                }
            },
            Err(e) => match classify_transport_error(&e) {
                RetryDecision::Retry => e.to_string(),
                RetryDecision::NoRetry => {
                    debug!("Non-retryable transport error: {}", e);
                    return Err(RetrievalError::InvalidRequest(e.message));
                }
            },
        };

        warn!(
            "Transient failure on attempt {} of {} for {}: {}",
            attempt, attempts, url, reason
        );
        last_reason = reason;
    }

    Err(RetrievalError::Transient {
        url: url.to_string(),
        attempts,
        reason: last_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::error::RetrievalErrorKind;
    use std::cell::Cell;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    fn timeout() -> TransportError {
        TransportError::new(TransportErrorKind::Timeout, "timed out")
    }

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(200));
        assert_eq!(policy.max_delay, Duration::from_millis(5000));
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before_attempt(1), Duration::ZERO);
        assert_eq!(policy.delay_before_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_before_attempt(3), Duration::from_millis(400));
        assert_eq!(policy.delay_before_attempt(4), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = RetryPolicy::builder()
            .max_attempts(20)
            .initial_delay(Duration::from_millis(100))
            .max_delay(Duration::from_millis(1000))
            .build();
        assert_eq!(policy.delay_before_attempt(6), Duration::from_millis(1000));
        assert_eq!(policy.delay_before_attempt(20), Duration::from_millis(1000));
    }

    #[test]
    fn test_status_classification() {
        for status in [500, 502, 503, 504, 408, 429] {
            assert_eq!(classify_status(status), RetryDecision::Retry, "{status}");
        }
        for status in [200, 400, 401, 403, 404] {
            assert_eq!(classify_status(status), RetryDecision::NoRetry, "{status}");
        }
    }

    #[test]
    fn test_transport_classification() {
        let retry = [
            TransportErrorKind::Timeout,
            TransportErrorKind::Connect,
            TransportErrorKind::Body,
        ];
        for kind in retry {
            let error = TransportError::new(kind, "x");
            assert_eq!(classify_transport_error(&error), RetryDecision::Retry);
        }
        let error = TransportError::new(TransportErrorKind::Request, "x");
        assert_eq!(classify_transport_error(&error), RetryDecision::NoRetry);
    }

    #[test]
    fn test_succeeds_after_two_transient_failures() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);
        let body = with_retry(&RetryPolicy::default(), &sleeper, "http://archive", || {
            calls.set(calls.get() + 1);
            match calls.get() {
                1 => Err(timeout()),
                2 => Ok(HttpResponse::new(503, "busy")),
                _ => Ok(HttpResponse::new(200, "ok")),
            }
        })
        .unwrap();

        assert_eq!(body, "ok");
        assert_eq!(calls.get(), 3);
        assert_eq!(
            *sleeper.delays.lock().unwrap(),
            vec![Duration::from_millis(200), Duration::from_millis(400)]
        );
    }

    #[test]
    fn test_exhausted_budget_is_transient_error() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);
        let err = with_retry(&RetryPolicy::default(), &sleeper, "http://archive", || {
            calls.set(calls.get() + 1);
            Ok(HttpResponse::new(500, "boom"))
        })
        .unwrap_err();

        assert_eq!(calls.get(), 3);
        assert_eq!(err.kind(), RetrievalErrorKind::Transient);
        match err {
            RetrievalError::Transient {
                attempts, reason, ..
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(reason, "HTTP status 500");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(sleeper.delays.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_client_error_not_retried() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);
        let err = with_retry(&RetryPolicy::default(), &sleeper, "http://archive", || {
            calls.set(calls.get() + 1);
            Ok(HttpResponse::new(
                400,
                r#"{"error":true,"reason":"Latitude must be in range of -90 to 90°."}"#,
            ))
        })
        .unwrap_err();

        assert_eq!(calls.get(), 1);
        assert!(sleeper.delays.lock().unwrap().is_empty());
        assert_eq!(err.kind(), RetrievalErrorKind::InvalidRequest);
        assert!(err.to_string().contains("Latitude must be in range"));
    }

    #[test]
    fn test_request_error_not_retried() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);
        let err = with_retry(&RetryPolicy::default(), &sleeper, "http://archive", || {
            calls.set(calls.get() + 1);
            Err(TransportError::new(TransportErrorKind::Request, "bad url"))
        })
        .unwrap_err();

        assert_eq!(calls.get(), 1);
        assert_eq!(err.kind(), RetrievalErrorKind::InvalidRequest);
    }

    #[test]
    fn test_single_attempt_policy_never_sleeps() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::builder().max_attempts(1).build();
        let err = with_retry(&policy, &sleeper, "http://archive", || Err(timeout())).unwrap_err();
        assert_eq!(err.kind(), RetrievalErrorKind::Transient);
        assert!(sleeper.delays.lock().unwrap().is_empty());
    }
}
