//! Retry and backoff policy for the HTTP prober.
//!
//! Encapsulates error classification (timeouts, throttling, connection
//! failures) and exponential backoff decisions. Retry happens inside the
//! prober; the engine records anything that still fails as a terminal
//! `Failed` outcome.

use std::time::Duration;

use crate::config::RetryConfig;

/// Coarse failure class; decides whether another attempt is worth making.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call hit its connect or overall deadline.
    Timeout,
    /// The service is pushing back (429, 503).
    Throttled,
    /// The connection itself failed: reset, DNS, nothing received.
    Connection,
    /// Server-side HTTP error other than throttling.
    Http5xx(u16),
    /// Everything else. Treated as permanent for this identifier.
    Other,
}

/// What to do with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up; the caller records the failure.
    NoRetry,
    /// Sleep this long, then try again.
    RetryAfter(Duration),
}

/// Exponential backoff policy with caps. The defaults are deliberately tight:
/// a probe that keeps failing should become a `Failed` record quickly rather
/// than stall a worker slot.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Build a policy from the optional `[retry]` config section.
    pub fn from_config(cfg: Option<&RetryConfig>) -> Self {
        match cfg {
            Some(c) => Self {
                max_attempts: c.max_attempts.max(1),
                base_delay: Duration::from_secs_f64(c.base_delay_secs.max(0.0)),
                max_delay: Duration::from_secs(c.max_delay_secs),
            },
            None => Self::default(),
        }
    }

    /// Whether failed attempt number `attempt` (1-based) with class `kind`
    /// deserves another try, and after how long.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || matches!(kind, ErrorKind::Other) {
            return RetryDecision::NoRetry;
        }
        // Delay doubles per attempt: base, 2x, 4x, ... up to max_delay.
        let doublings = attempt.saturating_sub(1).min(12);
        let delay = self
            .base_delay
            .saturating_mul(1u32 << doublings)
            .min(self.max_delay);
        RetryDecision::RetryAfter(delay)
    }
}

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}
