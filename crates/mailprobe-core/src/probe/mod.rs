//! Prober capability: one check of a single identifier against the remote
//! service.
//!
//! The engine only depends on the `Prober` trait, so heavier implementations
//! (e.g. a browser-driven checker) can be swapped in without touching the
//! dispatch loop — they just warrant a much smaller concurrency limit.

mod http;

pub use http::HttpProber;

use crate::outcome::Outcome;
use crate::retry::{classify_curl_error, classify_http_status, ErrorKind};
use thiserror::Error;

/// Why a probe produced no answer. Per-identifier and non-fatal: the engine
/// records it as a `Failed` outcome and moves on.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected HTTP status {0}")]
    Status(u32),
}

impl ProbeError {
    /// Retry classification for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::Timeout => ErrorKind::Timeout,
            ProbeError::Connection(_) => ErrorKind::Connection,
            ProbeError::Status(code) => classify_http_status(*code),
            ProbeError::Transport(_) => ErrorKind::Other,
        }
    }
}

impl From<curl::Error> for ProbeError {
    fn from(e: curl::Error) -> Self {
        match classify_curl_error(&e) {
            ErrorKind::Timeout => ProbeError::Timeout,
            ErrorKind::Connection => ProbeError::Connection(e.to_string()),
            _ => ProbeError::Transport(e.to_string()),
        }
    }
}

/// A probe transport. `check` blocks — the engine drives it through
/// `spawn_blocking` — and must enforce its own per-call timeout. Bounded
/// retry, if any, also lives behind this trait.
pub trait Prober: Send + Sync + 'static {
    fn check(&self, identifier: &str) -> Result<Outcome, ProbeError>;
}
