//! Run counters and progress snapshots.
//!
//! Counters are best-effort telemetry; the result stores are the durable
//! source of truth. A snapshot is a pure read — display consumers tolerate
//! eventual consistency.

use crate::outcome::Outcome;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Shared per-run counters, updated only by the engine's outcome-recording
/// step. Monotonically non-decreasing; not persisted.
pub struct RunCounters {
    checked: AtomicU64,
    available: AtomicU64,
    taken: AtomicU64,
    failed: AtomicU64,
    started: Instant,
}

impl RunCounters {
    pub fn new() -> Self {
        Self {
            checked: AtomicU64::new(0),
            available: AtomicU64::new(0),
            taken: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Record one completed probe. Returns the new `checked` total so the
    /// caller can apply its reporting cadence.
    pub fn record(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Available => self.available.fetch_add(1, Ordering::Relaxed),
            Outcome::Taken => self.taken.fetch_add(1, Ordering::Relaxed),
            Outcome::Failed => self.failed.fetch_add(1, Ordering::Relaxed),
        };
        self.checked.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Point-in-time view of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            checked: self.checked.load(Ordering::Relaxed),
            available: self.available.load(Ordering::Relaxed),
            taken: self.taken.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }
}

impl Default for RunCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// One progress line's worth of data.
#[derive(Debug, Clone, Copy)]
pub struct StatsSnapshot {
    pub checked: u64,
    pub available: u64,
    pub taken: u64,
    pub failed: u64,
    pub elapsed_secs: f64,
}

impl StatsSnapshot {
    /// Probes per second since the run started (0 if elapsed is 0).
    pub fn rate(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.checked as f64 / self.elapsed_secs
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "checked {} | available {} | taken {} | failed {} | {:.1}/s | {:.1}s",
            self.checked,
            self.available,
            self.taken,
            self.failed,
            self.rate(),
            self.elapsed_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sums_to_checked() {
        let counters = RunCounters::new();
        counters.record(Outcome::Available);
        counters.record(Outcome::Taken);
        counters.record(Outcome::Taken);
        let n = counters.record(Outcome::Failed);
        assert_eq!(n, 4);
        let snap = counters.snapshot();
        assert_eq!(snap.checked, 4);
        assert_eq!(snap.available, 1);
        assert_eq!(snap.taken, 2);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.checked, snap.available + snap.taken + snap.failed);
    }

    #[test]
    fn rate_is_zero_without_elapsed_time() {
        let snap = StatsSnapshot {
            checked: 10,
            available: 0,
            taken: 10,
            failed: 0,
            elapsed_secs: 0.0,
        };
        assert_eq!(snap.rate(), 0.0);
    }

    #[test]
    fn display_line_carries_all_counters() {
        let snap = StatsSnapshot {
            checked: 20,
            available: 3,
            taken: 15,
            failed: 2,
            elapsed_secs: 2.0,
        };
        let line = snap.to_string();
        assert!(line.contains("checked 20"));
        assert!(line.contains("available 3"));
        assert!(line.contains("taken 15"));
        assert!(line.contains("failed 2"));
        assert!(line.contains("10.0/s"));
    }
}
