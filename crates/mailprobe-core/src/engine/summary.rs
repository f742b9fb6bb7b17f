//! Final run summary, printed in all cases: completed, interrupted, or no-op.

use crate::stats::StatsSnapshot;
use std::fmt;

/// What a run did. `checked` never exceeds `dispatched`, and
/// `checked == available + taken + failed` once the drain finishes.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Identifiers that needed a probe when the run started.
    pub queued: u64,
    /// Probes actually launched before completion or shutdown.
    pub dispatched: u64,
    pub checked: u64,
    pub available: u64,
    pub taken: u64,
    pub failed: u64,
    /// Appends that failed; results may be missing from disk.
    pub store_errors: u64,
    pub elapsed_secs: f64,
    /// True when shutdown was requested before the queue drained naturally.
    pub interrupted: bool,
}

impl RunSummary {
    pub(crate) fn from_run(
        queued: u64,
        dispatched: u64,
        snapshot: StatsSnapshot,
        store_errors: u64,
        interrupted: bool,
    ) -> Self {
        Self {
            queued,
            dispatched,
            checked: snapshot.checked,
            available: snapshot.available,
            taken: snapshot.taken,
            failed: snapshot.failed,
            store_errors,
            elapsed_secs: snapshot.elapsed_secs,
            interrupted,
        }
    }

    /// True when there was nothing left to probe (everything already recorded).
    pub fn is_noop(&self) -> bool {
        self.queued == 0
    }

    /// Average probes per second over the run.
    pub fn rate(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.checked as f64 / self.elapsed_secs
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "checked:   {}", self.checked)?;
        writeln!(f, "available: {}", self.available)?;
        writeln!(f, "taken:     {}", self.taken)?;
        writeln!(f, "failed:    {}", self.failed)?;
        writeln!(f, "rate:      {:.1}/s", self.rate())?;
        write!(f, "elapsed:   {:.2}s", self.elapsed_secs)?;
        if self.interrupted {
            write!(
                f,
                "\ninterrupted: {} of {} queued probes were dispatched",
                self.dispatched, self.queued
            )?;
        }
        if self.store_errors > 0 {
            write!(
                f,
                "\nwarning: {} result(s) could not be written to disk and may be re-probed next run",
                self.store_errors
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_summary() {
        let summary = RunSummary::default();
        assert!(summary.is_noop());
        assert_eq!(summary.rate(), 0.0);
    }

    #[test]
    fn display_mentions_interruption_and_store_errors() {
        let summary = RunSummary {
            queued: 100,
            dispatched: 50,
            checked: 50,
            available: 10,
            taken: 35,
            failed: 5,
            store_errors: 2,
            elapsed_secs: 5.0,
            interrupted: true,
        };
        let text = summary.to_string();
        assert!(text.contains("checked:   50"));
        assert!(text.contains("interrupted: 50 of 100"));
        assert!(text.contains("2 result(s) could not be written"));
    }

    #[test]
    fn display_quiet_on_clean_run() {
        let summary = RunSummary {
            queued: 10,
            dispatched: 10,
            checked: 10,
            available: 2,
            taken: 8,
            failed: 0,
            store_errors: 0,
            elapsed_secs: 1.0,
            interrupted: false,
        };
        let text = summary.to_string();
        assert!(!text.contains("interrupted"));
        assert!(!text.contains("warning"));
    }
}
