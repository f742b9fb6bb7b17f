//! Terminal classification of one probe.

use std::fmt;

/// Outcome of probing a single identifier. Immutable once recorded within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The identifier is not registered with the remote service.
    Available,
    /// The identifier is already registered.
    Taken,
    /// The probe did not produce an answer (timeout, transport error). Recorded
    /// durably so a later run can re-target only failures.
    Failed,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Available, Outcome::Taken, Outcome::Failed];

    /// Stem of the category's store file (`available.txt` etc.).
    pub fn file_stem(self) -> &'static str {
        match self {
            Outcome::Available => "available",
            Outcome::Taken => "taken",
            Outcome::Failed => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}
