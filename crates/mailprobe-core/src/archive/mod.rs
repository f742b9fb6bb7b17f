//! Periodic bundling and upload of result files.
//!
//! The scheduler runs independently of probe progress: every interval it zips
//! the current result stores (plus the input file), hands the bundle to the
//! uploader, and deletes the local bundle whether the upload worked or not.
//! Upload failures are retried on the next tick, never immediately.

mod bundle;
mod scheduler;
mod upload;

pub use bundle::{bundle_name, sha256_path, write_bundle, ArchiveError};
pub use scheduler::{archive_once, run_scheduler, MIN_INTERVAL_SECS};
pub use upload::{GofileUploader, UploadError, Uploader};

/// What one archive tick did.
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    /// Name of the (now deleted) local bundle.
    pub bundle: String,
    /// Source files that existed and were bundled.
    pub files_added: usize,
    /// Source files that were missing and skipped.
    pub files_skipped: usize,
    /// Download link when the upload succeeded.
    pub link: Option<String>,
}
