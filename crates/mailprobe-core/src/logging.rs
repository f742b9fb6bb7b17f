//! Tracing setup. Probe runs are long and mostly silent on the console, so
//! everything goes to one append-only log file under the XDG state dir; when
//! that file cannot be opened the subscriber falls back to stderr instead of
//! leaving the run blind.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "mailprobe.log";
const DEFAULT_FILTER: &str = "info,mailprobe=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn open_log_file() -> anyhow::Result<(File, PathBuf)> {
    let dirs = xdg::BaseDirectories::with_prefix("mailprobe")?;
    let path = dirs.place_state_file(LOG_FILE_NAME)?;
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Install the global subscriber. Returns the log file path, or `None` when
/// the state dir was unusable and logs go to stderr.
pub fn init() -> Option<PathBuf> {
    match open_log_file() {
        Ok((file, path)) => {
            // Appends are serialized through the mutex; each record is one line.
            let writer = BoxMakeWriter::new(Mutex::new(file));
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(writer)
                .with_ansi(false)
                .init();
            tracing::info!(path = %path.display(), "logging to file");
            Some(path)
        }
        Err(err) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(io::stderr)
                .with_ansi(false)
                .init();
            tracing::warn!(error = %err, "log file unavailable, logging to stderr");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_directive_parses() {
        EnvFilter::try_new(DEFAULT_FILTER).unwrap();
    }
}
