//! Interval loop driving the bundle/upload cycle, independent of probe
//! progress.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::control::ShutdownSignal;

use super::bundle::{self, ArchiveError};
use super::upload::Uploader;
use super::ArchiveReport;

/// Floor on the archival interval; anything lower would starve probe
/// throughput with bundling work.
pub const MIN_INTERVAL_SECS: u64 = 30;

fn clamp_interval(secs: u64) -> Duration {
    if secs < MIN_INTERVAL_SECS {
        tracing::warn!(
            requested = secs,
            floor = MIN_INTERVAL_SECS,
            "archive interval below the floor, clamped"
        );
        Duration::from_secs(MIN_INTERVAL_SECS)
    } else {
        Duration::from_secs(secs)
    }
}

/// Run archive ticks every `interval_secs` (clamped to the floor) until
/// shutdown, then one final unconditional pass so an interrupted run is still
/// backed up. The sleep is select!-ed against the shutdown signal, so
/// cancellation wakes the loop immediately.
///
/// Tick failures (nothing to bundle, upload refused) are logged and the loop
/// keeps going; a failed upload is retried on the next tick, not before.
pub async fn run_scheduler(
    interval_secs: u64,
    sources: Vec<PathBuf>,
    dest_dir: PathBuf,
    keyword: Option<String>,
    uploader: Arc<dyn Uploader>,
    shutdown: ShutdownSignal,
) {
    let interval = clamp_interval(interval_secs);
    tracing::info!(
        interval_secs = interval.as_secs(),
        "archival scheduler started"
    );

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {
                match archive_once(&sources, &dest_dir, keyword.as_deref(), Arc::clone(&uploader)).await {
                    Ok(report) => tracing::info!(
                        bundle = %report.bundle,
                        added = report.files_added,
                        skipped = report.files_skipped,
                        uploaded = report.link.is_some(),
                        "archive tick complete"
                    ),
                    Err(err) => tracing::warn!(error = %err, "archive tick failed"),
                }
            }
        }
    }

    tracing::info!("running final archive pass before exit");
    match archive_once(&sources, &dest_dir, keyword.as_deref(), uploader).await {
        Ok(report) => tracing::info!(
            bundle = %report.bundle,
            uploaded = report.link.is_some(),
            "final archive pass complete"
        ),
        Err(err) => tracing::warn!(error = %err, "final archive pass failed"),
    }
}

/// One bundle/upload cycle. The local bundle is transient: it is deleted
/// after the upload attempt on success and failure alike. Upload failure is
/// reported as `link: None`, not as an error — only bundling problems are.
pub async fn archive_once(
    sources: &[PathBuf],
    dest_dir: &Path,
    keyword: Option<&str>,
    uploader: Arc<dyn Uploader>,
) -> Result<ArchiveReport, ArchiveError> {
    let name = bundle::bundle_name(keyword);
    let bundle_path = dest_dir.join(&name);
    let sources = sources.to_vec();

    let report = tokio::task::spawn_blocking(move || -> Result<ArchiveReport, ArchiveError> {
        let (files_added, files_skipped) = match bundle::write_bundle(&sources, &bundle_path) {
            Ok(counts) => counts,
            Err(err) => {
                // A partial bundle must not linger.
                let _ = std::fs::remove_file(&bundle_path);
                return Err(err);
            }
        };
        if let Ok(digest) = bundle::sha256_path(&bundle_path) {
            tracing::debug!(bundle = %bundle_path.display(), sha256 = %digest, "bundle ready");
        }

        let link = match uploader.upload(&bundle_path) {
            Ok(link) => {
                tracing::info!(%link, "bundle uploaded");
                Some(link)
            }
            Err(err) => {
                tracing::warn!(error = %err, "bundle upload failed");
                None
            }
        };

        if let Err(err) = std::fs::remove_file(&bundle_path) {
            tracing::warn!(
                bundle = %bundle_path.display(),
                error = %err,
                "could not delete local bundle"
            );
        }

        Ok(ArchiveReport {
            bundle: name,
            files_added,
            files_skipped,
            link,
        })
    })
    .await
    .map_err(|e| {
        ArchiveError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            e.to_string(),
        ))
    })??;

    Ok(report)
}
