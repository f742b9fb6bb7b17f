//! `mailprobe run` – probe every unrecorded identifier in the input file.

use anyhow::Result;
use mailprobe_core::archive::GofileUploader;
use mailprobe_core::config::MailprobeConfig;
use mailprobe_core::control::ShutdownSignal;
use mailprobe_core::orchestrator::{self, RunOptions};
use mailprobe_core::probe::HttpProber;
use mailprobe_core::stats::StatsSnapshot;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[allow(clippy::too_many_arguments)]
pub async fn run_probe(
    cfg: &MailprobeConfig,
    input: PathBuf,
    threads: Option<usize>,
    keyword: Option<String>,
    fresh: bool,
    archive: bool,
    interval: Option<u64>,
) -> Result<()> {
    let opts = RunOptions {
        input_file: input,
        work_dir: std::env::current_dir()?,
        concurrency: threads.unwrap_or(cfg.concurrency),
        case_fold: cfg.case_fold,
        keyword,
        fresh,
        archive_enabled: archive || cfg.archive.enabled,
        archive_interval_secs: interval.unwrap_or(cfg.archive.interval_secs),
    };

    let prober = Arc::new(HttpProber::new(cfg));
    let uploader = Arc::new(GofileUploader::from_config(&cfg.archive));

    let shutdown = ShutdownSignal::new();
    let watcher = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() && watcher.trigger() {
            eprintln!("\ninterrupt received, draining in-flight probes...");
        }
    });

    let (stats_tx, mut stats_rx) = tokio::sync::mpsc::channel::<StatsSnapshot>(16);
    const PROGRESS_INTERVAL_MS: u64 = 500;
    let progress_handle = tokio::spawn(async move {
        let mut last_print = Instant::now();
        while let Some(snapshot) = stats_rx.recv().await {
            let now = Instant::now();
            if now.duration_since(last_print).as_millis() as u64 >= PROGRESS_INTERVAL_MS {
                println!("  {}", snapshot);
                last_print = now;
            }
        }
    });

    let summary = orchestrator::run(opts, prober, uploader, shutdown, Some(stats_tx)).await?;
    let _ = progress_handle.await;

    if summary.is_noop() {
        println!("Nothing to do: every input identifier already has a recorded outcome.");
    } else {
        println!("{}", summary);
    }
    Ok(())
}
