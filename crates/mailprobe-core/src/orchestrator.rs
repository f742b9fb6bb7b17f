//! Wires queue, engine, and the archival scheduler together and owns the
//! drain on cancellation.
//!
//! State machine: Idle → Loading → Probing → Draining → Reporting → Done.
//! An empty queue short-circuits Loading → Reporting. Interruption is a clean
//! exit; the summary is produced in every case.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::archive::{self, Uploader};
use crate::config::CaseFold;
use crate::control::ShutdownSignal;
use crate::engine::{self, RunSummary};
use crate::input;
use crate::probe::Prober;
use crate::queue;
use crate::stats::{RunCounters, StatsSnapshot};
use crate::store::ResultStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loading,
    Probing,
    Draining,
    Reporting,
    Done,
}

/// Everything a run needs beyond the capabilities themselves.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_file: PathBuf,
    /// Directory holding the result stores and transient bundles.
    pub work_dir: PathBuf,
    pub concurrency: usize,
    pub case_fold: CaseFold,
    /// Tags store and bundle file names.
    pub keyword: Option<String>,
    /// Truncate recorded outcomes before starting (explicit caller decision).
    pub fresh: bool,
    pub archive_enabled: bool,
    pub archive_interval_secs: u64,
}

fn advance(state: &mut RunState, to: RunState) {
    tracing::debug!(from = ?state, to = ?to, "run state");
    *state = to;
}

/// Run one batch end to end. Fatal errors are limited to input problems and
/// store initialization; everything else is logged, counted, and reflected in
/// the summary.
pub async fn run(
    opts: RunOptions,
    prober: Arc<dyn Prober>,
    uploader: Arc<dyn Uploader>,
    shutdown: ShutdownSignal,
    stats_tx: Option<mpsc::Sender<StatsSnapshot>>,
) -> Result<RunSummary> {
    let mut state = RunState::Idle;

    advance(&mut state, RunState::Loading);
    let store = Arc::new(
        ResultStore::open(&opts.work_dir, opts.keyword.as_deref())
            .context("open result store")?,
    );
    if opts.fresh {
        store.clear().context("clear result store for fresh run")?;
        tracing::info!("fresh run requested, recorded outcomes discarded");
    }

    let all = input::read_identifiers(&opts.input_file, opts.case_fold)?;
    let processed: HashSet<String> = store
        .load()
        .context("load result store")?
        .iter()
        .map(|id| opts.case_fold.apply(id))
        .collect();
    let queued = queue::build(&all, &processed)?;
    tracing::info!(
        input = all.len(),
        already_recorded = processed.len(),
        remaining = queued.len(),
        "work queue built"
    );

    if queued.is_empty() {
        advance(&mut state, RunState::Reporting);
        advance(&mut state, RunState::Done);
        return Ok(RunSummary::default());
    }

    advance(&mut state, RunState::Probing);
    let counters = Arc::new(RunCounters::new());
    let scheduler = if opts.archive_enabled {
        let mut sources = store.paths().to_vec();
        sources.push(opts.input_file.clone());
        Some(tokio::spawn(archive::run_scheduler(
            opts.archive_interval_secs,
            sources,
            opts.work_dir.clone(),
            opts.keyword.clone(),
            uploader,
            shutdown.clone(),
        )))
    } else {
        None
    };

    let summary = engine::run(
        queued,
        opts.concurrency,
        prober,
        Arc::clone(&store),
        counters,
        shutdown.clone(),
        stats_tx,
    )
    .await;

    advance(&mut state, RunState::Draining);
    // Ends the scheduler loop on natural completion too; it runs its final
    // archival pass on the way out.
    shutdown.trigger();
    if let Some(handle) = scheduler {
        if let Err(err) = handle.await {
            tracing::warn!(error = %err, "archival scheduler join failed");
        }
    }

    advance(&mut state, RunState::Reporting);
    advance(&mut state, RunState::Done);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::UploadError;
    use crate::outcome::Outcome;
    use crate::probe::ProbeError;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SuffixProber {
        checks: AtomicUsize,
    }

    impl SuffixProber {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                checks: AtomicUsize::new(0),
            })
        }
    }

    impl Prober for SuffixProber {
        fn check(&self, identifier: &str) -> Result<Outcome, ProbeError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            if identifier.starts_with("fail") {
                Err(ProbeError::Timeout)
            } else if identifier.starts_with("avail") {
                Ok(Outcome::Available)
            } else {
                Ok(Outcome::Taken)
            }
        }
    }

    struct NullUploader;

    impl Uploader for NullUploader {
        fn upload(&self, _bundle: &Path) -> Result<String, UploadError> {
            Err(UploadError::NotConfigured)
        }
    }

    fn options(dir: &Path, input: &Path) -> RunOptions {
        RunOptions {
            input_file: input.to_path_buf(),
            work_dir: dir.to_path_buf(),
            concurrency: 4,
            case_fold: CaseFold::Exact,
            keyword: None,
            fresh: false,
            archive_enabled: false,
            archive_interval_secs: 3600,
        }
    }

    async fn run_once(opts: RunOptions, prober: Arc<SuffixProber>) -> RunSummary {
        run(
            opts,
            prober,
            Arc::new(NullUploader),
            ShutdownSignal::new(),
            None,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn second_run_on_same_input_probes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("emails.txt");
        std::fs::write(&input, "avail1@x.com\ntaken1@x.com\nfail1@x.com\n").unwrap();

        let prober = SuffixProber::new();
        let first = run_once(options(dir.path(), &input), Arc::clone(&prober)).await;
        assert_eq!(first.checked, 3);
        assert_eq!(prober.checks.load(Ordering::SeqCst), 3);

        let second = run_once(options(dir.path(), &input), Arc::clone(&prober)).await;
        assert!(second.is_noop());
        assert_eq!(second.dispatched, 0);
        // Resume idempotence: no additional probes at all.
        assert_eq!(prober.checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn only_unrecorded_identifiers_are_probed() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("emails.txt");
        std::fs::write(&input, "taken1@x.com\n").unwrap();

        let prober = SuffixProber::new();
        run_once(options(dir.path(), &input), Arc::clone(&prober)).await;

        std::fs::write(&input, "taken1@x.com\ntaken2@x.com\n").unwrap();
        let summary = run_once(options(dir.path(), &input), Arc::clone(&prober)).await;
        assert_eq!(summary.queued, 1);
        assert_eq!(summary.checked, 1);
        assert_eq!(prober.checks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            options(dir.path(), &dir.path().join("absent.txt")),
            SuffixProber::new(),
            Arc::new(NullUploader),
            ShutdownSignal::new(),
            None,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn case_fold_lower_makes_resume_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("emails.txt");
        std::fs::write(&input, "Taken1@X.com\n").unwrap();

        let prober = SuffixProber::new();
        let mut opts = options(dir.path(), &input);
        opts.case_fold = CaseFold::Lower;
        run_once(opts.clone(), Arc::clone(&prober)).await;

        // Same identifier in a different case is already recorded.
        std::fs::write(&input, "tAkEn1@x.COM\n").unwrap();
        let summary = run_once(opts, Arc::clone(&prober)).await;
        assert!(summary.is_noop());
        assert_eq!(prober.checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fresh_run_discards_recorded_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("emails.txt");
        std::fs::write(&input, "taken1@x.com\n").unwrap();

        let prober = SuffixProber::new();
        run_once(options(dir.path(), &input), Arc::clone(&prober)).await;

        let mut opts = options(dir.path(), &input);
        opts.fresh = true;
        let summary = run_once(opts, Arc::clone(&prober)).await;
        assert_eq!(summary.checked, 1);
        assert_eq!(prober.checks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_identifier_lands_in_two_categories() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("emails.txt");
        std::fs::write(
            &input,
            "avail1@x.com\ntaken1@x.com\nfail1@x.com\navail2@x.com\n",
        )
        .unwrap();

        let prober = SuffixProber::new();
        run_once(options(dir.path(), &input), Arc::clone(&prober)).await;
        // Run again with the same input; nothing moves between categories.
        run_once(options(dir.path(), &input), Arc::clone(&prober)).await;

        let mut seen = std::collections::HashSet::new();
        for outcome in Outcome::ALL {
            let path = ResultStore::category_path(dir.path(), outcome, None);
            for line in std::fs::read_to_string(&path).unwrap().lines() {
                let id = line.split('\t').next().unwrap().to_string();
                assert!(seen.insert(id), "identifier recorded in two categories");
            }
        }
        assert_eq!(seen.len(), 4);
    }

    #[tokio::test]
    async fn archival_runs_final_pass_even_for_short_runs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("emails.txt");
        std::fs::write(&input, "taken1@x.com\n").unwrap();

        let mut opts = options(dir.path(), &input);
        opts.archive_enabled = true;
        let summary = run(
            opts,
            SuffixProber::new(),
            Arc::new(NullUploader),
            ShutdownSignal::new(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(summary.checked, 1);
        // Bundle was created and deleted by the final pass.
        let leftover: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "zip"))
            .collect();
        assert!(leftover.is_empty());
    }
}
