//! Bounded-concurrency probe dispatch.
//!
//! Keeps up to `concurrency` probes in flight at once; when one finishes, the
//! next queued identifier is launched until the queue is empty or shutdown is
//! requested. Completion order across identifiers is whatever the scheduler
//! produces.

mod summary;

pub use summary::RunSummary;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::control::ShutdownSignal;
use crate::outcome::Outcome;
use crate::probe::Prober;
use crate::stats::{RunCounters, StatsSnapshot};
use crate::store::ResultStore;

/// Hard ceiling on in-flight probes, whatever the caller requested. Keeps a
/// misconfigured run from exhausting the transport.
pub const MAX_CONCURRENCY: usize = 500;

/// Log a progress line every this many completed probes.
const REPORT_EVERY: u64 = 10;

/// Drive every queued identifier through the prober.
///
/// Each completion is appended to the store first, then counted — the store
/// is the durable record, counters are telemetry. A probe error becomes a
/// `Failed` record with the error as its note; it still increments `checked`.
/// When `shutdown` fires, no new probes are launched and in-flight ones are
/// drained; partial completion is reported in the summary, never as an error.
pub async fn run(
    queue: Vec<String>,
    concurrency: usize,
    prober: Arc<dyn Prober>,
    store: Arc<ResultStore>,
    counters: Arc<RunCounters>,
    shutdown: ShutdownSignal,
    stats_tx: Option<mpsc::Sender<StatsSnapshot>>,
) -> RunSummary {
    let concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
    let queued = queue.len() as u64;
    let mut pending = queue.into_iter();
    let mut join_set: JoinSet<(String, Outcome, Option<String>)> = JoinSet::new();
    let mut dispatched = 0u64;
    let mut store_errors = 0u64;

    loop {
        while join_set.len() < concurrency && !shutdown.is_triggered() {
            let Some(identifier) = pending.next() else {
                break;
            };
            dispatched += 1;
            let prober = Arc::clone(&prober);
            join_set.spawn(async move {
                let to_check = identifier.clone();
                match tokio::task::spawn_blocking(move || prober.check(&to_check)).await {
                    Ok(Ok(outcome)) => (identifier, outcome, None),
                    Ok(Err(err)) => {
                        let note = err.to_string();
                        (identifier, Outcome::Failed, Some(note))
                    }
                    Err(join_err) => {
                        tracing::warn!(error = %join_err, "probe task panicked");
                        (identifier, Outcome::Failed, Some("probe task panicked".into()))
                    }
                }
            });
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        let (identifier, outcome, note) = match joined {
            Ok(completed) => completed,
            Err(err) => {
                tracing::warn!(error = %err, "probe join failed");
                continue;
            }
        };

        if let Err(err) = store.append(outcome, &identifier, note.as_deref()) {
            store_errors += 1;
            tracing::warn!(identifier = %identifier, error = %err, "result append failed");
        }
        let checked = counters.record(outcome);

        match outcome {
            Outcome::Available => tracing::info!(identifier = %identifier, "available"),
            Outcome::Taken => tracing::debug!(identifier = %identifier, "taken"),
            Outcome::Failed => {
                tracing::debug!(
                    identifier = %identifier,
                    note = note.as_deref().unwrap_or(""),
                    "failed"
                )
            }
        }
        if checked % REPORT_EVERY == 0 {
            tracing::info!("{}", counters.snapshot());
        }
        if let Some(tx) = &stats_tx {
            let _ = tx.try_send(counters.snapshot());
        }
    }

    RunSummary::from_run(
        queued,
        dispatched,
        counters.snapshot(),
        store_errors,
        shutdown.is_triggered(),
    )
}
