//! Core pipeline orchestration and execution.
//!
//! Contains the [`Pipeline`] struct that wires the enumerator, the dispatch
//! queue, the completion tracker and the delete worker pool together for one
//! bulk deletion run.

use std::sync::Arc;
use sweep_config::shared::PipelineConfig;
use tracing::{error, info};

use crate::concurrency::shutdown::{ShutdownTx, create_shutdown_channel};
use crate::enumerator::{ObjectEnumerator, ObjectLister};
use crate::error::{ErrorKind, SweepError, SweepResult};
use crate::metrics::{SWEEP_OBJECTS_SUBMITTED_TOTAL, register_metrics};
use crate::queue::DispatchQueue;
use crate::remover::ObjectRemover;
use crate::sweep_error;
use crate::tracker::CompletionTracker;
use crate::types::{DeleteTask, SweepFailure, SweepReport, TaskOutcome};
use crate::workers::pool::DeleteWorkerPool;

/// Orchestrates one bulk deletion run.
///
/// A [`Pipeline`] owns the collaborators (listing and deleting), the worker
/// pool lifecycle, and the completion barrier. It consumes itself on
/// [`Pipeline::run`]; a pipeline never outlives one run.
#[derive(Debug)]
pub struct Pipeline<L, R> {
    config: Arc<PipelineConfig>,
    lister: L,
    remover: R,
    shutdown_tx: ShutdownTx,
}

impl<L, R> Pipeline<L, R>
where
    L: ObjectLister,
    R: ObjectRemover + Clone + Send + Sync + 'static,
{
    /// Creates a new pipeline with the given configuration and collaborators.
    ///
    /// Nothing runs until [`Pipeline::run`] is called.
    pub fn new(config: PipelineConfig, lister: L, remover: R) -> Self {
        // Register metrics here during pipeline creation so users of the
        // crate don't have to call it explicitly. Safe to call repeatedly.
        register_metrics();

        // A watch channel of unit type: subscribers only need to learn that
        // shutdown was requested, there is no payload.
        let (shutdown_tx, _) = create_shutdown_channel();

        Self {
            config: Arc::new(config),
            lister,
            remover,
            shutdown_tx,
        }
    }

    /// The bucket this pipeline sweeps.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Returns a handle for sending the shutdown signal to this pipeline.
    ///
    /// Shutdown stops enumeration; objects already handed to the worker pool
    /// are still processed before [`Pipeline::run`] returns.
    pub fn shutdown_tx(&self) -> ShutdownTx {
        self.shutdown_tx.clone()
    }

    /// Runs enumeration and deletion to completion and returns the report.
    ///
    /// Individual delete failures are recorded in the report, never fatal. A
    /// listing failure (or the shutdown signal) stops enumeration; everything
    /// enqueued up to that point is still processed, so
    /// `succeeded + failed == submitted` holds for the report either way,
    /// with the enumeration error carried alongside the partial counts.
    pub async fn run(self) -> SweepResult<SweepReport> {
        info!(
            "starting sweep of bucket '{}' with prefix '{}'",
            self.config.bucket, self.config.prefix
        );

        let tracker = Arc::new(CompletionTracker::new());
        let queue = DispatchQueue::new(tracker.clone());

        // Workers start first so consumption overlaps enumeration from the
        // very first page.
        let pool = DeleteWorkerPool::start(
            self.config.max_delete_workers,
            queue.clone(),
            self.remover.clone(),
        )
        .await?;

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut enumerator =
            ObjectEnumerator::new(&self.lister, &self.config.bucket, &self.config.prefix);

        let mut submitted: u64 = 0;
        let mut enumeration_error: Option<SweepError> = None;

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    info!("shutdown signal received, stopping enumeration");
                    enumeration_error = Some(sweep_error!(
                        ErrorKind::EnumerationCanceled,
                        "Enumeration canceled",
                        "a shutdown signal arrived before the listing finished"
                    ));
                    break;
                }
                next = enumerator.next() => next,
            };

            match next {
                Ok(Some(object)) => {
                    let task = DeleteTask::new(object, submitted);
                    if let Err(err) = queue.put(task).await {
                        enumeration_error = Some(err);
                        break;
                    }

                    metrics::counter!(SWEEP_OBJECTS_SUBMITTED_TOTAL).increment(1);
                    submitted += 1;
                }
                Ok(None) => break,
                Err(err) => {
                    error!("enumeration failed: {}", err);
                    enumeration_error = Some(err);
                    break;
                }
            }
        }

        // Whatever ended enumeration, the barrier only needs to know that
        // nothing further will arrive; already-enqueued tasks still count.
        tracker.producer_finished();
        info!("enumeration finished with {} objects submitted", submitted);

        tracker.wait_for_completion().await;

        // Poison the workers only after the barrier released: every task is
        // acknowledged by now, so no worker can be holding one.
        queue.close().await;
        pool.wait_all().await?;

        let report = assemble_report(submitted, enumeration_error, queue.take_outcomes().await);
        info!(
            submitted = report.submitted,
            succeeded = report.succeeded,
            failed = report.failed,
            failures = report.failures.len(),
            "sweep complete"
        );

        Ok(report)
    }
}

fn assemble_report(
    submitted: u64,
    enumeration_error: Option<SweepError>,
    outcomes: Vec<(DeleteTask, TaskOutcome)>,
) -> SweepReport {
    let mut succeeded = 0;
    let mut failed = 0;
    let mut failures = Vec::new();

    for (task, outcome) in outcomes {
        match outcome {
            TaskOutcome::Deleted => succeeded += 1,
            TaskOutcome::Failed(err) => {
                failed += 1;
                failures.push(SweepFailure {
                    object: task.into_object(),
                    reason: err.to_string(),
                });
            }
        }
    }

    SweepReport {
        submitted,
        succeeded,
        failed,
        failures,
        enumeration_error,
    }
}
