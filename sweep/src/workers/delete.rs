use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

use crate::error::{ErrorKind, SweepError, SweepResult};
use crate::metrics::{SWEEP_OBJECTS_DELETED_TOTAL, SWEEP_OBJECTS_FAILED_TOTAL};
use crate::queue::DispatchQueue;
use crate::remover::ObjectRemover;
use crate::sweep_error;
use crate::types::TaskOutcome;
use crate::workers::base::{Worker, WorkerHandle, WorkerState, WorkerStateCell};

/// Handle to a running delete worker.
#[derive(Debug)]
pub struct DeleteWorkerHandle {
    state: WorkerStateCell,
    handle: Option<JoinHandle<SweepResult<()>>>,
}

impl WorkerHandle<WorkerState> for DeleteWorkerHandle {
    fn state(&self) -> WorkerState {
        self.state.load()
    }

    async fn wait(mut self) -> SweepResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        match handle.await {
            Ok(result) => result,
            Err(err) => Err(sweep_error!(
                ErrorKind::DeleteWorkerPanic,
                "Delete worker task did not run to completion",
                err
            )),
        }
    }
}

/// Worker consuming tasks from the dispatch queue and deleting their objects.
#[derive(Debug)]
pub struct DeleteWorker<R> {
    worker_id: u16,
    queue: DispatchQueue,
    remover: R,
    state: WorkerStateCell,
}

impl<R> DeleteWorker<R> {
    pub fn new(worker_id: u16, queue: DispatchQueue, remover: R) -> Self {
        Self {
            worker_id,
            queue,
            remover,
            state: WorkerStateCell::new(),
        }
    }
}

impl<R> Worker<DeleteWorkerHandle, WorkerState> for DeleteWorker<R>
where
    R: ObjectRemover + Send + Sync + 'static,
{
    type Error = SweepError;

    async fn start(self) -> Result<DeleteWorkerHandle, Self::Error> {
        info!("starting delete worker {}", self.worker_id);

        let state = self.state.clone();
        let span = tracing::info_span!("delete_worker", worker_id = self.worker_id);
        let worker = async move {
            run_delete_loop(self.queue, self.remover, self.state).await;

            Ok(())
        }
        .instrument(span);

        let handle = tokio::spawn(worker);

        Ok(DeleteWorkerHandle {
            state,
            handle: Some(handle),
        })
    }
}

/// The worker's consume loop.
///
/// The only way out is the queue's poison signal. A failing delete, whatever
/// the failure, becomes the task's recorded outcome and the loop moves on;
/// even a panicking remover cannot take the worker down with it. The source
/// of every task failure is therefore visible in the run's report instead of
/// silently shrinking the pool.
async fn run_delete_loop<R>(queue: DispatchQueue, remover: R, state: WorkerStateCell)
where
    R: ObjectRemover,
{
    while let Some(task) = queue.get().await {
        state.store(WorkerState::Processing);

        let delete = AssertUnwindSafe(remover.delete_object(task.object())).catch_unwind();
        let outcome = match delete.await {
            Ok(Ok(())) => {
                debug!("removed object {}", task.object());
                metrics::counter!(SWEEP_OBJECTS_DELETED_TOTAL).increment(1);

                TaskOutcome::Deleted
            }
            Ok(Err(err)) => {
                warn!("failed to remove object {}: {}", task.object(), err);
                metrics::counter!(SWEEP_OBJECTS_FAILED_TOTAL).increment(1);

                TaskOutcome::Failed(err)
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                warn!("delete of object {} panicked: {}", task.object(), reason);
                metrics::counter!(SWEEP_OBJECTS_FAILED_TOTAL).increment(1);

                TaskOutcome::Failed(sweep_error!(
                    ErrorKind::DeleteFailed,
                    "Delete operation panicked",
                    reason
                ))
            }
        };

        // Acknowledged exactly once per task, success or failure alike.
        queue.acknowledge(task, outcome).await;
        state.store(WorkerState::Idle);
    }

    state.store(WorkerState::Stopped);
    debug!("delete worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
