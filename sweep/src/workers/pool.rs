use tracing::{debug, info};

use crate::error::SweepResult;
use crate::metrics::SWEEP_ACTIVE_WORKERS;
use crate::queue::DispatchQueue;
use crate::remover::ObjectRemover;
use crate::workers::base::{Worker, WorkerHandle, WorkerState};
use crate::workers::delete::{DeleteWorker, DeleteWorkerHandle};

/// Fixed-size pool of delete workers bound to one dispatch queue.
///
/// All workers are started up front and run until the queue poisons them;
/// the pool never grows or shrinks during a run.
#[derive(Debug)]
pub struct DeleteWorkerPool {
    handles: Vec<DeleteWorkerHandle>,
}

impl DeleteWorkerPool {
    /// Starts `pool_size` workers consuming from `queue`.
    ///
    /// The remover handle is cloned per worker; implementations share their
    /// underlying connection state across clones.
    pub async fn start<R>(
        pool_size: u16,
        queue: DispatchQueue,
        remover: R,
    ) -> SweepResult<DeleteWorkerPool>
    where
        R: ObjectRemover + Clone + Send + Sync + 'static,
    {
        let mut handles = Vec::with_capacity(pool_size as usize);
        for worker_id in 0..pool_size {
            let worker = DeleteWorker::new(worker_id, queue.clone(), remover.clone());
            handles.push(worker.start().await?);
        }

        metrics::gauge!(SWEEP_ACTIVE_WORKERS).set(pool_size as f64);
        info!("started {} delete workers", pool_size);

        Ok(DeleteWorkerPool { handles })
    }

    /// Number of workers that have not yet observed the poison signal.
    pub fn active_workers(&self) -> usize {
        self.handles
            .iter()
            .filter(|handle| handle.state() != WorkerState::Stopped)
            .count()
    }

    /// Waits for every worker to stop, aggregating any failures.
    ///
    /// Workers only fail by panicking outside the guarded delete call, so an
    /// error here means the pipeline itself is defective, not that some
    /// objects failed to delete.
    pub async fn wait_all(self) -> SweepResult<()> {
        let mut errors = Vec::new();
        for handle in self.handles {
            if let Err(err) = handle.wait().await {
                errors.push(err);
            }
        }

        metrics::gauge!(SWEEP_ACTIVE_WORKERS).set(0.0);

        if !errors.is_empty() {
            return Err(errors.into());
        }

        debug!("all delete workers stopped");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_utils::store::FakeObjectStore;
    use crate::tracker::CompletionTracker;
    use crate::types::{DeleteTask, ObjectRef};

    #[tokio::test(flavor = "multi_thread")]
    async fn workers_survive_failing_and_panicking_items() {
        let store = FakeObjectStore::with_pages(vec![]);
        store.fail_delete_of("bad").await;
        store.panic_on_delete_of("worse").await;

        let tracker = Arc::new(CompletionTracker::new());
        let queue = DispatchQueue::new(tracker.clone());
        let pool = DeleteWorkerPool::start(4, queue.clone(), store.clone())
            .await
            .unwrap();

        for (sequence, key) in ["bad", "worse", "bad", "worse", "fine"]
            .iter()
            .cycle()
            .take(20)
            .enumerate()
        {
            let task = DeleteTask::new(ObjectRef::new("bucket", *key), sequence as u64);
            queue.put(task).await.unwrap();
        }
        tracker.producer_finished();

        tracker.wait_for_completion().await;

        // Every item was acknowledged and no worker died along the way.
        assert_eq!(pool.active_workers(), 4);
        assert_eq!(queue.take_outcomes().await.len(), 20);

        queue.close().await;
        pool.wait_all().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn wait_all_joins_stopped_workers() {
        let store = FakeObjectStore::with_pages(vec![]);

        let tracker = Arc::new(CompletionTracker::new());
        let queue = DispatchQueue::new(tracker.clone());
        let pool = DeleteWorkerPool::start(2, queue.clone(), store).await.unwrap();

        queue.close().await;
        pool.wait_all().await.unwrap();
    }
}
