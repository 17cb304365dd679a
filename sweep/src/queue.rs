use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::debug;

use crate::bail;
use crate::error::{ErrorKind, SweepResult};
use crate::tracker::CompletionTracker;
use crate::types::{DeleteTask, TaskOutcome};

/// Internal state for [`DispatchQueue`].
#[derive(Debug)]
struct QueueInner {
    /// Tasks produced but not yet claimed by a worker.
    tasks: VecDeque<DeleteTask>,
    /// Whether the queue was closed; a closed and drained queue poisons
    /// consumers.
    closed: bool,
    /// Acknowledged tasks with their outcomes, in acknowledgment order.
    outcomes: Vec<(DeleteTask, TaskOutcome)>,
}

/// Hand-off buffer between the enumerating producer and the delete workers.
///
/// Removal from the queue and completion of the work are distinct: a worker
/// takes a task with [`DispatchQueue::get`] and must later report it with
/// [`DispatchQueue::acknowledge`], exactly once, whatever the outcome. Only
/// acknowledgments move the completion tracker, so the barrier is keyed to
/// finished work, not to an empty queue.
#[derive(Debug, Clone)]
pub struct DispatchQueue {
    inner: Arc<Mutex<QueueInner>>,
    /// Woken when a task arrives or the queue is closed.
    queue_update: Arc<Notify>,
    tracker: Arc<CompletionTracker>,
}

impl DispatchQueue {
    /// Creates an empty open queue reporting to the given tracker.
    pub fn new(tracker: Arc<CompletionTracker>) -> Self {
        let inner = QueueInner {
            tasks: VecDeque::new(),
            closed: false,
            outcomes: Vec::new(),
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
            queue_update: Arc::new(Notify::new()),
            tracker,
        }
    }

    /// Enqueues one task for the worker pool.
    ///
    /// Registers the task with the completion tracker before it becomes
    /// visible to consumers, so the barrier can never observe a task that was
    /// dispatched but not counted.
    pub async fn put(&self, task: DeleteTask) -> SweepResult<()> {
        {
            let mut inner = self.inner.lock().await;
            if inner.closed {
                bail!(
                    ErrorKind::InvalidState,
                    "Dispatch queue is closed",
                    format!("object {} was produced after shutdown", task.object())
                );
            }

            self.tracker.task_enqueued();
            inner.tasks.push_back(task);
        }

        self.queue_update.notify_waiters();

        Ok(())
    }

    /// Takes the next task, waiting without busy-looping while the queue is
    /// empty.
    ///
    /// Returns [`None`] only once the queue has been closed and fully
    /// drained; that is the poison signal telling a worker to stop.
    pub async fn get(&self) -> Option<DeleteTask> {
        loop {
            // Register interest before checking state so a put/close landing
            // between the check and the await still wakes this consumer.
            let update = self.queue_update.notified();
            tokio::pin!(update);
            update.as_mut().enable();

            {
                let mut inner = self.inner.lock().await;
                if let Some(task) = inner.tasks.pop_front() {
                    return Some(task);
                }
                if inner.closed {
                    return None;
                }
            }

            update.await;
        }
    }

    /// Records the outcome of a finished task.
    ///
    /// Distinct from [`Self::get`]: a worker acknowledges after the delete
    /// finished, not when it claimed the task. The outcome is stored before
    /// the tracker is advanced so a released barrier always sees the full
    /// outcome log.
    pub async fn acknowledge(&self, task: DeleteTask, outcome: TaskOutcome) {
        {
            let mut inner = self.inner.lock().await;
            inner.outcomes.push((task, outcome));
        }

        self.tracker.task_acknowledged();
    }

    /// Closes the queue, waking every blocked consumer.
    ///
    /// Already-enqueued tasks are still handed out; only an empty closed
    /// queue returns [`None`] from [`Self::get`]. Closing twice is a no-op.
    pub async fn close(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.closed = true;
        }

        self.queue_update.notify_waiters();
        debug!("dispatch queue closed");
    }

    /// Drains the collected acknowledgment outcomes.
    pub async fn take_outcomes(&self) -> Vec<(DeleteTask, TaskOutcome)> {
        let mut inner = self.inner.lock().await;
        mem::take(&mut inner.outcomes)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::types::ObjectRef;

    fn task(key: &str, sequence: u64) -> DeleteTask {
        DeleteTask::new(ObjectRef::new("bucket", key), sequence)
    }

    #[tokio::test]
    async fn get_blocks_until_put() {
        let queue = DispatchQueue::new(Arc::new(CompletionTracker::new()));

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.get().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        queue.put(task("a", 0)).await.unwrap();
        let received = consumer.await.unwrap().unwrap();
        assert_eq!(received.object().key, "a");
    }

    #[tokio::test]
    async fn close_poisons_blocked_consumers() {
        let queue = DispatchQueue::new(Arc::new(CompletionTracker::new()));

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.get().await })
        };

        queue.close().await;
        assert!(consumer.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn close_drains_before_poisoning() {
        let queue = DispatchQueue::new(Arc::new(CompletionTracker::new()));

        queue.put(task("a", 0)).await.unwrap();
        queue.put(task("b", 1)).await.unwrap();
        queue.close().await;

        assert!(queue.get().await.is_some());
        assert!(queue.get().await.is_some());
        assert!(queue.get().await.is_none());
    }

    #[tokio::test]
    async fn put_after_close_is_rejected() {
        let queue = DispatchQueue::new(Arc::new(CompletionTracker::new()));

        queue.close().await;
        let result = queue.put(task("a", 0)).await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn acknowledgments_feed_tracker_and_outcome_log() {
        let tracker = Arc::new(CompletionTracker::new());
        let queue = DispatchQueue::new(tracker.clone());

        queue.put(task("a", 0)).await.unwrap();
        let claimed = queue.get().await.unwrap();
        assert_eq!(tracker.outstanding(), 1);

        queue.acknowledge(claimed, TaskOutcome::Deleted).await;
        assert_eq!(tracker.outstanding(), 0);

        let outcomes = queue.take_outcomes().await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0.object().key, "a");
    }
}
