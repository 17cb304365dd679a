use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;

/// Barrier reporting when every submitted task has finished.
///
/// Completion requires two conditions at once: the producer has declared the
/// end of enumeration, and every enqueued task has been acknowledged. A queue
/// that is transiently empty mid-enumeration therefore never releases the
/// barrier, which a plain "queue is empty" check would get wrong.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    /// Number of tasks handed to the dispatch queue.
    enqueued: AtomicU64,
    /// Number of tasks acknowledged by workers.
    acknowledged: AtomicU64,
    /// Whether the producer finished enumerating.
    producer_done: AtomicBool,
    /// Woken whenever one of the completion conditions may have changed.
    changed: Notify,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one task handed to the queue.
    pub fn task_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::SeqCst);
    }

    /// Records one task acknowledged by a worker.
    pub fn task_acknowledged(&self) {
        self.acknowledged.fetch_add(1, Ordering::SeqCst);
        self.changed.notify_waiters();
    }

    /// Declares that no further task will be enqueued.
    ///
    /// Must be called exactly once, after the last [`Self::task_enqueued`].
    pub fn producer_finished(&self) {
        self.producer_done.store(true, Ordering::SeqCst);
        self.changed.notify_waiters();
    }

    /// Number of enqueued tasks not yet acknowledged.
    pub fn outstanding(&self) -> u64 {
        // Enqueued is read first: a concurrent ack between the two reads can
        // only shrink the visible difference, never make it negative.
        let enqueued = self.enqueued.load(Ordering::SeqCst);
        let acknowledged = self.acknowledged.load(Ordering::SeqCst);
        enqueued.saturating_sub(acknowledged)
    }

    /// Whether the barrier condition holds.
    pub fn is_complete(&self) -> bool {
        self.producer_done.load(Ordering::SeqCst) && self.outstanding() == 0
    }

    /// Blocks until enumeration has finished and every enqueued task has been
    /// acknowledged.
    pub async fn wait_for_completion(&self) {
        loop {
            // The listener is registered before the condition check so a
            // notification arriving in between is not lost.
            let changed = self.changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();

            if self.is_complete() {
                return;
            }

            changed.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn completes_only_when_drained_and_producer_done() {
        let tracker = Arc::new(CompletionTracker::new());

        tracker.task_enqueued();
        tracker.task_acknowledged();
        assert_eq!(tracker.outstanding(), 0);

        // Drained but the producer is still running: the barrier must hold.
        let wait = tokio::time::timeout(Duration::from_millis(50), tracker.wait_for_completion());
        assert!(wait.await.is_err());

        tracker.producer_finished();
        tracker.wait_for_completion().await;
    }

    #[tokio::test]
    async fn producer_done_alone_does_not_complete() {
        let tracker = Arc::new(CompletionTracker::new());

        tracker.task_enqueued();
        tracker.producer_finished();
        assert!(!tracker.is_complete());

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.wait_for_completion().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        tracker.task_acknowledged();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_nothing_was_enqueued() {
        let tracker = CompletionTracker::new();
        tracker.producer_finished();
        tracker.wait_for_completion().await;
    }
}
