use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::SweepResult;

/// Lifecycle state of one worker.
///
/// Owned by the worker and surfaced through its handle for logs, metrics and
/// tests; nothing in the pipeline's control flow depends on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Waiting for the next task.
    Idle = 0,
    /// A task is claimed and its delete is running.
    Processing = 1,
    /// The poison signal was observed; the worker exited its loop.
    Stopped = 2,
}

/// Shared lock-free cell holding a [`WorkerState`].
#[derive(Debug, Clone)]
pub struct WorkerStateCell {
    state: Arc<AtomicU8>,
}

impl WorkerStateCell {
    /// Creates a cell in the [`WorkerState::Idle`] state.
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(WorkerState::Idle as u8)),
        }
    }

    pub fn store(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    pub fn load(&self) -> WorkerState {
        match self.state.load(Ordering::SeqCst) {
            0 => WorkerState::Idle,
            1 => WorkerState::Processing,
            _ => WorkerState::Stopped,
        }
    }
}

impl Default for WorkerStateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// A trait for types that can be started as workers.
///
/// The generic parameter `H` represents the handle type that will be returned
/// when the worker starts, and `S` represents the state type that can be
/// accessed through the handle.
pub trait Worker<H, S>
where
    H: WorkerHandle<S>,
{
    /// Error type.
    type Error;

    /// Starts the worker and returns a future that resolves to its handle.
    fn start(self) -> impl Future<Output = Result<H, Self::Error>> + Send;
}

/// A handle to a running worker that provides access to its state and
/// completion status.
pub trait WorkerHandle<S> {
    /// Returns the current state of the worker.
    fn state(&self) -> S;

    /// Returns a future that resolves when the worker completes.
    fn wait(self) -> impl Future<Output = SweepResult<()>> + Send;
}
