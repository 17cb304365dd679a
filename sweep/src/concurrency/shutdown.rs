use tokio::sync::watch;

/// Sending half of the shutdown signal.
///
/// The signal is a watch channel of unit type: the value carries no data, a
/// send only tells every subscriber that shutdown was requested.
#[derive(Debug, Clone)]
pub struct ShutdownTx(watch::Sender<()>);

impl ShutdownTx {
    /// Broadcasts the shutdown signal to all subscribers.
    pub fn shutdown(&self) -> Result<(), watch::error::SendError<()>> {
        self.0.send(())
    }

    /// Creates a new receiver observing this shutdown signal.
    pub fn subscribe(&self) -> ShutdownRx {
        self.0.subscribe()
    }
}

/// Receiving half of the shutdown signal.
pub type ShutdownRx = watch::Receiver<()>;

/// Creates a new pair of [`ShutdownTx`] and [`ShutdownRx`].
pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = watch::channel(());
    (ShutdownTx(tx), rx)
}
