//! Graceful-shutdown fan-out.

use tokio::sync::broadcast;

/// Hands every long-running task a receiver for the single shutdown event.
///
/// The server's accept loop and the TLS drain watcher each hold one
/// receiver; tests hold the coordinator itself to stop a spawned gateway
/// without delivering a real signal.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        // Capacity 1: the event carries no payload and fires once.
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver that resolves when shutdown is triggered.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Announce shutdown to every subscriber. Safe to call with no
    /// subscribers left.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
