//! Per-node message queue and committed log.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::debug;

use crate::distribution::{DistributionOutcome, DistributionStrategy};
use crate::peer::Peer;

/// Append queue plus committed log.
///
/// A message reaches the committed log only after a successful
/// distribution under the strategy in force at distribution time; the
/// log itself is append-only.
pub struct MessageBox {
    committed: RwLock<Vec<String>>,
    pending_tx: mpsc::UnboundedSender<String>,
    pending_rx: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
    strategy: RwLock<DistributionStrategy>,
}

impl MessageBox {
    pub fn new(strategy: DistributionStrategy) -> Self {
        let (pending_tx, pending_rx) = mpsc::unbounded_channel();
        Self {
            committed: RwLock::new(Vec::new()),
            pending_tx,
            pending_rx: Mutex::new(Some(pending_rx)),
            strategy: RwLock::new(strategy),
        }
    }

    /// Enqueue without committing.
    pub fn append(&self, message: String) {
        let _ = self.pending_tx.send(message);
    }

    pub fn committed(&self) -> Vec<String> {
        self.committed.read().clone()
    }

    pub fn set_strategy(&self, strategy: DistributionStrategy) {
        *self.strategy.write() = strategy;
    }

    /// Drain pending messages one at a time, committing each successful
    /// distribution in completion order. Runs for the life of the node.
    pub async fn run<F>(&self, peers: F)
    where
        F: Fn() -> Vec<Arc<dyn Peer>> + Send,
    {
        let Some(mut pending) = self.pending_rx.lock().take() else {
            return;
        };
        while let Some(message) = pending.recv().await {
            let strategy = *self.strategy.read();
            let peers = peers();
            match strategy.distribute(&message, &peers).await {
                DistributionOutcome::Successful => {
                    self.committed.write().push(message);
                }
                DistributionOutcome::Failed => {
                    debug!("dropping message that failed distribution");
                }
            }
        }
    }
}
