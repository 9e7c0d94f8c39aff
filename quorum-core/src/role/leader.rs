//! Leader: asserts authority through periodic heartbeats.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::select;
use tokio::time::sleep;

use super::StopHandle;
use crate::config::ClusterConfiguration;
use crate::peer::Peer;

#[derive(Clone, Default)]
pub struct Leader {
    pub(super) stop: StopHandle,
}

impl Leader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// One heartbeat round, then one period of sleep. The node's outer
    /// loop re-enters until the role changes. Both the fan-out and the
    /// sleep race the stop signal, so a peer that never answers cannot
    /// keep the round alive past a stop.
    pub(crate) async fn run(&self, peers: &[Arc<dyn Peer>], config: &ClusterConfiguration) {
        select! {
            _ = join_all(peers.iter().map(|peer| peer.heartbeat())) => {}
            _ = self.stop.stopped() => return,
        }
        if self.stop.is_stopped() {
            return;
        }
        select! {
            _ = sleep(config.heartbeat_period) => {}
            _ = self.stop.stopped() => {}
        }
    }
}
