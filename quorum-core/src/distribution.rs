//! Replication strategies applied by the message box.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::time::timeout;
use tracing::debug;

use crate::peer::Peer;

/// Deadline for each awaited peer acknowledgement.
const DISTRIBUTION_TIMEOUT: Duration = Duration::from_millis(500);

/// Outcome of distributing one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionOutcome {
    Successful,
    Failed,
}

/// How a message box replicates pending messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionStrategy {
    /// Non-leaders do not replicate; distribution trivially succeeds.
    None,
    /// Fan out to every peer and require a quorum of acknowledgements.
    Leader,
}

impl DistributionStrategy {
    pub async fn distribute(
        &self,
        message: &str,
        peers: &[Arc<dyn Peer>],
    ) -> DistributionOutcome {
        match self {
            DistributionStrategy::None => DistributionOutcome::Successful,
            DistributionStrategy::Leader => leader_distribute(message, peers).await,
        }
    }
}

/// The quorum counts the leader itself, so `majority - 1` peer
/// acknowledgements settle a message. The first wait that exceeds its
/// deadline fails the whole distribution; peers that never answer
/// simply do not count.
async fn leader_distribute(message: &str, peers: &[Arc<dyn Peer>]) -> DistributionOutcome {
    let majority = (peers.len() + 1) / 2 + 1;
    let mut acknowledged = 1;

    let mut sends: FuturesUnordered<_> = peers
        .iter()
        .map(|peer| timeout(DISTRIBUTION_TIMEOUT, peer.send_message(message.to_string())))
        .collect();

    while acknowledged < majority {
        match sends.next().await {
            Some(Ok(())) => acknowledged += 1,
            Some(Err(_)) => {
                debug!("distribution timed out before reaching quorum");
                return DistributionOutcome::Failed;
            }
            None => return DistributionOutcome::Failed,
        }
    }
    DistributionOutcome::Successful
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::PeerId;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    struct StubPeer {
        id: PeerId,
        ack_delay: Duration,
        deliveries: AtomicUsize,
    }

    impl StubPeer {
        fn ready(id: PeerId) -> Arc<Self> {
            Arc::new(Self {
                id,
                ack_delay: Duration::ZERO,
                deliveries: AtomicUsize::new(0),
            })
        }

        fn slow(id: PeerId) -> Arc<Self> {
            Arc::new(Self {
                id,
                ack_delay: Duration::from_secs(1),
                deliveries: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Peer for StubPeer {
        fn id(&self) -> PeerId {
            self.id
        }

        async fn heartbeat(&self) {}

        async fn request_vote(&self) -> bool {
            false
        }

        async fn send_message(&self, _message: String) {
            sleep(self.ack_delay).await;
            self.deliveries.fetch_add(1, Ordering::SeqCst);
        }

        async fn get_messages(&self) -> Vec<String> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn no_distribution_never_touches_peers() {
        let peer = StubPeer::ready(1);
        let peers: Vec<Arc<dyn Peer>> = vec![Arc::clone(&peer) as Arc<dyn Peer>];
        let outcome = DistributionStrategy::None.distribute("Milkshake", &peers).await;
        assert_eq!(outcome, DistributionOutcome::Successful);
        assert_eq!(peer.deliveries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn a_leader_without_peers_is_its_own_quorum() {
        let outcome = DistributionStrategy::Leader.distribute("Milkshake", &[]).await;
        assert_eq!(outcome, DistributionOutcome::Successful);
    }

    #[tokio::test(start_paused = true)]
    async fn quorum_of_acknowledgements_succeeds() {
        let peers: Vec<Arc<dyn Peer>> = vec![
            StubPeer::ready(1) as Arc<dyn Peer>,
            StubPeer::ready(2) as Arc<dyn Peer>,
        ];
        let outcome = DistributionStrategy::Leader.distribute("Milkshake", &peers).await;
        assert_eq!(outcome, DistributionOutcome::Successful);
    }

    #[tokio::test(start_paused = true)]
    async fn a_fast_quorum_outruns_a_dead_peer() {
        let peers: Vec<Arc<dyn Peer>> = vec![
            StubPeer::ready(1) as Arc<dyn Peer>,
            StubPeer::slow(2) as Arc<dyn Peer>,
        ];
        // majority of three is two: one peer acknowledgement suffices
        let outcome = DistributionStrategy::Leader.distribute("Milkshake", &peers).await;
        assert_eq!(outcome, DistributionOutcome::Successful);
    }

    #[tokio::test(start_paused = true)]
    async fn distribution_fails_when_quorum_is_unreachable() {
        let peers: Vec<Arc<dyn Peer>> = vec![StubPeer::slow(1) as Arc<dyn Peer>];
        let outcome = DistributionStrategy::Leader.distribute("Milkshake", &peers).await;
        assert_eq!(outcome, DistributionOutcome::Failed);
    }
}
