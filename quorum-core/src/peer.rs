//! The RPC surface every peer exposes, local or remote.

use async_trait::async_trait;

/// Stable, opaque peer identity. Local nodes draw one at random; remote
/// peers hash their URL.
pub type PeerId = u64;

/// Operations a node accepts from its peers and from clients.
///
/// Local nodes, failure-injection wrappers and remote HTTP clients all
/// implement this, so the election and replication logic never cares
/// where a peer actually lives.
#[async_trait]
pub trait Peer: Send + Sync {
    /// Identity used for equality and self-exclusion.
    fn id(&self) -> PeerId;

    /// A leader asserts liveness and authority.
    async fn heartbeat(&self);

    /// A candidate solicits a vote.
    async fn request_vote(&self) -> bool;

    /// Deliver a client message for replication.
    async fn send_message(&self, message: String);

    /// Snapshot of the committed log.
    async fn get_messages(&self) -> Vec<String>;
}
