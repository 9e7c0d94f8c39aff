//! Failure injection: simulate a dead node without destroying its state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use crate::cluster::ClusterMember;
use crate::config::ClusterConfiguration;
use crate::node::Node;
use crate::peer::{Peer, PeerId};
use crate::role::RoleKind;

/// Delay before a downed node absorbs an incoming message.
const ABSORB_DELAY: Duration = Duration::from_secs(1);

/// Wraps a node and, while down, drops its traffic: votes are denied,
/// heartbeats acknowledged without effect, messages absorbed. The
/// wrapped node is paused rather than torn down, so bringing it back
/// up resumes exactly where it was.
pub struct DownWrapper {
    node: Arc<Node>,
    down: AtomicBool,
}

impl DownWrapper {
    pub fn new(node: Arc<Node>) -> Arc<Self> {
        Arc::new(Self {
            node,
            down: AtomicBool::new(false),
        })
    }

    pub fn is_down(&self) -> bool {
        self.down.load(Ordering::SeqCst)
    }

    /// The wrapped node's role, or the down sentinel.
    pub fn role_kind(&self) -> RoleKind {
        if self.is_down() {
            RoleKind::Down
        } else {
            self.node.role_kind()
        }
    }

    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    pub async fn take_down(&self) {
        debug!("node {}: going down", self.node.id());
        self.down.store(true, Ordering::SeqCst);
        self.node.pause().await;
    }

    pub async fn bring_back_up(&self) {
        debug!("node {}: coming back up", self.node.id());
        self.down.store(false, Ordering::SeqCst);
        self.node.unpause();
    }
}

#[async_trait]
impl Peer for DownWrapper {
    fn id(&self) -> PeerId {
        self.node.id()
    }

    async fn heartbeat(&self) {
        if self.is_down() {
            return;
        }
        self.node.heartbeat().await;
    }

    async fn request_vote(&self) -> bool {
        if self.is_down() {
            return false;
        }
        self.node.request_vote().await
    }

    async fn send_message(&self, message: String) {
        if self.is_down() {
            sleep(ABSORB_DELAY).await;
            return;
        }
        self.node.send_message(message).await;
    }

    async fn get_messages(&self) -> Vec<String> {
        if self.is_down() {
            return Vec::new();
        }
        self.node.get_messages().await
    }
}

#[async_trait]
impl ClusterMember for DownWrapper {
    fn role_kind(&self) -> RoleKind {
        DownWrapper::role_kind(self)
    }

    fn register_peer(&self, peer: Arc<dyn Peer>) {
        self.node.register_peer(peer);
    }

    fn as_peer(self: Arc<Self>) -> Arc<dyn Peer> {
        self
    }

    async fn run(self: Arc<Self>, config: Arc<ClusterConfiguration>) {
        Arc::clone(&self.node).run(config).await;
    }
}
