//! Wires nodes into a full mesh and exposes the cluster-level API.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::ClusterConfiguration;
use crate::error::TooManyLeaders;
use crate::peer::Peer;
use crate::role::RoleKind;

/// A node as the cluster drives it: the peer RPC surface plus the
/// local operations the cluster itself needs.
#[async_trait]
pub trait ClusterMember: Peer {
    fn role_kind(&self) -> RoleKind;

    fn register_peer(&self, peer: Arc<dyn Peer>);

    fn as_peer(self: Arc<Self>) -> Arc<dyn Peer>;

    async fn run(self: Arc<Self>, config: Arc<ClusterConfiguration>);
}

/// The cluster behaves as one logical endpoint: find the leader, send
/// a message, read the committed log.
pub struct Cluster {
    members: Vec<Arc<dyn ClusterMember>>,
    config: Arc<ClusterConfiguration>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Cluster {
    /// Lets every node know of every other node's existence.
    pub fn new(members: Vec<Arc<dyn ClusterMember>>, config: ClusterConfiguration) -> Self {
        for member in &members {
            for other in &members {
                member.register_peer(Arc::clone(other).as_peer());
            }
        }
        Self {
            members,
            config: Arc::new(config),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Starts every member's loop on the current runtime.
    pub fn run(&self) {
        let mut tasks = self.tasks.lock();
        for member in &self.members {
            let member = Arc::clone(member);
            let config = Arc::clone(&self.config);
            tasks.push(tokio::spawn(member.run(config)));
        }
    }

    /// The unique live leader, if any.
    pub fn take_me_to_a_leader(&self) -> Result<Option<Arc<dyn ClusterMember>>, TooManyLeaders> {
        let mut leaders = self
            .members
            .iter()
            .filter(|member| member.role_kind() == RoleKind::Leader);
        match (leaders.next(), leaders.next()) {
            (None, _) => Ok(None),
            (Some(leader), None) => Ok(Some(Arc::clone(leader))),
            (Some(_), Some(_)) => Err(TooManyLeaders),
        }
    }

    /// Forwards to the leader; silently dropped when leaderless.
    pub async fn send_message(&self, message: String) -> Result<(), TooManyLeaders> {
        match self.take_me_to_a_leader()? {
            Some(leader) => leader.send_message(message).await,
            None => debug!("no leader in the cluster; dropping message"),
        }
        Ok(())
    }

    /// The leader's committed log, or `None` when leaderless.
    pub async fn get_messages(&self) -> Result<Option<Vec<String>>, TooManyLeaders> {
        match self.take_me_to_a_leader()? {
            Some(leader) => Ok(Some(leader.get_messages().await)),
            None => Ok(None),
        }
    }

    /// Cancels every member's loop.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

impl Drop for Cluster {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CLUSTER")?;
        writeln!(f, "{}", "-".repeat(30))?;
        for member in &self.members {
            writeln!(f, "{} {}", member.role_kind(), member.id())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElectionTimeout;
    use crate::node::Node;
    use crate::role::Role;
    use std::time::Duration;

    fn config() -> ClusterConfiguration {
        ClusterConfiguration::new(
            ElectionTimeout::new(Duration::from_secs(1), Duration::from_secs(1)),
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn two_leaders_are_one_too_many() {
        let cluster = Cluster::new(
            vec![
                Node::new(Role::leader()) as Arc<dyn ClusterMember>,
                Node::new(Role::leader()) as Arc<dyn ClusterMember>,
            ],
            config(),
        );
        assert!(matches!(cluster.take_me_to_a_leader(), Err(TooManyLeaders)));
    }

    #[tokio::test]
    async fn construction_wires_the_full_mesh() {
        let a = Node::new(Role::subject());
        let b = Node::new(Role::subject());
        let c = Node::new(Role::subject());
        let _cluster = Cluster::new(
            vec![
                Arc::clone(&a) as Arc<dyn ClusterMember>,
                Arc::clone(&b) as Arc<dyn ClusterMember>,
                Arc::clone(&c) as Arc<dyn ClusterMember>,
            ],
            config(),
        );
        assert_eq!(a.peers_snapshot().len(), 2);
        assert_eq!(b.peers_snapshot().len(), 2);
        assert_eq!(c.peers_snapshot().len(), 2);
    }

    #[tokio::test]
    async fn display_lists_every_member() {
        let node = Node::new(Role::leader());
        let id = node.id();
        let cluster = Cluster::new(vec![node as Arc<dyn ClusterMember>], config());
        let rendered = cluster.to_string();
        assert!(rendered.starts_with("CLUSTER"));
        assert!(rendered.contains(&format!("leader {id}")));
    }
}
