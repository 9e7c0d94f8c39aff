//! Shared fixtures for the cluster integration tests.

use std::sync::Arc;
use std::time::Duration;

use quorum_core::{
    Cluster, ClusterConfiguration, ClusterMember, DownWrapper, ElectionTimeout, Node, Role,
};

pub fn subject_node() -> Arc<DownWrapper> {
    DownWrapper::new(Node::new(Role::subject()))
}

pub fn leader_node() -> Arc<DownWrapper> {
    DownWrapper::new(Node::new(Role::leader()))
}

pub fn running_cluster(
    nodes: &[Arc<DownWrapper>],
    election_timeout: ElectionTimeout,
    heartbeat_period: Duration,
) -> Cluster {
    let members: Vec<Arc<dyn ClusterMember>> = nodes
        .iter()
        .map(|node| Arc::clone(node) as Arc<dyn ClusterMember>)
        .collect();
    let cluster = Cluster::new(
        members,
        ClusterConfiguration::new(election_timeout, heartbeat_period),
    );
    cluster.run();
    cluster
}
