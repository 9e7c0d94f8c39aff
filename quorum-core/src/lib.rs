//! Quorum core library
//!
//! Raft-style leader election and replicated log for a cluster of peer
//! nodes. Every node owns exactly one role (leader, subject, candidate,
//! down) and moves between them on timers, heartbeats and vote
//! requests. A leader additionally accepts client messages and commits
//! each one once a majority of the cluster has acknowledged it.

pub mod cluster;
pub mod config;
pub mod distribution;
pub mod downable;
pub mod error;
pub mod message_box;
pub mod node;
pub mod peer;
pub mod role;

pub use cluster::{Cluster, ClusterMember};
pub use config::{ClusterConfiguration, ElectionTimeout};
pub use distribution::{DistributionOutcome, DistributionStrategy};
pub use downable::DownWrapper;
pub use error::TooManyLeaders;
pub use message_box::MessageBox;
pub use node::Node;
pub use peer::{Peer, PeerId};
pub use role::{Role, RoleKind};
