//! Node roles and the transitions between them.
//!
//! A node is always in exactly one role. The node's outer loop drives
//! the active role's `run` repeatedly; heartbeats and vote requests
//! arriving from peers may flip the role in between (or, for a leader,
//! mid-iteration via the stop handle).

mod candidate;
mod down;
mod leader;
mod subject;

pub use candidate::Candidate;
pub use down::Down;
pub use leader::Leader;
pub use subject::Subject;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::distribution::DistributionStrategy;

/// Idempotent signal that aborts a role's current `run` promptly.
///
/// Roles re-check the flag after every suspension point.
#[derive(Clone, Default)]
pub struct StopHandle {
    inner: Arc<StopInner>,
}

#[derive(Default)]
struct StopInner {
    stopped: AtomicBool,
    notify: Notify,
}

impl StopHandle {
    pub(crate) fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        self.inner.notify.notify_one();
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Completes once `stop` has been called.
    pub(crate) async fn stopped(&self) {
        while !self.is_stopped() {
            self.inner.notify.notified().await;
        }
    }

    /// Re-arms a handle whose role was parked inside `Down`.
    fn revive(&self) {
        self.inner.stopped.store(false, Ordering::SeqCst);
    }

    /// Two views of the same role share one handle.
    pub(crate) fn same(&self, other: &StopHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Requested by a role's `run` iteration; applied by the node only if
/// that role is still the current one.
pub(crate) enum Transition {
    ToLeader,
    ToSubject,
    ToCandidate,
}

/// The current mode of a node.
///
/// Role state a `run` iteration observes lives behind `Arc`s, so the
/// node can dispatch on a cheap clone without holding its role lock
/// across an await.
#[derive(Clone)]
pub enum Role {
    Leader(Leader),
    Subject(Subject),
    Candidate(Candidate),
    Down(Down),
}

impl Role {
    pub fn leader() -> Self {
        Role::Leader(Leader::new())
    }

    pub fn subject() -> Self {
        Role::Subject(Subject::new())
    }

    pub fn candidate() -> Self {
        Role::Candidate(Candidate::new())
    }

    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Leader(_) => RoleKind::Leader,
            Role::Subject(_) => RoleKind::Subject,
            Role::Candidate(_) => RoleKind::Candidate,
            Role::Down(_) => RoleKind::Down,
        }
    }

    /// Signal the current `run` to wind down promptly. Idempotent.
    pub fn stop(&self) {
        self.stop_handle().stop();
    }

    /// Re-arms a role whose loop was wound down by a pause.
    pub(crate) fn revive(&self) {
        self.stop_handle().revive();
    }

    /// Which strategy the message box applies while this role is active.
    pub fn distribution_strategy(&self) -> DistributionStrategy {
        match self {
            Role::Leader(_) => DistributionStrategy::Leader,
            _ => DistributionStrategy::None,
        }
    }

    pub(crate) fn stop_handle(&self) -> &StopHandle {
        match self {
            Role::Leader(role) => &role.stop,
            Role::Subject(role) => &role.stop,
            Role::Candidate(role) => &role.stop,
            Role::Down(role) => &role.stop,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

/// Role discriminant, reported to the cluster and over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    Leader,
    Subject,
    Candidate,
    Down,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoleKind::Leader => "leader",
            RoleKind::Subject => "subject",
            RoleKind::Candidate => "candidate",
            RoleKind::Down => "down",
        };
        f.write_str(name)
    }
}
