//! Subject: a follower awaiting heartbeats.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::select;

use super::{StopHandle, Transition};
use crate::config::ClusterConfiguration;

#[derive(Clone, Default)]
pub struct Subject {
    /// Set by each heartbeat, cleared once per election cycle.
    beaten: Arc<AtomicBool>,
    /// At most one vote is granted per heartbeat epoch.
    voted: Arc<AtomicBool>,
    pub(super) stop: StopHandle,
}

impl Subject {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait out one election timeout; declare candidacy unless a leader
    /// beat us to it.
    pub(crate) async fn run(&self, config: &ClusterConfiguration) -> Option<Transition> {
        select! {
            _ = config.election_timeout.wait() => {}
            _ = self.stop.stopped() => return None,
        }
        if self.stop.is_stopped() {
            return None;
        }
        if !self.beaten.swap(false, Ordering::SeqCst) {
            return Some(Transition::ToCandidate);
        }
        None
    }

    /// A leader asserted itself: suppress candidacy and open a fresh
    /// voting epoch.
    pub(crate) fn beat(&self) {
        self.beaten.store(true, Ordering::SeqCst);
        self.voted.store(false, Ordering::SeqCst);
    }

    pub(crate) fn grant_vote(&self) -> bool {
        !self.voted.swap(true, Ordering::SeqCst)
    }
}
