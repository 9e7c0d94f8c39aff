//! Down: a parked node that remembers what it was.

use super::{Role, StopHandle};

/// Carries the previous up-role so the node can be restored exactly to
/// its pre-down state.
#[derive(Clone)]
pub struct Down {
    previous: Box<Role>,
    pub(super) stop: StopHandle,
}

impl Down {
    pub(crate) fn new(previous: Role) -> Self {
        Self {
            previous: Box::new(previous),
            stop: StopHandle::default(),
        }
    }

    /// Suspends until the next role change stops us.
    pub(crate) async fn run(&self) {
        self.stop.stopped().await;
    }

    /// The preserved role, re-armed to run again.
    pub(crate) fn revive(&self) -> Role {
        self.previous.stop_handle().revive();
        (*self.previous).clone()
    }
}
