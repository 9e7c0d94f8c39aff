//! A single cluster node: identity, role ownership, the role loop.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use crate::cluster::ClusterMember;
use crate::config::ClusterConfiguration;
use crate::message_box::MessageBox;
use crate::peer::{Peer, PeerId};
use crate::role::{Down, Role, RoleKind, Transition};

/// A node owns its current role, its peer set and its message box.
///
/// All role mutations funnel through `install`, which stops the
/// outgoing role before the new one takes over and keeps the message
/// box strategy in step. The role lock is never held across an await;
/// `run` dispatches on a snapshot whose shared flags stay live.
pub struct Node {
    id: PeerId,
    role: Mutex<Role>,
    peers: RwLock<Vec<Arc<dyn Peer>>>,
    message_box: MessageBox,
    gate: Arc<AsyncMutex<()>>,
    paused: Mutex<Option<OwnedMutexGuard<()>>>,
}

impl Node {
    pub fn new(initial_role: Role) -> Arc<Self> {
        let strategy = initial_role.distribution_strategy();
        Arc::new(Self {
            id: rand::random(),
            role: Mutex::new(initial_role),
            peers: RwLock::new(Vec::new()),
            message_box: MessageBox::new(strategy),
            gate: Arc::new(AsyncMutex::new(())),
            paused: Mutex::new(None),
        })
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn role_kind(&self) -> RoleKind {
        self.role.lock().kind()
    }

    /// Adds a peer unless it is this node itself or already known.
    pub fn register_peer(&self, peer: Arc<dyn Peer>) {
        if peer.id() == self.id {
            return;
        }
        debug!("node {}: registering peer {}", self.id, peer.id());
        let mut peers = self.peers.write();
        if peers.iter().all(|known| known.id() != peer.id()) {
            peers.push(peer);
        }
    }

    pub(crate) fn peers_snapshot(&self) -> Vec<Arc<dyn Peer>> {
        self.peers.read().clone()
    }

    /// Stops the outgoing role and installs the new one.
    pub fn change_role(&self, new_role: Role) {
        let mut role = self.role.lock();
        self.install(&mut role, new_role);
    }

    /// Parks the current role inside `Down`, preserving it exactly.
    pub fn take_down(&self) {
        let mut role = self.role.lock();
        if matches!(&*role, Role::Down(_)) {
            return;
        }
        let previous = role.clone();
        self.install(&mut role, Role::Down(Down::new(previous)));
    }

    /// Restores the exact role that was active before `take_down`.
    pub fn bring_back_up(&self) {
        let mut role = self.role.lock();
        let Role::Down(down) = &*role else {
            return;
        };
        let restored = down.revive();
        self.install(&mut role, restored);
    }

    /// Suspends the role loop. The in-flight iteration is told to stop
    /// first, so the gate frees promptly even when the role is parked
    /// on a timer or on a peer that never answers.
    pub async fn pause(&self) {
        if self.paused.lock().is_some() {
            return;
        }
        self.role.lock().stop();
        let guard = Arc::clone(&self.gate).lock_owned().await;
        *self.paused.lock() = Some(guard);
    }

    /// Releases a previous `pause` and re-arms the parked role.
    pub fn unpause(&self) {
        let resumed = self.paused.lock().take();
        if resumed.is_some() {
            self.role.lock().revive();
        }
    }

    /// Drives the message box and the role loop for the life of the
    /// node. The pause gate is held across each role iteration, so
    /// `pause` takes effect between iterations.
    pub async fn run(self: Arc<Self>, config: Arc<ClusterConfiguration>) {
        let peers_node = Arc::clone(&self);
        let message_box = self.message_box.run(move || peers_node.peers_snapshot());
        let role_loop = async {
            loop {
                let _running = Arc::clone(&self.gate).lock_owned().await;
                let role = self.role.lock().clone();
                self.run_role(&role, &config).await;
            }
        };
        tokio::join!(message_box, role_loop);
    }

    async fn run_role(&self, role: &Role, config: &ClusterConfiguration) {
        match role {
            Role::Leader(leader) => leader.run(&self.peers_snapshot(), config).await,
            Role::Subject(subject) => {
                if let Some(transition) = subject.run(config).await {
                    self.apply_transition(role, transition);
                }
            }
            Role::Candidate(candidate) => {
                if let Some(transition) = candidate.run(&self.peers_snapshot()).await {
                    self.apply_transition(role, transition);
                }
            }
            Role::Down(down) => down.run().await,
        }
    }

    /// Applies a transition requested by `current`'s run iteration,
    /// unless another role change got there first.
    fn apply_transition(&self, current: &Role, transition: Transition) {
        let mut role = self.role.lock();
        if !role.stop_handle().same(current.stop_handle()) {
            return;
        }
        let new_role = match transition {
            Transition::ToLeader => Role::leader(),
            Transition::ToSubject => Role::subject(),
            Transition::ToCandidate => Role::candidate(),
        };
        self.install(&mut role, new_role);
    }

    fn install(&self, role: &mut Role, new_role: Role) {
        debug!(
            "node {}: changing role from {} to {}",
            self.id, role, new_role
        );
        role.stop();
        self.message_box
            .set_strategy(new_role.distribution_strategy());
        *role = new_role;
    }

    fn receive_heartbeat(&self) {
        let mut role = self.role.lock();
        match &*role {
            // a leader that hears another leader defers
            Role::Leader(_) => {}
            Role::Subject(subject) => {
                subject.beat();
                return;
            }
            Role::Candidate(_) | Role::Down(_) => return,
        }
        self.install(&mut role, Role::subject());
    }

    fn answer_vote_request(&self) -> bool {
        let mut role = self.role.lock();
        match &*role {
            // a leader concedes to the requesting candidate
            Role::Leader(_) => {}
            Role::Subject(subject) => return subject.grant_vote(),
            Role::Candidate(_) | Role::Down(_) => return false,
        }
        self.install(&mut role, Role::subject());
        true
    }
}

#[async_trait]
impl Peer for Node {
    fn id(&self) -> PeerId {
        self.id
    }

    async fn heartbeat(&self) {
        debug!("node {}: receiving heartbeat", self.id);
        self.receive_heartbeat();
    }

    async fn request_vote(&self) -> bool {
        let vote = self.answer_vote_request();
        debug!("node {}: voting {}", self.id, vote);
        vote
    }

    async fn send_message(&self, message: String) {
        self.message_box.append(message);
    }

    async fn get_messages(&self) -> Vec<String> {
        self.message_box.committed()
    }
}

#[async_trait]
impl ClusterMember for Node {
    fn role_kind(&self) -> RoleKind {
        Node::role_kind(self)
    }

    fn register_peer(&self, peer: Arc<dyn Peer>) {
        Node::register_peer(self, peer);
    }

    fn as_peer(self: Arc<Self>) -> Arc<dyn Peer> {
        self
    }

    async fn run(self: Arc<Self>, config: Arc<ClusterConfiguration>) {
        Node::run(self, config).await;
    }
}
