//! Candidate: campaigns for leadership in one election round.

use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::select;
use tracing::debug;

use super::{StopHandle, Transition};
use crate::peer::Peer;

#[derive(Clone, Default)]
pub struct Candidate {
    pub(super) stop: StopHandle,
}

impl Candidate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Solicit votes from every peer concurrently, counting ourselves
    /// as one aye. The ballot is conclusive as soon as either side
    /// holds a majority; votes arriving after that are discarded.
    pub(crate) async fn run(&self, peers: &[Arc<dyn Peer>]) -> Option<Transition> {
        let electorate = peers.len() + 1;
        let majority = electorate / 2 + 1;
        let mut ayes = 1;
        let mut nays = 0;

        if ayes >= majority {
            return Some(Transition::ToLeader);
        }

        let mut ballots: FuturesUnordered<_> =
            peers.iter().map(|peer| peer.request_vote()).collect();

        loop {
            select! {
                vote = ballots.next() => match vote {
                    Some(true) => {
                        ayes += 1;
                        if ayes >= majority {
                            debug!("won the election with {ayes}/{electorate} votes");
                            return Some(Transition::ToLeader);
                        }
                    }
                    Some(false) => {
                        nays += 1;
                        if nays >= majority {
                            debug!("lost the election with {nays}/{electorate} refusals");
                            return Some(Transition::ToSubject);
                        }
                    }
                    // every vote is in with no majority; the node loop
                    // re-enters and a fresh election runs
                    None => return None,
                },
                _ = self.stop.stopped() => return None,
            }
        }
    }
}
