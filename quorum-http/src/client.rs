//! A remote peer reached over its HTTP endpoints.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use quorum_core::{Peer, PeerId};

use crate::wire::{Messages, SendMessage, VoteResponse};

/// A failed delivery must not pass for an acknowledgement; stall past
/// the leader's distribution deadline instead of returning early.
const DELIVERY_STALL: Duration = Duration::from_secs(1);

/// Cap on any single round trip, so an unresponsive peer cannot hang a
/// heartbeat or vote fan-out.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Implements the peer RPC surface by issuing HTTP calls. Transport
/// failures are absorbed the way the election logic expects: no vote,
/// no messages, no acknowledgement.
pub struct HttpPeer {
    url: String,
    client: reqwest::Client,
}

impl HttpPeer {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Peer for HttpPeer {
    /// Remote peers are equal when they answer at the same URL.
    fn id(&self) -> PeerId {
        let mut hasher = DefaultHasher::new();
        self.url.hash(&mut hasher);
        hasher.finish()
    }

    async fn heartbeat(&self) {
        let result = self
            .client
            .post(format!("{}/heartbeat", self.url))
            .send()
            .await;
        if let Err(error) = result {
            debug!("{}: heartbeat not delivered: {error}", self.url);
        }
    }

    async fn request_vote(&self) -> bool {
        let response = self
            .client
            .post(format!("{}/request_vote", self.url))
            .send()
            .await;
        match response {
            Ok(response) => response
                .json::<VoteResponse>()
                .await
                .map(|body| body.vote)
                .unwrap_or(false),
            Err(error) => {
                debug!("{}: vote request failed: {error}", self.url);
                false
            }
        }
    }

    async fn send_message(&self, message: String) {
        let result = self
            .client
            .post(format!("{}/send_message", self.url))
            .json(&SendMessage { message })
            .send()
            .await;
        if let Err(error) = result {
            debug!("{}: message not delivered: {error}", self.url);
            sleep(DELIVERY_STALL).await;
        }
    }

    async fn get_messages(&self) -> Vec<String> {
        let response = self
            .client
            .get(format!("{}/get_messages", self.url))
            .send()
            .await;
        match response {
            Ok(response) => response
                .json::<Messages>()
                .await
                .map(|body| body.messages)
                .unwrap_or_default(),
            Err(error) => {
                debug!("{}: could not fetch messages: {error}", self.url);
                Vec::new()
            }
        }
    }
}
