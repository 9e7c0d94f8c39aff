//! Wire bodies shared by the server and the client peer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    pub vote: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessage {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Messages {
    pub messages: Vec<String>,
}
