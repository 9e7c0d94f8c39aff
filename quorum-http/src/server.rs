//! Axum server exposing a node's RPC surface.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::info;

use quorum_core::{ClusterConfiguration, Node, Peer};

use crate::wire::{Messages, SendMessage, VoteResponse};

/// Routes for the four node operations.
pub fn router(node: Arc<Node>) -> Router {
    Router::new()
        .route("/heartbeat", post(heartbeat))
        .route("/request_vote", post(request_vote))
        .route("/send_message", post(send_message))
        .route("/get_messages", get(get_messages))
        .with_state(node)
}

/// Runs the node's own loop and serves its RPC surface on `listener`.
pub async fn serve(
    node: Arc<Node>,
    config: Arc<ClusterConfiguration>,
    listener: TcpListener,
) -> std::io::Result<()> {
    info!(
        "node {}: serving on {}",
        node.id(),
        listener.local_addr()?
    );
    tokio::spawn(Arc::clone(&node).run(config));
    axum::serve(listener, router(node)).await
}

async fn heartbeat(State(node): State<Arc<Node>>) {
    node.heartbeat().await;
}

async fn request_vote(State(node): State<Arc<Node>>) -> Json<VoteResponse> {
    Json(VoteResponse {
        vote: node.request_vote().await,
    })
}

async fn send_message(State(node): State<Arc<Node>>, Json(body): Json<SendMessage>) {
    node.send_message(body.message).await;
}

async fn get_messages(State(node): State<Arc<Node>>) -> Json<Messages> {
    Json(Messages {
        messages: node.get_messages().await,
    })
}
