//! The HTTP surface end to end: a served node driven by the client peer.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use quorum_core::{ClusterConfiguration, ElectionTimeout, Node, Peer, Role};
use quorum_http::{serve, HttpPeer};

async fn served_node(role: Role) -> (Arc<Node>, HttpPeer) {
    let node = Node::new(role);
    // timeouts far beyond the test horizon keep the role stable
    let config = Arc::new(ClusterConfiguration::new(
        ElectionTimeout::new(Duration::from_secs(30), Duration::from_secs(30)),
        Duration::from_secs(1),
    ));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(Arc::clone(&node), config, listener));
    (node, HttpPeer::new(format!("http://{addr}")))
}

#[tokio::test]
async fn subjects_vote_once_per_epoch_over_http() {
    let (_node, peer) = served_node(Role::subject()).await;

    assert!(peer.request_vote().await);
    assert!(!peer.request_vote().await);

    peer.heartbeat().await;
    assert!(peer.request_vote().await);
}

#[tokio::test]
async fn leaders_serve_committed_messages_over_http() {
    let (_node, peer) = served_node(Role::leader()).await;

    assert!(peer.get_messages().await.is_empty());
    peer.send_message("Milkshake".to_string()).await;

    for _ in 0..100 {
        if peer.get_messages().await == vec!["Milkshake".to_string()] {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("message never committed");
}

#[tokio::test]
async fn the_wire_format_matches_the_contract() {
    let (_node, peer) = served_node(Role::subject()).await;
    let base = peer.url().to_string();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/request_vote"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let vote: serde_json::Value = response.json().await.unwrap();
    assert!(vote.get("vote").is_some());

    let response = client
        .post(format!("{base}/heartbeat"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .post(format!("{base}/send_message"))
        .json(&serde_json::json!({"message": "Milkshake"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .get(format!("{base}/get_messages"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let messages: serde_json::Value = response.json().await.unwrap();
    assert!(messages.get("messages").unwrap().is_array());
}

#[tokio::test]
async fn remote_peers_are_equal_by_url() {
    let one = HttpPeer::new("http://127.0.0.1:8000");
    let same = HttpPeer::new("http://127.0.0.1:8000");
    let other = HttpPeer::new("http://127.0.0.1:8001");

    assert_eq!(one.id(), same.id());
    assert_ne!(one.id(), other.id());
}

#[tokio::test]
async fn unreachable_peers_grant_nothing() {
    // the discard port: nothing listens there
    let peer = HttpPeer::new("http://127.0.0.1:9");

    assert!(!peer.request_vote().await);
    assert!(peer.get_messages().await.is_empty());

    let started = std::time::Instant::now();
    peer.send_message("Milkshake".to_string()).await;
    // a failed delivery stalls instead of passing for an acknowledgement
    assert!(started.elapsed() >= Duration::from_millis(900));
}
