//! HTTP transport for quorum nodes.
//!
//! Fronts a local node with the peer RPC surface over HTTP, and models
//! remote peers as clients of the same four endpoints.

pub mod client;
pub mod server;
mod wire;

pub use client::HttpPeer;
pub use server::{router, serve};
