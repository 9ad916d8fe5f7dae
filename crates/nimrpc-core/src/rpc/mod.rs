//! Nimiq node JSON-RPC layer.
//!
//! [`NimiqClient`] owns a [`Transport`] and the request-ID sequence; the
//! envelope codec lives in [`protocol`] and the typed node methods in `api`.
//! [`HttpTransport`] is the production transport, `mock::MockTransport` the
//! test one.

mod api;
mod client;
mod http_adapter;
#[cfg(test)]
pub mod mock;
mod parsing;
pub mod protocol;

pub use client::NimiqClient;
pub use http_adapter::HttpTransport;
pub use protocol::{ErrorKind, Params, Request, RequestId, ServerFault};

use async_trait::async_trait;

use crate::error::RpcError;

/// Moves one serialized JSON-RPC request to the node and returns the raw
/// response body.
///
/// Implementations perform exactly one exchange per call, never retry, and
/// map transport-level refusals (authentication, empty bodies) to
/// [`RpcError`] before the envelope is looked at.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, RpcError>;
}
