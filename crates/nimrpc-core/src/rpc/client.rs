use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{CoreError, RpcError};

use super::http_adapter::HttpTransport;
use super::parsing::parse_result;
use super::protocol::{decode_response, Params, Request, RequestIds};
use super::Transport;

// ==============================================================================
// NimiqClient
// ==============================================================================

/// Client for a Nimiq node's JSON-RPC interface.
///
/// Every call is a single request/response round trip awaited by the
/// caller; the client runs no background work. It is `Send + Sync` when its
/// transport is, so one instance can be shared (e.g. behind an `Arc`) by
/// concurrent tasks. Request IDs stay unique and increasing across them.
pub struct NimiqClient<T = HttpTransport> {
    transport: T,
    ids: RequestIds,
}

impl NimiqClient<HttpTransport> {
    /// Client for `address` without authentication or extra headers.
    pub fn new(address: &str) -> Result<Self, CoreError> {
        Ok(Self::with_transport(HttpTransport::new(
            address,
            None,
            None,
            &[],
        )?))
    }

    /// Client for `address` that authenticates with HTTP Basic auth.
    pub fn with_auth(address: &str, username: &str, password: &str) -> Result<Self, CoreError> {
        Ok(Self::with_transport(HttpTransport::new(
            address,
            Some(username),
            Some(password),
            &[],
        )?))
    }
}

impl<T: Transport> NimiqClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            ids: RequestIds::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the envelope for `method`, consuming the next request ID.
    pub fn request(&self, method: &str, params: Option<Params>) -> Request {
        Request::new(method, params, self.ids.next())
    }

    /// Send a JSON-RPC request and return its `result` untouched.
    ///
    /// Use this for node methods the client does not wrap; the typed methods
    /// all go through here.
    pub async fn raw_call(
        &self,
        method: &str,
        params: Option<Params>,
    ) -> Result<serde_json::Value, CoreError> {
        let req = self.request(method, params);
        debug!(rpc.id = %req.id, rpc.method = method, "rpc call");

        let body = serde_json::to_vec(&req).map_err(RpcError::EncodeRequest)?;
        let response = self.transport.send(body).await?;
        debug!(rpc.id = %req.id, rpc.method = method, body_len = response.len(), "rpc response");

        Ok(decode_response(&response, &req.id)?)
    }

    /// Send a JSON-RPC request and decode its `result` into `R`.
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Params>,
    ) -> Result<R, CoreError> {
        let raw = self.raw_call(method, params).await?;
        Ok(parse_result(method, raw)?)
    }
}
