use crate::rpc::protocol::{RequestId, ServerFault};

/// Crate-level error returned by every public client operation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Failures of a single JSON-RPC round trip, from the wire up to the
/// typed decode of `result`.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("the HTTP response body was empty")]
    EmptyResponse,

    #[error("not authenticated (HTTP 401)")]
    NotAuthenticated,

    #[error("unauthorized (HTTP 403)")]
    Unauthorized,

    #[error("malformed JSON-RPC response: {0}")]
    MalformedResponse(String),

    #[error("JSON-RPC: request ID {expected} and response ID {received} didn't match")]
    IdMismatch {
        expected: RequestId,
        received: serde_json::Value,
    },

    #[error(transparent)]
    Server(ServerFault),

    #[error("unexpected result for `{method}`: {reason}")]
    ResultUnexpected { method: String, reason: String },

    #[error("encode JSON-RPC request: {0}")]
    EncodeRequest(#[source] serde_json::Error),
}
