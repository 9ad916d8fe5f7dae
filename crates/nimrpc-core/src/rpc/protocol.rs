//! JSON-RPC 2.0 envelope: request construction, response decoding, and the
//! mapping from server error codes to [`ErrorKind`].
//!
//! Nothing in here touches the network. [`decode_response`] takes the raw
//! response body and the ID of the request that produced it, and yields the
//! opaque `result` value for the typed call sites to decode.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::RpcError;

pub const JSONRPC_VERSION: &str = "2.0";

// ==============================================================================
// Request
// ==============================================================================

/// Correlation ID of a request. The client always issues numbers; strings are
/// accepted so that any valid envelope can be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(u64),
    String(String),
}

impl RequestId {
    /// Whether a response `id` refers to this request.
    ///
    /// A string response ID that spells the same integer is accepted, as some
    /// proxies stringify numeric IDs.
    pub fn matches(&self, id: &Value) -> bool {
        match (self, id) {
            (Self::Number(n), Value::Number(m)) => m.as_u64() == Some(*n),
            (Self::Number(n), Value::String(s)) => s.parse::<u64>().ok() == Some(*n),
            (Self::String(s), Value::String(t)) => s == t,
            _ => false,
        }
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Request parameters as the node expects them: either a positional list or
/// a single bare value (scalar or record).
///
/// A single value must not itself be an array, otherwise it decodes back as
/// [`Params::Positional`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    Positional(Vec<Value>),
    Single(Value),
}

impl Params {
    /// Build positional params, dropping trailing `null`s so optional
    /// arguments the caller left out are not sent at all. Returns `None` when
    /// nothing is left.
    pub fn trimmed(mut values: Vec<Value>) -> Option<Self> {
        while values.last().is_some_and(Value::is_null) {
            values.pop();
        }
        if values.is_empty() {
            None
        } else {
            Some(Self::Positional(values))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    pub id: RequestId,
}

impl Request {
    pub fn new(method: &str, params: Option<Params>, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.to_owned(),
            params,
            id: RequestId::Number(id),
        }
    }
}

/// Per-client source of request IDs.
///
/// Every call to [`RequestIds::next`] returns a value strictly greater than
/// any previously returned by the same instance, across threads. The first
/// ID is 1.
#[derive(Debug, Default)]
pub struct RequestIds {
    last: AtomicU64,
}

impl RequestIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }
}

// ==============================================================================
// Response
// ==============================================================================

/// The `error` member of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
    #[serde(default)]
    pub id: Value,
}

/// Decode a raw response body produced by the request with ID `expected`.
///
/// Checks run in a fixed order: envelope shape, then ID, then `error.code`.
/// On success the `result` member is returned untouched (`null` when absent).
pub fn decode_response(body: &[u8], expected: &RequestId) -> Result<Value, RpcError> {
    let response: Response = serde_json::from_slice(body)
        .map_err(|e| RpcError::MalformedResponse(format!("decode JSON-RPC response: {e}")))?;

    if !expected.matches(&response.id) {
        warn!(rpc.id = %expected, received = %response.id, "rpc response id mismatch");
        return Err(RpcError::IdMismatch {
            expected: expected.clone(),
            received: response.id,
        });
    }

    if let Some(error) = response.error {
        if let Some(fault) = ServerFault::from_error_object(error) {
            return Err(RpcError::Server(fault));
        }
    }

    Ok(response.result.unwrap_or(Value::Null))
}

// ==============================================================================
// Error Codes
// ==============================================================================

/// Classification of a JSON-RPC `error.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    /// Implementation-defined server errors, -32099 through -32000.
    ServerError,
    /// Node-level failure reported with a positive code.
    ApplicationError,
    /// A negative code outside every reserved range.
    Unrecognized,
    NoError,
}

impl ErrorKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::NoError,
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32099..=-32000 => Self::ServerError,
            1.. => Self::ApplicationError,
            _ => Self::Unrecognized,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::ParseError => "invalid JSON was received by the server",
            Self::InvalidRequest => "the JSON sent is not a valid request object",
            Self::MethodNotFound => "the method does not exist / is not available",
            Self::InvalidParams => "invalid method parameter(s)",
            Self::InternalError => "internal JSON-RPC error",
            Self::ServerError => "server error",
            Self::ApplicationError => "node error",
            Self::Unrecognized => "unrecognized error code",
            Self::NoError => "no error",
        };
        f.write_str(text)
    }
}

/// A server-reported JSON-RPC error with a non-zero code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("JSON-RPC error {code}: {kind}: {message}")]
pub struct ServerFault {
    pub kind: ErrorKind,
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

impl ServerFault {
    /// `None` when the object carries code 0, which the node uses for "no error".
    pub fn from_error_object(error: ErrorObject) -> Option<Self> {
        match ErrorKind::from_code(error.code) {
            ErrorKind::NoError => None,
            kind => Some(Self {
                kind,
                code: error.code,
                message: error.message,
                data: error.data,
            }),
        }
    }
}
