use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::RpcError;

use super::protocol::Request;
use super::Transport;

#[derive(Clone)]
enum Reply {
    Result(Value),
    Error { code: i64, message: String },
    Body(Vec<u8>),
    Fail(fn() -> RpcError),
}

/// A mock transport for testing. Decodes each request envelope, records it,
/// and answers with the canned reply registered for its method, echoing the
/// request ID. Unregistered methods get a `-32601` error.
pub struct MockTransport {
    replies: HashMap<String, Reply>,
    response_id: Option<Value>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            replies: HashMap::new(),
            response_id: None,
        }
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("mock request log poisoned").clone()
    }

    /// The most recent request; panics when none was sent.
    pub fn last_request(&self) -> Request {
        self.requests()
            .pop()
            .expect("mock transport received no request")
    }
}

pub struct MockTransportBuilder {
    replies: HashMap<String, Reply>,
    response_id: Option<Value>,
}

impl MockTransportBuilder {
    pub fn with_result(mut self, method: &str, result: Value) -> Self {
        self.replies
            .insert(method.to_owned(), Reply::Result(result));
        self
    }

    pub fn with_error(mut self, method: &str, code: i64, message: &str) -> Self {
        self.replies.insert(
            method.to_owned(),
            Reply::Error {
                code,
                message: message.to_owned(),
            },
        );
        self
    }

    /// Answer `method` with a raw body instead of a well-formed envelope.
    pub fn with_body(mut self, method: &str, body: &[u8]) -> Self {
        self.replies
            .insert(method.to_owned(), Reply::Body(body.to_vec()));
        self
    }

    /// Fail `method` at the transport level.
    pub fn with_failure(mut self, method: &str, failure: fn() -> RpcError) -> Self {
        self.replies.insert(method.to_owned(), Reply::Fail(failure));
        self
    }

    /// Answer every request with this `id` instead of echoing the request's.
    pub fn with_response_id(mut self, id: Value) -> Self {
        self.response_id = Some(id);
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            replies: self.replies,
            response_id: self.response_id,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        let request: Request =
            serde_json::from_slice(&body).expect("client must send a valid request envelope");
        self.requests
            .lock()
            .expect("mock request log poisoned")
            .push(request.clone());

        let id = match &self.response_id {
            Some(id) => id.clone(),
            None => serde_json::to_value(&request.id).expect("request id must encode"),
        };

        let response = match self.replies.get(&request.method).cloned() {
            Some(Reply::Result(result)) => json!({"jsonrpc": "2.0", "result": result, "id": id}),
            Some(Reply::Error { code, message }) => json!({
                "jsonrpc": "2.0",
                "error": {"code": code, "message": message},
                "id": id
            }),
            Some(Reply::Body(raw)) => return Ok(raw),
            Some(Reply::Fail(failure)) => return Err(failure()),
            None => json!({
                "jsonrpc": "2.0",
                "error": {"code": -32601, "message": "Method not found"},
                "id": id
            }),
        };

        Ok(serde_json::to_vec(&response).expect("mock response must encode"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::protocol::{decode_response, Params, RequestId};

    fn encode(req: &Request) -> Vec<u8> {
        serde_json::to_vec(req).expect("request must encode")
    }

    #[tokio::test]
    async fn echoes_request_id() {
        let mock = MockTransport::builder()
            .with_result("blockNumber", json!(77))
            .build();
        let req = Request::new("blockNumber", None, 41);

        let body = mock.send(encode(&req)).await.expect("mock must answer");
        let result = decode_response(&body, &RequestId::Number(41)).expect("id must match");
        assert_eq!(result, json!(77));
        assert_eq!(mock.last_request(), req);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let mock = MockTransport::builder().build();
        let req = Request::new("nope", Some(Params::Single(json!(1))), 1);

        let body = mock.send(encode(&req)).await.expect("mock must answer");
        let err = decode_response(&body, &RequestId::Number(1)).expect_err("must fail");
        assert!(matches!(err, RpcError::Server(ref f) if f.code == -32601));
    }

    #[tokio::test]
    async fn failure_is_returned_before_any_envelope() {
        let mock = MockTransport::builder()
            .with_failure("accounts", || RpcError::Unauthorized)
            .build();
        let req = Request::new("accounts", None, 1);

        let err = mock.send(encode(&req)).await.expect_err("must fail");
        assert!(matches!(err, RpcError::Unauthorized));
        assert_eq!(mock.requests().len(), 1);
    }
}
