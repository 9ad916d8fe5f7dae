use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap};
use reqwest::{StatusCode, Url};
use tracing::{debug, trace};

use crate::error::{CoreError, RpcError};

use super::super::Transport;
use super::connection::{build_headers, parse_connection, resolve_auth};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
const POOL_MAX_IDLE_PER_HOST: usize = 100;

/// JSON-RPC transport over HTTP(S) POST.
///
/// Holds a pooled `reqwest::Client`, so one instance should be shared by all
/// calls against the same node. Timeouts are fixed at construction.
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    auth: Option<(String, String)>,
    headers: HeaderMap,
}

impl HttpTransport {
    /// Create a transport for an `http://` or `https://` URL.
    ///
    /// `user` and `pass` enable HTTP Basic authentication and must be given
    /// together. `headers` are sent verbatim with every request, in addition
    /// to `Content-Type: application/json`.
    pub fn new(
        connection: &str,
        user: Option<&str>,
        pass: Option<&str>,
        headers: &[(String, String)],
    ) -> Result<Self, CoreError> {
        let auth = resolve_auth(user, pass)?;
        let url = parse_connection(connection)?;
        let headers = build_headers(headers)?;

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| CoreError::InvalidConfig(format!("build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url,
            auth,
            headers,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        let mut builder = self
            .client
            .post(self.url.clone())
            .headers(self.headers.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some((ref user, ref pass)) = self.auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send().await?;
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED => return Err(RpcError::NotAuthenticated),
            StatusCode::FORBIDDEN => return Err(RpcError::Unauthorized),
            _ => {}
        }

        let body = response.bytes().await?;
        debug!(%status, body_len = body.len(), "rpc http response");
        trace!(body = %String::from_utf8_lossy(&body), "rpc http response body");

        if body.is_empty() {
            return Err(RpcError::EmptyResponse);
        }

        Ok(body.to_vec())
    }
}
