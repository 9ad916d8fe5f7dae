//! HTTP transport for Nimiq node endpoints.
//!
//! Implements [`Transport`](super::Transport) using `reqwest`, with basic
//! auth, static headers, and a pooled connection set up once per transport.

mod client;
mod connection;

pub use client::HttpTransport;
