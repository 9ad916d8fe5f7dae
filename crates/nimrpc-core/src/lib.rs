pub mod error;
pub mod rpc;
#[cfg(test)]
mod test_util;
pub mod types;

pub use error::{CoreError, RpcError};
pub use rpc::{HttpTransport, NimiqClient, Transport};
