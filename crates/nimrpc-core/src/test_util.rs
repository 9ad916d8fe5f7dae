//! Shared test helpers for `nimrpc-core` unit tests.
//!
//! JSON fixtures shaped like real node responses, so that tests across
//! modules agree on what the node sends.

use serde_json::{json, Value};

/// A confirmed basic transfer with the given hash and value in Luna.
pub fn transaction_json(hash: &str, value: u64) -> Value {
    json!({
        "hash": hash,
        "blockHash": "5f3e",
        "blockNumber": 1200,
        "timestamp": 1_560_000_000,
        "confirmations": 4,
        "transactionIndex": 0,
        "from": "0f1e",
        "fromAddress": "NQ24 0000 0000 0000 0000 0000 0000 0000 0001",
        "to": "2c3d",
        "toAddress": "NQ24 0000 0000 0000 0000 0000 0000 0000 0002",
        "value": value,
        "fee": 138,
        "data": null,
        "flags": 0
    })
}

/// A block at height 1200 with `transactions` set verbatim.
pub fn block_json(hash: &str, transactions: Value) -> Value {
    json!({
        "number": 1200,
        "hash": hash,
        "pow": "0000",
        "parentHash": "4e2d",
        "nonce": 123_456,
        "bodyHash": "aa01",
        "accountsHash": "bb02",
        "miner": "cc03",
        "minerAddress": "NQ24 0000 0000 0000 0000 0000 0000 0000 0003",
        "difficulty": "1.5",
        "extraData": "",
        "size": 512,
        "timestamp": 1_560_000_000,
        "transactions": transactions
    })
}

/// A basic account holding `balance` Luna.
pub fn account_json(id: &str, balance: u64) -> Value {
    json!({
        "id": id,
        "address": "NQ24 0000 0000 0000 0000 0000 0000 0000 0001",
        "balance": balance,
        "type": 0
    })
}
