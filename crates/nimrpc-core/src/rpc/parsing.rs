use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::RpcError;
use crate::types::{
    Account, Block, BlockTransactions, Peer, SyncState, SyncStatus, Transaction,
    TransactionReceipt, Work,
};

fn unexpected(method: &str, reason: impl std::fmt::Display) -> RpcError {
    RpcError::ResultUnexpected {
        method: method.to_owned(),
        reason: reason.to_string(),
    }
}

pub(super) fn parse_result<R: DeserializeOwned>(method: &str, raw: Value) -> Result<R, RpcError> {
    serde_json::from_value(raw).map_err(|e| unexpected(method, e))
}

// ==============================================================================
// Lookups
// ==============================================================================

/// Records returned by lookups that the node answers with an empty record
/// (or `null`) when nothing matches.
pub(super) trait Lookup: DeserializeOwned {
    /// Whether the identifying field is empty, i.e. nothing was found.
    fn is_missing(&self) -> bool;
}

impl Lookup for Account {
    fn is_missing(&self) -> bool {
        self.id.is_empty()
    }
}

impl Lookup for Transaction {
    fn is_missing(&self) -> bool {
        self.hash.is_empty()
    }
}

impl Lookup for TransactionReceipt {
    fn is_missing(&self) -> bool {
        self.transaction_hash.is_empty()
    }
}

impl Lookup for Work {
    fn is_missing(&self) -> bool {
        self.data.is_empty()
    }
}

impl Lookup for Peer {
    fn is_missing(&self) -> bool {
        self.address.is_empty()
    }
}

pub(super) fn parse_lookup<R: Lookup>(method: &str, raw: Value) -> Result<Option<R>, RpcError> {
    if raw.is_null() {
        return Ok(None);
    }
    let record: R = parse_result(method, raw)?;
    Ok((!record.is_missing()).then_some(record))
}

// ==============================================================================
// Blocks
// ==============================================================================

#[derive(Deserialize)]
struct BlockResponse {
    #[serde(flatten)]
    block: Block,
    #[serde(default)]
    transactions: Value,
}

/// Decode a block and then its `transactions` member in the shape selected
/// by `full_transactions`: hashes when false, full records when true.
pub(super) fn parse_block(
    method: &str,
    raw: Value,
    full_transactions: bool,
) -> Result<Option<Block>, RpcError> {
    if raw.is_null() {
        return Ok(None);
    }

    let BlockResponse {
        mut block,
        transactions,
    } = parse_result(method, raw)?;
    if block.hash.is_empty() {
        return Ok(None);
    }

    block.transactions = parse_block_transactions(method, transactions, full_transactions)?;
    Ok(Some(block))
}

fn parse_block_transactions(
    method: &str,
    raw: Value,
    full_transactions: bool,
) -> Result<BlockTransactions, RpcError> {
    if raw.is_null() {
        return Ok(if full_transactions {
            BlockTransactions::Objects(Vec::new())
        } else {
            BlockTransactions::Hashes(Vec::new())
        });
    }

    if full_transactions {
        serde_json::from_value(raw)
            .map(BlockTransactions::Objects)
            .map_err(|e| unexpected(method, format!("block transactions as objects: {e}")))
    } else {
        serde_json::from_value(raw)
            .map(BlockTransactions::Hashes)
            .map_err(|e| unexpected(method, format!("block transactions as hashes: {e}")))
    }
}

// ==============================================================================
// Sync Status
// ==============================================================================

pub(super) fn parse_sync_state(method: &str, raw: Value) -> Result<SyncState, RpcError> {
    match raw {
        Value::Bool(false) => Ok(SyncState::NotSyncing),
        Value::Bool(true) => Ok(SyncState::Syncing(SyncStatus::default())),
        Value::Object(_) => parse_result(method, raw).map(SyncState::Syncing),
        other => Err(unexpected(
            method,
            format!("expected boolean or sync status object, got {other}"),
        )),
    }
}
