//! Domain types mirroring the Nimiq node's JSON-RPC schema.
//!
//! Every record decodes with `#[serde(default)]`: fields the node leaves out
//! take their zero value. Whether a record exists at all is decided by the
//! call site (see `rpc::parsing`), not here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ==============================================================================
// Units
// ==============================================================================

/// Number of Luna in one NIM.
pub const LUNAS_PER_NIM: u64 = 100_000;

/// An amount in Luna, the smallest unit of NIM.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Luna(pub u64);

impl Luna {
    pub fn to_nim(self) -> Nim {
        Nim(self.0 as f64 / LUNAS_PER_NIM as f64)
    }
}

impl From<u64> for Luna {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl std::fmt::Display for Luna {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Luna", self.0)
    }
}

/// An amount in NIM, for display only. Arithmetic belongs on [`Luna`].
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nim(pub f64);

impl Nim {
    /// Convert to Luna, rounding to the nearest whole Luna. Negative and
    /// non-finite amounts saturate to zero.
    pub fn to_luna(self) -> Luna {
        let lunas = (self.0 * LUNAS_PER_NIM as f64).round();
        if lunas.is_finite() && lunas > 0.0 {
            Luna(lunas as u64)
        } else {
            Luna(0)
        }
    }
}

impl std::fmt::Display for Nim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5} NIM", self.0)
    }
}

/// Hex-encode the raw bytes of an address string.
pub fn address_to_hex(address: &str) -> String {
    address.bytes().map(|b| format!("{b:02x}")).collect()
}

// ==============================================================================
// Accounts & Wallets
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AccountType {
    #[default]
    Basic,
    Vesting,
    Htlc,
}

impl TryFrom<u8> for AccountType {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Basic),
            1 => Ok(Self::Vesting),
            2 => Ok(Self::Htlc),
            other => Err(format!("unknown account type {other}")),
        }
    }
}

impl From<AccountType> for u8 {
    fn from(t: AccountType) -> Self {
        match t {
            AccountType::Basic => 0,
            AccountType::Vesting => 1,
            AccountType::Htlc => 2,
        }
    }
}

/// Account details from `accounts` / `getAccount`.
///
/// Vesting fields are only set for [`AccountType::Vesting`], HTLC fields only
/// for [`AccountType::Htlc`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Account {
    /// Hex-encoded 20 byte address.
    pub id: String,
    /// User friendly address (NQ-address).
    pub address: String,
    pub balance: Luna,
    #[serde(rename = "type")]
    pub account_type: AccountType,

    pub owner: String,
    pub owner_address: String,
    pub vesting_start: u64,
    pub vesting_step_blocks: u64,
    pub vesting_step_amount: Luna,
    pub vesting_total_amount: Luna,

    pub sender: String,
    pub sender_address: String,
    pub recipient: String,
    pub recipient_address: String,
    pub hash_root: String,
    pub hash_algorithm: u8,
    pub hash_count: u64,
    pub timeout: u64,
    pub total_amount: Luna,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub address: String,
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

// ==============================================================================
// Transactions
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub block_hash: String,
    pub block_number: u64,
    pub timestamp: u64,
    pub confirmations: u64,
    pub transaction_index: u64,
    pub from: String,
    pub from_address: String,
    pub to: String,
    pub to_address: String,
    pub value: Luna,
    pub fee: Luna,
    pub data: Option<String>,
    pub flags: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub transaction_index: u64,
    pub block_hash: String,
    pub block_number: u64,
    pub confirmations: u64,
    pub timestamp: u64,
}

/// A transaction to be created or sent by the node's wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingTransaction {
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_type: Option<AccountType>,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_type: Option<AccountType>,
    pub value: Luna,
    pub fee: Luna,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

// ==============================================================================
// Blocks
// ==============================================================================

/// The `transactions` member of a block, in the shape the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    Hashes(Vec<String>),
    Objects(Vec<Transaction>),
}

impl BlockTransactions {
    pub fn len(&self) -> usize {
        match self {
            Self::Hashes(h) => h.len(),
            Self::Objects(o) => o.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hashes(&self) -> Option<&[String]> {
        match self {
            Self::Hashes(h) => Some(h),
            Self::Objects(_) => None,
        }
    }

    pub fn objects(&self) -> Option<&[Transaction]> {
        match self {
            Self::Hashes(_) => None,
            Self::Objects(o) => Some(o),
        }
    }
}

impl Default for BlockTransactions {
    fn default() -> Self {
        Self::Hashes(Vec::new())
    }
}

/// A block from `getBlockByHash` / `getBlockByNumber`.
///
/// `transactions` is not read by this type's `Deserialize`; the call site
/// decodes it separately once it knows which shape was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Block {
    pub number: u64,
    pub hash: String,
    pub pow: String,
    pub parent_hash: String,
    pub nonce: u64,
    pub body_hash: String,
    #[serde(alias = "accountHash")]
    pub accounts_hash: String,
    pub miner: String,
    pub miner_address: String,
    /// Decimal number encoded as a string.
    pub difficulty: String,
    pub extra_data: String,
    pub size: u64,
    pub timestamp: u64,
    #[serde(skip_deserializing)]
    pub transactions: BlockTransactions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockTemplateHeader {
    pub version: u16,
    pub prev_hash: String,
    pub interlink_hash: String,
    #[serde(alias = "accountHash")]
    pub accounts_hash: String,
    pub n_bits: u32,
    pub height: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockTemplateBody {
    pub hash: String,
    pub miner_addr: String,
    pub extra_data: String,
    /// Hex-encoded transactions.
    pub transactions: Vec<String>,
    pub pruned_accounts: Vec<String>,
    /// Merkle path of the miner address, for swapping it without a new template.
    pub merkle_hashes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockTemplate {
    pub header: BlockTemplateHeader,
    pub interlink: String,
    pub body: BlockTemplateBody,
    pub target: u32,
}

// ==============================================================================
// Mining, Mempool & Network
// ==============================================================================

/// Instructions to mine the next block, from `getWork`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Work {
    /// Hex-encoded block header; the last 4 bytes are the nonce.
    pub data: String,
    /// Hex-encoded block without the header, appended when submitting.
    pub suffix: String,
    pub target: u32,
    pub algorithm: String,
}

/// Mempool overview from `mempool`.
///
/// The node reports one count per fee-per-byte bucket, keyed by the bucket's
/// lower bound; those land in `counts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mempool {
    pub total: u64,
    pub buckets: Vec<u32>,
    #[serde(flatten)]
    pub counts: BTreeMap<String, u64>,
}

impl Mempool {
    /// Number of pending transactions in the bucket starting at `fee_per_byte`.
    pub fn bucket(&self, fee_per_byte: u32) -> u64 {
        self.counts
            .get(&fee_per_byte.to_string())
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncStatus {
    pub starting_block: u64,
    pub current_block: u64,
    pub highest_block: u64,
}

/// Result of `syncing`: the node answers `false` when it is not syncing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SyncState {
    NotSyncing,
    Syncing(SyncStatus),
}

impl SyncState {
    pub fn is_syncing(&self) -> bool {
        matches!(self, Self::Syncing(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Peer {
    pub id: String,
    pub address: String,
    pub address_state: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_state: Option<u8>,
    pub version: u32,
    pub time_offset: i64,
    pub head_hash: String,
    pub latency: u64,
    pub rx: u64,
    pub tx: u64,
}

// ==============================================================================
// Node Logging
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Assert,
}

impl std::str::FromStr for LogLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "verbose" => Ok(Self::Verbose),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "assert" => Ok(Self::Assert),
            other => Err(CoreError::InvalidArgument(format!(
                "unknown log level `{other}`"
            ))),
        }
    }
}
