use clap::{Parser, Subcommand};
use nimrpc_core::types::{LogLevel, Luna};

/// Command-line client for a Nimiq node's JSON-RPC interface.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Node JSON-RPC URL.
    #[arg(long, default_value = "http://127.0.0.1:8648", env = "NIMRPC_RPC_URL")]
    pub rpc_url: String,

    /// RPC username (HTTP Basic auth; requires --rpc-pass).
    #[arg(long, env = "NIMRPC_RPC_USER")]
    pub rpc_user: Option<String>,

    /// RPC password (HTTP Basic auth; requires --rpc-user).
    #[arg(long, env = "NIMRPC_RPC_PASS")]
    pub rpc_pass: Option<String>,

    /// Extra header sent with every request, as `Name: value` (repeatable).
    #[arg(long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List the addresses owned by the node's wallet.
    Accounts,
    /// Height of the most recent block.
    BlockNumber,
    /// Current consensus state.
    Consensus,
    /// Create a new account in the node's wallet.
    CreateAccount,
    /// Create and sign a transaction without sending it.
    CreateRawTransaction(TransferArgs),
    /// Details for the account at an address.
    GetAccount { address: String },
    /// Balance of the account at an address.
    GetBalance { address: String },
    /// A block by hash.
    GetBlockByHash {
        hash: String,
        /// Include full transaction objects instead of hashes.
        #[arg(long)]
        full_transactions: bool,
    },
    /// A block by number.
    GetBlockByNumber {
        number: u64,
        /// Include full transaction objects instead of hashes.
        #[arg(long)]
        full_transactions: bool,
    },
    /// A template to build the next block for mining.
    GetBlockTemplate(MiningArgs),
    /// Number of transactions in the block with the given hash.
    GetBlockTransactionCountByHash { hash: String },
    /// Number of transactions in the block with the given number.
    GetBlockTransactionCountByNumber { number: u64 },
    /// A transaction by block hash and index.
    GetTransactionByBlockHashAndIndex { hash: String, index: u32 },
    /// A transaction by block number and index.
    GetTransactionByBlockNumberAndIndex { number: u64, index: u32 },
    /// A transaction by hash.
    GetTransactionByHash { hash: String },
    /// The receipt of a transaction by hash.
    GetTransactionReceipt { hash: String },
    /// Latest transactions by or for an address.
    GetTransactionsByAddress {
        address: String,
        #[arg(long, default_value = "1000")]
        max_entries: u32,
    },
    /// Instructions to mine the next block.
    GetWork(MiningArgs),
    /// Hashes per second the node is mining with.
    Hashrate,
    /// Set the node's log level.
    Log {
        /// Log tag, `*` for all.
        tag: String,
        /// trace, verbose, debug, info, warn, error or assert.
        level: LogLevel,
    },
    /// Mempool overview.
    Mempool,
    /// Whether the node is mining.
    Mining,
    /// Number of connected peers.
    PeerCount,
    /// Connected peers.
    PeerList,
    /// State of the peer at an address.
    PeerState { address: String },
    /// Broadcast a hex-encoded signed transaction.
    SendRawTransaction { transaction: String },
    /// Send a transaction from the node's wallet.
    SendTransaction(TransferArgs),
    /// Submit a hex-encoded full block.
    SubmitBlock { block: String },
    /// Whether the node is syncing, and how far along.
    Syncing,
}

#[derive(clap::Args, Debug, PartialEq)]
pub struct TransferArgs {
    /// Sending address.
    #[arg(long)]
    pub from: String,
    /// Receiving address.
    #[arg(long)]
    pub to: String,
    /// Amount in Luna.
    #[arg(long, value_parser = parse_luna)]
    pub value: Luna,
    /// Fee in Luna.
    #[arg(long, default_value = "0", value_parser = parse_luna)]
    pub fee: Luna,
    /// Hex-encoded message.
    #[arg(long)]
    pub data: Option<String>,
}

#[derive(clap::Args, Debug, PartialEq)]
pub struct MiningArgs {
    /// Miner address overriding the node's.
    #[arg(long)]
    pub miner_address: Option<String>,
    /// Hex-encoded extra data overriding the node's.
    #[arg(long)]
    pub extra_data: Option<String>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in `{raw}`"));
    }
    Ok((name.to_owned(), value.trim().to_owned()))
}

fn parse_luna(raw: &str) -> Result<Luna, String> {
    raw.parse::<u64>()
        .map(Luna)
        .map_err(|e| format!("invalid Luna amount `{raw}`: {e}"))
}
