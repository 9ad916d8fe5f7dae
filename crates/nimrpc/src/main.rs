mod cli;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde::Serialize;

use nimrpc_core::types::{OutgoingTransaction, SyncState};
use nimrpc_core::{CoreError, HttpTransport, NimiqClient, RpcError};

use cli::{Command, MiningArgs, TransferArgs};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_level(true)
        .init();

    let transport = HttpTransport::new(
        &args.rpc_url,
        args.rpc_user.as_deref(),
        args.rpc_pass.as_deref(),
        &args.headers,
    )
    .context("configure RPC transport")?;
    let client = NimiqClient::with_transport(transport);
    tracing::debug!(url = %args.rpc_url, "using node");

    run(&client, args.command).await.map_err(|err| {
        let mut report = eyre!("{err}");
        if let Some(hint) = hint_for(&err) {
            report = report.wrap_err(hint);
        }
        report.wrap_err(format!("RPC call to `{}` failed", args.rpc_url))
    })
}

async fn run(client: &NimiqClient, command: Command) -> Result<(), CoreError> {
    match command {
        Command::Accounts => print_json(&client.accounts().await?),
        Command::BlockNumber => println!("{}", client.block_number().await?),
        Command::Consensus => println!("{}", client.consensus().await?),
        Command::CreateAccount => print_json(&client.create_account().await?),
        Command::CreateRawTransaction(transfer) => {
            println!("{}", client.create_raw_transaction(&outgoing(transfer)).await?)
        }
        Command::GetAccount { address } => {
            print_found(client.get_account(&address).await?, "account")
        }
        Command::GetBalance { address } => {
            let balance = client.get_balance(&address).await?;
            println!("{balance} ({})", balance.to_nim());
        }
        Command::GetBlockByHash {
            hash,
            full_transactions,
        } => print_found(
            client.get_block_by_hash(&hash, full_transactions).await?,
            "block",
        ),
        Command::GetBlockByNumber {
            number,
            full_transactions,
        } => print_found(
            client.get_block_by_number(number, full_transactions).await?,
            "block",
        ),
        Command::GetBlockTemplate(MiningArgs {
            miner_address,
            extra_data,
        }) => print_json(
            &client
                .get_block_template(miner_address.as_deref(), extra_data.as_deref())
                .await?,
        ),
        Command::GetBlockTransactionCountByHash { hash } => {
            println!("{}", client.get_block_transaction_count_by_hash(&hash).await?)
        }
        Command::GetBlockTransactionCountByNumber { number } => println!(
            "{}",
            client.get_block_transaction_count_by_number(number).await?
        ),
        Command::GetTransactionByBlockHashAndIndex { hash, index } => print_found(
            client
                .get_transaction_by_block_hash_and_index(&hash, index)
                .await?,
            "transaction",
        ),
        Command::GetTransactionByBlockNumberAndIndex { number, index } => print_found(
            client
                .get_transaction_by_block_number_and_index(number, index)
                .await?,
            "transaction",
        ),
        Command::GetTransactionByHash { hash } => print_found(
            client.get_transaction_by_hash(&hash).await?,
            "transaction",
        ),
        Command::GetTransactionReceipt { hash } => print_found(
            client.get_transaction_receipt(&hash).await?,
            "transaction receipt",
        ),
        Command::GetTransactionsByAddress {
            address,
            max_entries,
        } => print_json(
            &client
                .get_transactions_by_address(&address, max_entries)
                .await?,
        ),
        Command::GetWork(MiningArgs {
            miner_address,
            extra_data,
        }) => print_found(
            client
                .get_work(miner_address.as_deref(), extra_data.as_deref())
                .await?,
            "work",
        ),
        Command::Hashrate => println!("{}", client.hashrate().await?),
        Command::Log { tag, level } => println!("{}", client.log(&tag, level).await?),
        Command::Mempool => print_json(&client.mempool().await?),
        Command::Mining => println!("{}", client.mining().await?),
        Command::PeerCount => println!("{}", client.peer_count().await?),
        Command::PeerList => print_json(&client.peer_list().await?),
        Command::PeerState { address } => {
            print_found(client.peer_state(&address).await?, "peer")
        }
        Command::SendRawTransaction { transaction } => {
            println!("{}", client.send_raw_transaction(&transaction).await?)
        }
        Command::SendTransaction(transfer) => {
            println!("{}", client.send_transaction(&outgoing(transfer)).await?)
        }
        Command::SubmitBlock { block } => {
            client.submit_block(&block).await?;
            println!("submitted");
        }
        Command::Syncing => match client.syncing().await? {
            SyncState::NotSyncing => println!("not syncing"),
            SyncState::Syncing(status) => print_json(&status),
        },
    }
    Ok(())
}

fn outgoing(transfer: TransferArgs) -> OutgoingTransaction {
    OutgoingTransaction {
        from: transfer.from,
        to: transfer.to,
        value: transfer.value,
        fee: transfer.fee,
        data: transfer.data,
        ..Default::default()
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::error!(error = %e, "failed to render result as JSON"),
    }
}

fn print_found<T: Serialize>(value: Option<T>, what: &str) {
    match value {
        Some(value) => print_json(&value),
        None => println!("{what} not found"),
    }
}

fn hint_for(err: &CoreError) -> Option<&'static str> {
    match err {
        CoreError::Rpc(RpcError::NotAuthenticated) => {
            Some("hint: the node requires credentials; pass --rpc-user and --rpc-pass")
        }
        CoreError::Rpc(RpcError::Unauthorized) => {
            Some("hint: the credentials were rejected for this method; verify the node's RPC user")
        }
        CoreError::Rpc(RpcError::Transport(_)) => {
            Some("hint: request could not be sent; verify --rpc-url and that the node is reachable")
        }
        CoreError::Rpc(RpcError::IdMismatch { .. }) => {
            Some("hint: a proxy between client and node may be mixing up responses")
        }
        _ => None,
    }
}
