//! Typed wrappers for the Nimiq node's JSON-RPC methods.
//!
//! Method names and parameter shapes follow the node verbatim. Lookups that
//! the node answers with an empty record return `Ok(None)`.

use serde_json::{json, Value};

use crate::error::{CoreError, RpcError};
use crate::types::{
    Account, Block, BlockTemplate, Luna, LogLevel, Mempool, OutgoingTransaction, Peer, SyncState,
    Transaction, TransactionReceipt, Wallet, Work,
};

use super::client::NimiqClient;
use super::parsing::{parse_block, parse_lookup, parse_sync_state};
use super::protocol::Params;
use super::Transport;

fn single(value: Value) -> Option<Params> {
    Some(Params::Single(value))
}

fn positional(values: Vec<Value>) -> Option<Params> {
    Some(Params::Positional(values))
}

/// Optional mining overrides: miner address, then extra data.
fn mining_overrides(miner_address: Option<&str>, extra_data: Option<&str>) -> Option<Params> {
    Params::trimmed(vec![json!(miner_address), json!(extra_data)])
}

impl<T: Transport> NimiqClient<T> {
    // ==========================================================================
    // Accounts & Wallet
    // ==========================================================================

    /// Addresses owned by the node's wallet.
    pub async fn accounts(&self) -> Result<Vec<Account>, CoreError> {
        self.call("accounts", None).await
    }

    /// Create a new account and store its private key in the node's wallet.
    pub async fn create_account(&self) -> Result<Wallet, CoreError> {
        self.call("createAccount", None).await
    }

    pub async fn get_account(&self, address: &str) -> Result<Option<Account>, CoreError> {
        let raw = self.raw_call("getAccount", single(json!(address))).await?;
        Ok(parse_lookup("getAccount", raw)?)
    }

    pub async fn get_balance(&self, address: &str) -> Result<Luna, CoreError> {
        self.call("getBalance", single(json!(address))).await
    }

    // ==========================================================================
    // Blocks
    // ==========================================================================

    /// Height of the most recent block.
    pub async fn block_number(&self) -> Result<u64, CoreError> {
        self.call("blockNumber", None).await
    }

    /// Fetch a block by hash. With `full_transactions` the block carries full
    /// transaction records, otherwise only their hashes.
    pub async fn get_block_by_hash(
        &self,
        block_hash: &str,
        full_transactions: bool,
    ) -> Result<Option<Block>, CoreError> {
        let raw = self
            .raw_call(
                "getBlockByHash",
                positional(vec![json!(block_hash), json!(full_transactions)]),
            )
            .await?;
        Ok(parse_block("getBlockByHash", raw, full_transactions)?)
    }

    /// Fetch a block by height; see [`Self::get_block_by_hash`].
    pub async fn get_block_by_number(
        &self,
        block_number: u64,
        full_transactions: bool,
    ) -> Result<Option<Block>, CoreError> {
        let raw = self
            .raw_call(
                "getBlockByNumber",
                positional(vec![json!(block_number), json!(full_transactions)]),
            )
            .await?;
        Ok(parse_block("getBlockByNumber", raw, full_transactions)?)
    }

    pub async fn get_block_transaction_count_by_hash(
        &self,
        block_hash: &str,
    ) -> Result<u64, CoreError> {
        self.call("getBlockTransactionCountByHash", single(json!(block_hash)))
            .await
    }

    pub async fn get_block_transaction_count_by_number(
        &self,
        block_number: u64,
    ) -> Result<u64, CoreError> {
        self.call("getBlockTransactionCountByNumber", single(json!(block_number)))
            .await
    }

    // ==========================================================================
    // Transactions
    // ==========================================================================

    pub async fn get_transaction_by_hash(
        &self,
        transaction_hash: &str,
    ) -> Result<Option<Transaction>, CoreError> {
        let raw = self
            .raw_call("getTransactionByHash", single(json!(transaction_hash)))
            .await?;
        Ok(parse_lookup("getTransactionByHash", raw)?)
    }

    pub async fn get_transaction_by_block_hash_and_index(
        &self,
        block_hash: &str,
        index: u32,
    ) -> Result<Option<Transaction>, CoreError> {
        let raw = self
            .raw_call(
                "getTransactionByBlockHashAndIndex",
                positional(vec![json!(block_hash), json!(index)]),
            )
            .await?;
        Ok(parse_lookup("getTransactionByBlockHashAndIndex", raw)?)
    }

    pub async fn get_transaction_by_block_number_and_index(
        &self,
        block_number: u64,
        index: u32,
    ) -> Result<Option<Transaction>, CoreError> {
        let raw = self
            .raw_call(
                "getTransactionByBlockNumberAndIndex",
                positional(vec![json!(block_number), json!(index)]),
            )
            .await?;
        Ok(parse_lookup("getTransactionByBlockNumberAndIndex", raw)?)
    }

    pub async fn get_transaction_receipt(
        &self,
        transaction_hash: &str,
    ) -> Result<Option<TransactionReceipt>, CoreError> {
        let raw = self
            .raw_call("getTransactionReceipt", single(json!(transaction_hash)))
            .await?;
        Ok(parse_lookup("getTransactionReceipt", raw)?)
    }

    /// Latest transactions by or for `address`, at most `max_entries`. The
    /// node may return fewer even when more exist.
    pub async fn get_transactions_by_address(
        &self,
        address: &str,
        max_entries: u32,
    ) -> Result<Vec<Transaction>, CoreError> {
        self.call(
            "getTransactionsByAddress",
            positional(vec![json!(address), json!(max_entries)]),
        )
        .await
    }

    /// Create and sign a transaction without sending it. Returns it hex-encoded.
    pub async fn create_raw_transaction(
        &self,
        transaction: &OutgoingTransaction,
    ) -> Result<String, CoreError> {
        let params = serde_json::to_value(transaction).map_err(RpcError::EncodeRequest)?;
        self.call("createRawTransaction", single(params)).await
    }

    /// Send a transaction signed by the node's wallet. Returns its hash.
    pub async fn send_transaction(
        &self,
        transaction: &OutgoingTransaction,
    ) -> Result<String, CoreError> {
        let params = serde_json::to_value(transaction).map_err(RpcError::EncodeRequest)?;
        self.call("sendTransaction", single(params)).await
    }

    /// Broadcast a hex-encoded signed transaction. Returns its hash.
    pub async fn send_raw_transaction(&self, signed_transaction: &str) -> Result<String, CoreError> {
        self.call("sendRawTransaction", single(json!(signed_transaction)))
            .await
    }

    // ==========================================================================
    // Mining
    // ==========================================================================

    /// Template for the next block. `miner_address` and `extra_data` override
    /// what the node was started with (or what its pool sent).
    pub async fn get_block_template(
        &self,
        miner_address: Option<&str>,
        extra_data: Option<&str>,
    ) -> Result<BlockTemplate, CoreError> {
        self.call(
            "getBlockTemplate",
            mining_overrides(miner_address, extra_data),
        )
        .await
    }

    /// Instructions to mine the next block; `None` when the node has no work.
    pub async fn get_work(
        &self,
        miner_address: Option<&str>,
        extra_data: Option<&str>,
    ) -> Result<Option<Work>, CoreError> {
        let raw = self
            .raw_call("getWork", mining_overrides(miner_address, extra_data))
            .await?;
        Ok(parse_lookup("getWork", raw)?)
    }

    /// Submit a hex-encoded full block (header, interlink and body). When
    /// submitting work from [`Self::get_work`], include the suffix.
    pub async fn submit_block(&self, full_block: &str) -> Result<(), CoreError> {
        self.raw_call("submitBlock", single(json!(full_block)))
            .await?;
        Ok(())
    }

    pub async fn mining(&self) -> Result<bool, CoreError> {
        self.call("mining", None).await
    }

    /// Hashes per second the node is mining with.
    pub async fn hashrate(&self) -> Result<f64, CoreError> {
        self.call("hashrate", None).await
    }

    // ==========================================================================
    // Node State
    // ==========================================================================

    pub async fn consensus(&self) -> Result<String, CoreError> {
        self.call("consensus", None).await
    }

    pub async fn syncing(&self) -> Result<SyncState, CoreError> {
        let raw = self.raw_call("syncing", None).await?;
        Ok(parse_sync_state("syncing", raw)?)
    }

    pub async fn mempool(&self) -> Result<Mempool, CoreError> {
        self.call("mempool", None).await
    }

    pub async fn peer_count(&self) -> Result<u64, CoreError> {
        self.call("peerCount", None).await
    }

    pub async fn peer_list(&self) -> Result<Vec<Peer>, CoreError> {
        self.call("peerList", None).await
    }

    pub async fn peer_state(&self, address: &str) -> Result<Option<Peer>, CoreError> {
        let raw = self.raw_call("peerState", single(json!(address))).await?;
        Ok(parse_lookup("peerState", raw)?)
    }

    /// Set the node's log level for `tag` (`*` for all tags).
    pub async fn log(&self, tag: &str, level: LogLevel) -> Result<bool, CoreError> {
        self.call("log", positional(vec![json!(tag), json!(level)]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::rpc::mock::MockTransport;
    use crate::rpc::protocol::{ErrorKind, ServerFault};
    use crate::test_util::*;
    use crate::types::{AccountType, BlockTransactions, SyncStatus};

    fn client(mock: MockTransport) -> NimiqClient<MockTransport> {
        NimiqClient::with_transport(mock)
    }

    #[tokio::test]
    async fn block_number_sends_no_params() {
        let rpc = client(MockTransport::builder().with_result("blockNumber", json!(1200)).build());
        assert_eq!(rpc.block_number().await.expect("must succeed"), 1200);
        assert_eq!(rpc.transport().last_request().params, None);
    }

    #[tokio::test]
    async fn get_balance_sends_bare_address() {
        let rpc = client(MockTransport::builder().with_result("getBalance", json!(250_000)).build());
        let balance = rpc.get_balance("NQ01").await.expect("must succeed");
        assert_eq!(balance, Luna(250_000));
        assert_eq!(balance.to_nim().0, 2.5);
        assert_eq!(
            rpc.transport().last_request().params,
            Some(Params::Single(json!("NQ01")))
        );
    }

    #[tokio::test]
    async fn get_account_found_and_missing() {
        let rpc = client(
            MockTransport::builder()
                .with_result("getAccount", account_json("ab12", 9))
                .build(),
        );
        let account = rpc
            .get_account("NQ01")
            .await
            .expect("must succeed")
            .expect("account must be found");
        assert_eq!(account.id, "ab12");
        assert_eq!(account.account_type, AccountType::Basic);

        let rpc = client(
            MockTransport::builder()
                .with_result("getAccount", account_json("", 0))
                .build(),
        );
        assert!(rpc.get_account("NQ01").await.expect("must succeed").is_none());
    }

    #[tokio::test]
    async fn get_block_by_number_hashes() {
        let rpc = client(
            MockTransport::builder()
                .with_result("getBlockByNumber", block_json("b1", json!(["t1"])))
                .build(),
        );
        let block = rpc
            .get_block_by_number(1200, false)
            .await
            .expect("must succeed")
            .expect("block must be found");
        assert_eq!(block.transactions, BlockTransactions::Hashes(vec!["t1".into()]));
        assert_eq!(
            rpc.transport().last_request().params,
            Some(Params::Positional(vec![json!(1200), json!(false)]))
        );
    }

    #[tokio::test]
    async fn get_block_by_hash_uses_its_own_method_and_full_objects() {
        let rpc = client(
            MockTransport::builder()
                .with_result(
                    "getBlockByHash",
                    block_json("b1", json!([transaction_json("t1", 100)])),
                )
                .build(),
        );
        let block = rpc
            .get_block_by_hash("b1", true)
            .await
            .expect("must succeed")
            .expect("block must be found");
        let objects = block.transactions.objects().expect("objects requested");
        assert_eq!(objects[0].value, Luna(100));

        let sent = rpc.transport().last_request();
        assert_eq!(sent.method, "getBlockByHash");
        assert_eq!(
            sent.params,
            Some(Params::Positional(vec![json!("b1"), json!(true)]))
        );
    }

    #[tokio::test]
    async fn get_block_unknown_is_none() {
        let rpc = client(
            MockTransport::builder()
                .with_result("getBlockByNumber", Value::Null)
                .build(),
        );
        assert!(rpc
            .get_block_by_number(99_999_999, true)
            .await
            .expect("must succeed")
            .is_none());
    }

    #[tokio::test]
    async fn transaction_lookups_normalize_missing() {
        let rpc = client(
            MockTransport::builder()
                .with_result("getTransactionByHash", json!({"hash": ""}))
                .with_result(
                    "getTransactionByBlockHashAndIndex",
                    transaction_json("t9", 1),
                )
                .with_result("getTransactionByBlockNumberAndIndex", Value::Null)
                .with_result("getTransactionReceipt", json!({"transactionHash": "t9", "confirmations": 2}))
                .build(),
        );

        assert!(rpc
            .get_transaction_by_hash("t0")
            .await
            .expect("must succeed")
            .is_none());

        let tx = rpc
            .get_transaction_by_block_hash_and_index("b1", 3)
            .await
            .expect("must succeed")
            .expect("transaction must be found");
        assert_eq!(tx.hash, "t9");
        assert_eq!(
            rpc.transport().last_request().params,
            Some(Params::Positional(vec![json!("b1"), json!(3)]))
        );

        assert!(rpc
            .get_transaction_by_block_number_and_index(5, 0)
            .await
            .expect("must succeed")
            .is_none());

        let receipt = rpc
            .get_transaction_receipt("t9")
            .await
            .expect("must succeed")
            .expect("receipt must be found");
        assert_eq!(receipt.confirmations, 2);
    }

    #[tokio::test]
    async fn get_transactions_by_address_sends_limit() {
        let rpc = client(
            MockTransport::builder()
                .with_result(
                    "getTransactionsByAddress",
                    json!([transaction_json("t1", 1), transaction_json("t2", 2)]),
                )
                .build(),
        );
        let txs = rpc
            .get_transactions_by_address("NQ01", 1000)
            .await
            .expect("must succeed");
        assert_eq!(txs.len(), 2);
        assert_eq!(
            rpc.transport().last_request().params,
            Some(Params::Positional(vec![json!("NQ01"), json!(1000)]))
        );
    }

    #[tokio::test]
    async fn send_transaction_passes_record_as_single_param() {
        let rpc = client(
            MockTransport::builder()
                .with_result("sendTransaction", json!("f00d"))
                .build(),
        );
        let tx = OutgoingTransaction {
            from: "NQ01".into(),
            to: "NQ02".into(),
            value: Luna(100_000),
            fee: Luna(138),
            ..Default::default()
        };
        assert_eq!(rpc.send_transaction(&tx).await.expect("must succeed"), "f00d");
        assert_eq!(
            rpc.transport().last_request().params,
            Some(Params::Single(
                json!({"from": "NQ01", "to": "NQ02", "value": 100_000, "fee": 138})
            ))
        );
    }

    #[tokio::test]
    async fn create_raw_transaction_application_error() {
        let rpc = client(
            MockTransport::builder()
                .with_error("createRawTransaction", 1, "Insufficient funds")
                .build(),
        );
        let err = rpc
            .create_raw_transaction(&OutgoingTransaction::default())
            .await
            .expect_err("node error must surface");
        match err {
            CoreError::Rpc(RpcError::Server(ServerFault { kind, message, .. })) => {
                assert_eq!(kind, ErrorKind::ApplicationError);
                assert_eq!(message, "Insufficient funds");
            }
            other => panic!("expected application error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reserved_error_codes_reach_the_caller() {
        let rpc = client(
            MockTransport::builder()
                .with_error("sendRawTransaction", -32602, "Invalid params")
                .build(),
        );
        let err = rpc
            .send_raw_transaction("zz")
            .await
            .expect_err("must fail");
        assert!(matches!(
            err,
            CoreError::Rpc(RpcError::Server(ServerFault { kind: ErrorKind::InvalidParams, .. }))
        ));

        let rpc = client(MockTransport::builder().build());
        let err = rpc.hashrate().await.expect_err("unregistered method");
        assert!(matches!(
            err,
            CoreError::Rpc(RpcError::Server(ServerFault { kind: ErrorKind::MethodNotFound, .. }))
        ));
    }

    #[tokio::test]
    async fn mining_overrides_are_trimmed() {
        let work = json!({"data": "00ff", "suffix": "11", "target": 503_382_015u32, "algorithm": "nimiq-argon2"});
        let rpc = client(
            MockTransport::builder()
                .with_result("getWork", work)
                .with_result("getBlockTemplate", json!({"target": 7, "body": {"minerAddr": "cc"}}))
                .build(),
        );

        let found = rpc
            .get_work(None, None)
            .await
            .expect("must succeed")
            .expect("work must be present");
        assert_eq!(found.algorithm, "nimiq-argon2");
        assert_eq!(rpc.transport().last_request().params, None);

        let template = rpc
            .get_block_template(Some("NQ01"), None)
            .await
            .expect("must succeed");
        assert_eq!(template.target, 7);
        assert_eq!(template.body.miner_addr, "cc");
        assert_eq!(
            rpc.transport().last_request().params,
            Some(Params::Positional(vec![json!("NQ01")]))
        );

        rpc.get_work(None, Some("beef")).await.expect("must succeed");
        assert_eq!(
            rpc.transport().last_request().params,
            Some(Params::Positional(vec![Value::Null, json!("beef")]))
        );
    }

    #[tokio::test]
    async fn get_work_without_data_is_none() {
        let rpc = client(
            MockTransport::builder()
                .with_result("getWork", json!({"data": "", "target": 0}))
                .build(),
        );
        assert!(rpc.get_work(None, None).await.expect("must succeed").is_none());
    }

    #[tokio::test]
    async fn submit_block_ignores_result() {
        let rpc = client(MockTransport::builder().with_result("submitBlock", Value::Null).build());
        rpc.submit_block("00aa").await.expect("must succeed");
        assert_eq!(rpc.transport().last_request().method, "submitBlock");
    }

    #[tokio::test]
    async fn syncing_and_status() {
        let rpc = client(MockTransport::builder().with_result("syncing", json!(false)).build());
        assert_eq!(rpc.syncing().await.expect("must succeed"), SyncState::NotSyncing);

        let rpc = client(
            MockTransport::builder()
                .with_result("syncing", json!({"startingBlock": 10, "currentBlock": 20, "highestBlock": 30}))
                .build(),
        );
        let state = rpc.syncing().await.expect("must succeed");
        assert!(state.is_syncing());
        assert_eq!(
            state,
            SyncState::Syncing(SyncStatus { starting_block: 10, current_block: 20, highest_block: 30 })
        );
    }

    #[tokio::test]
    async fn node_state_scalars() {
        let rpc = client(
            MockTransport::builder()
                .with_result("consensus", json!("established"))
                .with_result("mining", json!(true))
                .with_result("hashrate", json!(52_982.5))
                .with_result("peerCount", json!(12))
                .with_result("getBlockTransactionCountByHash", json!(4))
                .with_result("getBlockTransactionCountByNumber", json!(5))
                .build(),
        );
        assert_eq!(rpc.consensus().await.expect("consensus"), "established");
        assert!(rpc.mining().await.expect("mining"));
        assert_eq!(rpc.hashrate().await.expect("hashrate"), 52_982.5);
        assert_eq!(rpc.peer_count().await.expect("peers"), 12);
        assert_eq!(
            rpc.get_block_transaction_count_by_hash("b1").await.expect("count"),
            4
        );
        assert_eq!(
            rpc.get_block_transaction_count_by_number(7).await.expect("count"),
            5
        );
        assert_eq!(
            rpc.transport().last_request().params,
            Some(Params::Single(json!(7)))
        );
    }

    #[tokio::test]
    async fn mempool_and_peers() {
        let rpc = client(
            MockTransport::builder()
                .with_result("mempool", json!({"total": 3, "buckets": [2], "2": 3}))
                .with_result(
                    "peerList",
                    json!([{"id": "p1", "address": "wss://seed1.nimiq.com:8443/abc", "addressState": 2, "connectionState": 5}]),
                )
                .with_result("peerState", json!({"id": "", "address": ""}))
                .build(),
        );
        let mempool = rpc.mempool().await.expect("mempool");
        assert_eq!(mempool.bucket(2), 3);

        let peers = rpc.peer_list().await.expect("peers");
        assert_eq!(peers[0].connection_state, Some(5));

        assert!(rpc
            .peer_state("wss://unknown:8443/x")
            .await
            .expect("peer state")
            .is_none());
    }

    #[tokio::test]
    async fn wallet_accounts_and_log() {
        let rpc = client(
            MockTransport::builder()
                .with_result("accounts", json!([account_json("a1", 1), account_json("a2", 2)]))
                .with_result(
                    "createAccount",
                    json!({"id": "a3", "address": "NQ03", "publicKey": "pk"}),
                )
                .with_result("log", json!(true))
                .build(),
        );
        assert_eq!(rpc.accounts().await.expect("accounts").len(), 2);

        let wallet = rpc.create_account().await.expect("create account");
        assert_eq!(wallet.public_key, "pk");
        assert!(wallet.private_key.is_none());

        assert!(rpc.log("*", LogLevel::Debug).await.expect("log"));
        assert_eq!(
            rpc.transport().last_request().params,
            Some(Params::Positional(vec![json!("*"), json!("debug")]))
        );
    }

    #[tokio::test]
    async fn transport_failures_propagate_unchanged() {
        let rpc = client(
            MockTransport::builder()
                .with_failure("accounts", || RpcError::NotAuthenticated)
                .with_failure("mining", || RpcError::EmptyResponse)
                .with_body("peerCount", b"<html>bad gateway</html>")
                .build(),
        );
        assert!(matches!(
            rpc.accounts().await,
            Err(CoreError::Rpc(RpcError::NotAuthenticated))
        ));
        assert!(matches!(
            rpc.mining().await,
            Err(CoreError::Rpc(RpcError::EmptyResponse))
        ));
        assert!(matches!(
            rpc.peer_count().await,
            Err(CoreError::Rpc(RpcError::MalformedResponse(_)))
        ));
    }
}
