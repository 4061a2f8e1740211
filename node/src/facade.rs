//! The application facade (C8). The single surface exposed to the
//! consensus engine; its async methods map 1:1 to the protocol
//! operations. Enforces the C5 lifecycle, routes requests to the
//! relevant subsystem, and translates internal errors into the stable
//! response codes — it never leaks an internal error variant past this
//! boundary.
//!
//! Consensus-facing methods take `&self` with interior mutability
//! (`tokio::sync::Mutex`): an external server framework (out of scope)
//! needs to hold a shared `Arc<Application<B>>`, even though the
//! single-threaded consensus contract means these mutexes are
//! uncontended in the common case.

use std::sync::Arc;

use alloy_primitives::Address;
use bridge_common::backend::{ExecutionBackend, PendingHeader};
use bridge_common::error::{AdmissionError, FatalError, ResponseCode};
use bridge_common::tx::RecoveredTransaction;
use tokio::sync::Mutex;

use crate::appdata::AppDataStore;
use crate::lifecycle::BlockLifecycle;
use crate::query::{self, RpcClient};
use crate::state::MempoolState;
use crate::validators::{RewardStrategy, ValidatorElector, ValidatorInfo, ValidatorSetManager, ValidatorUpdate};
use crate::admission;

/// `Info() -> {data, lastBlockHeight, lastBlockAppHash}`.
#[derive(Debug, Clone)]
pub struct InfoResponse {
    pub data: String,
    pub last_block_height: u64,
    pub last_block_app_hash: Vec<u8>,
}

/// `CheckTx(txBytes) -> {code, log}` and `DeliverTx(txBytes) -> {code, log}`
/// share this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResponse {
    pub code: ResponseCode,
    pub log: String,
}

impl TxResponse {
    fn ok() -> Self {
        Self {
            code: ResponseCode::Ok,
            log: String::new(),
        }
    }

    fn from_admission_error(err: &AdmissionError) -> Self {
        let (code, log) = err.to_response();
        Self { code, log }
    }
}

#[derive(Debug, Clone)]
pub struct InitChainRequest {
    pub validators: Vec<ValidatorInfo>,
}

#[derive(Debug, Clone)]
pub struct BeginBlockRequest {
    pub proposer: Address,
    pub time_unix_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct EndBlockRequest {
    pub height: u64,
}

#[derive(Debug, Clone)]
pub struct EndBlockResponse {
    pub validator_updates: Vec<ValidatorUpdate>,
}

/// `Commit() -> {data}` where `data` is the new block hash.
#[derive(Debug, Clone)]
pub struct CommitResponse {
    pub data: Vec<u8>,
}

/// `Query({path, data, height, prove}) -> {code, value, log}`.
/// `path`/`height`/`prove` are carried for protocol completeness; the
/// query forwarder (C7) only interprets `data`.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub path: String,
    pub data: Vec<u8>,
    pub height: u64,
    pub prove: bool,
}

#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub code: ResponseCode,
    pub value: Vec<u8>,
    pub log: String,
}

pub struct Application<B: ExecutionBackend> {
    backend: Arc<Mutex<B>>,
    mempool: Mutex<MempoolState<B>>,
    lifecycle: Mutex<BlockLifecycle>,
    validators: Mutex<ValidatorSetManager>,
    reward_strategy: Arc<dyn RewardStrategy>,
    rpc: Arc<dyn RpcClient>,
    appdata: AppDataStore,
}

impl<B: ExecutionBackend> Application<B> {
    pub fn new(
        backend: B,
        elector: Arc<dyn ValidatorElector>,
        reward_strategy: Arc<dyn RewardStrategy>,
        rpc: Arc<dyn RpcClient>,
        appdata: AppDataStore,
    ) -> Self {
        let backend = Arc::new(Mutex::new(backend));
        let mempool = MempoolState::new(backend.clone());
        Self {
            backend,
            mempool: Mutex::new(mempool),
            lifecycle: Mutex::new(BlockLifecycle::new()),
            validators: Mutex::new(ValidatorSetManager::new(elector)),
            reward_strategy,
            rpc,
            appdata,
        }
    }

    /// `Info()`. Special case: at height 0 (fresh
    /// chain, pre-genesis commit), `lastAppHash` is empty, not a hash of
    /// an empty state — consensus engines rely on this sentinel to
    /// detect first boot.
    pub async fn info(&self) -> InfoResponse {
        let backend = self.backend.lock().await;
        let height = backend.height();
        let app_hash = if height == 0 {
            Vec::new()
        } else {
            backend.last_app_hash()
        };
        InfoResponse {
            data: "bridge-node".to_string(),
            last_block_height: height,
            last_block_app_hash: app_hash,
        }
    }

    /// `SetOption(key, value) -> ack`: a no-op in this core.
    pub async fn set_option(&self, key: &str, value: &str) {
        log::debug!("SetOption is a no-op in this core: {key}={value}");
    }

    pub async fn init_chain(&self, req: InitChainRequest) {
        self.lifecycle.lock().await.init_chain();
        self.validators.lock().await.set_validators(req.validators);
    }

    /// `CheckTx`. Admits against the mempool state view (C3/C4); never
    /// touches committed state. Does not hold its own backend guard:
    /// `MempoolState` locks `self.backend`'s `Arc<Mutex<B>>` clone
    /// internally, and `tokio::sync::Mutex` is not reentrant, so a guard
    /// held here across the call into admission would deadlock the first
    /// time the mempool overlay falls through to the backend.
    pub async fn check_tx(&self, bytes: &[u8]) -> TxResponse {
        let mut mempool = self.mempool.lock().await;
        match admission::check_tx(bytes, &mut mempool).await {
            Ok(()) => TxResponse::ok(),
            Err(err) => TxResponse::from_admission_error(&err),
        }
    }

    pub async fn begin_block(&self, req: BeginBlockRequest) {
        self.lifecycle
            .lock()
            .await
            .begin_block(req.proposer, req.time_unix_seconds);

        let mut backend = self.backend.lock().await;
        if let Err(err) = backend
            .begin_block(PendingHeader {
                proposer: req.proposer,
                time_unix_seconds: req.time_unix_seconds,
            })
            .await
        {
            log::error!("backend begin_block failed: {err}");
        }
    }

    /// `DeliverTx`. A malformed or backend-rejected delivery is recorded
    /// as a failed delivery and reported back, never aborted — consensus
    /// has already ordered the transaction.
    pub async fn deliver_tx(&self, bytes: &[u8]) -> TxResponse {
        let recovered = match RecoveredTransaction::decode(bytes) {
            Ok(recovered) => recovered,
            Err(err) => {
                self.lifecycle.lock().await.record_delivery(false);
                return TxResponse::from_admission_error(&err);
            }
        };

        let mut backend = self.backend.lock().await;
        let outcome = backend.deliver_tx(&recovered).await;
        drop(backend);

        let mut lifecycle = self.lifecycle.lock().await;
        match outcome {
            Ok(()) => {
                lifecycle.record_delivery(true);
                TxResponse::ok()
            }
            Err(err) => {
                lifecycle.record_delivery(false);
                let admission_err = AdmissionError::BackendDeliverError(err.to_string());
                TxResponse::from_admission_error(&admission_err)
            }
        }
    }

    /// `EndBlock`. Runs reward accumulation against the injected
    /// strategy, then returns the validator-set delta from C6.
    pub async fn end_block(&self, req: EndBlockRequest) -> EndBlockResponse {
        let block = {
            let mut lifecycle = self.lifecycle.lock().await;
            lifecycle.end_block().clone()
        };

        let reward = self
            .reward_strategy
            .reward_for(&block.proposer, req.height);
        let mut backend = self.backend.lock().await;
        if let Err(err) = backend.accumulate_reward(&block.proposer, reward).await {
            log::error!("reward accumulation failed: {err}");
        }
        drop(backend);

        let mut validators = self.validators.lock().await;
        let updates = validators.updates_at_height(req.height);
        self.appdata
            .record_validator_set(req.height, validators.current());

        EndBlockResponse {
            validator_updates: updates,
        }
    }

    /// `Commit`. Failure to read the new state back is fatal: this
    /// replica halts rather than risk silent divergence.
    pub async fn commit(&self) -> CommitResponse {
        self.lifecycle.lock().await.commit();

        let mut backend = self.backend.lock().await;
        let result = match backend.commit().await {
            Ok(result) => result,
            Err(err) => FatalError::CommitStateUnreadable(err.to_string()).abort(),
        };
        drop(backend);

        log::info!(
            "committed block at height {}, hash={}",
            self.backend.lock().await.height(),
            hex::encode(&result.block_hash)
        );

        self.mempool.lock().await.reset();

        CommitResponse {
            data: result.block_hash,
        }
    }

    /// `Query`. Purely read-side; forwards to the injected RPC client.
    pub async fn query(&self, req: &QueryRequest) -> QueryResponse {
        match query::query(&req.data, &*self.rpc).await {
            Ok(value) => QueryResponse {
                code: ResponseCode::Ok,
                value,
                log: String::new(),
            },
            Err(err) => QueryResponse {
                code: ResponseCode::Internal,
                value: Vec::new(),
                log: err.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::InMemoryBackend;
    use crate::query::RpcClientError;
    use crate::test_support::{signed_transfer, signer_address};
    use crate::validators::{FixedRewardStrategy, StaticValidatorElector};
    use alloy_primitives::U256;
    use bridge_common::serializer::Serializer;
    use serde_json::Value;

    struct UnavailableRpc;

    #[async_trait::async_trait]
    impl RpcClient for UnavailableRpc {
        async fn call(&self, method: &str, _params: &[Value]) -> Result<Value, RpcClientError> {
            Err(RpcClientError(format!("no rpc backend for {method}")))
        }
    }

    fn new_app(gas_limit: u64, dir: &std::path::Path) -> Application<InMemoryBackend> {
        let backend = InMemoryBackend::new(gas_limit);
        let appdata = AppDataStore::open(dir).unwrap();
        Application::new(
            backend,
            Arc::new(StaticValidatorElector),
            Arc::new(FixedRewardStrategy(U256::ZERO)),
            Arc::new(UnavailableRpc),
            appdata,
        )
    }

    #[tokio::test]
    async fn fresh_chain_boot_sentinel() {
        // Scenario 1: Info() at height 0 has empty lastBlockAppHash; a
        // full block cycle with zero deliveries then moves to height 1
        // with a non-empty hash.
        let dir = tempfile::tempdir().unwrap();
        let app = new_app(30_000_000, dir.path());

        let info = app.info().await;
        assert_eq!(info.last_block_height, 0);
        assert!(info.last_block_app_hash.is_empty());

        app.init_chain(InitChainRequest {
            validators: vec![ValidatorInfo {
                address: Address::repeat_byte(1),
                voting_power: 10,
                public_key: vec![],
            }],
        })
        .await;
        app.begin_block(BeginBlockRequest {
            proposer: Address::repeat_byte(1),
            time_unix_seconds: 1,
        })
        .await;
        let end = app.end_block(EndBlockRequest { height: 1 }).await;
        assert!(end.validator_updates.is_empty());
        let commit = app.commit().await;
        assert!(!commit.data.is_empty());

        let info = app.info().await;
        assert_eq!(info.last_block_height, 1);
        assert!(!info.last_block_app_hash.is_empty());
    }

    #[tokio::test]
    async fn commit_rebuilds_mempool_from_committed_state() {
        // Scenario 6: after a good CheckTx and a matching Commit, the
        // mempool's nonce view equals the committed nonce again.
        let dir = tempfile::tempdir().unwrap();
        let app = new_app(30_000_000, dir.path());

        let sender = signer_address();
        {
            let mut backend = app.backend.lock().await;
            backend.fund(sender, U256::from(1000u64), 5);
        }

        let tx = signed_transfer(5, Some(Address::repeat_byte(0xCC)), U256::from(100u64));
        let bytes = tx.to_bytes();

        let check = app.check_tx(&bytes).await;
        assert_eq!(check.code, ResponseCode::Ok);

        app.begin_block(BeginBlockRequest {
            proposer: Address::repeat_byte(9),
            time_unix_seconds: 1,
        })
        .await;
        let deliver = app.deliver_tx(&bytes).await;
        assert_eq!(deliver.code, ResponseCode::Ok);
        app.end_block(EndBlockRequest { height: 1 }).await;
        app.commit().await;

        let post_commit_nonce = {
            let mut mempool = app.mempool.lock().await;
            mempool.account(&sender).await.unwrap().nonce
        };
        let committed_nonce = {
            let backend = app.backend.lock().await;
            backend.account_snapshot(&sender).await.unwrap().nonce
        };
        assert_eq!(post_commit_nonce, committed_nonce);
        assert_eq!(post_commit_nonce, 6);
    }

    #[tokio::test]
    async fn set_option_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let app = new_app(30_000_000, dir.path());
        // Should simply not panic or change any observable state.
        app.set_option("key", "value").await;
        assert_eq!(app.info().await.last_block_height, 0);
    }
}
