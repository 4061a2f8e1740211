//! The execution backend interface (C2). The EVM/world-state implementation
//! itself is out of scope — this module only defines the narrow trait
//! the bridge depends on, injected at construction rather than reached
//! through a process-global singleton.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::account::AccountSnapshot;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("account not found: {0}")]
    AccountNotFound(Address),

    #[error("backend execution failed: {0}")]
    ExecutionFailed(String),

    #[error("state unreadable: {0}")]
    StateUnreadable(String),
}

/// Information the consensus engine supplies at the start of a block.
#[derive(Debug, Clone)]
pub struct PendingHeader {
    pub proposer: Address,
    pub time_unix_seconds: i64,
}

/// Result of finalizing a block through the backend.
#[derive(Debug, Clone)]
pub struct CommitResult {
    pub block_hash: Vec<u8>,
    pub state_root: Vec<u8>,
}

/// Abstraction over the EVM/world-state. Owns the committed state `Sc`;
/// mutated only inside `begin_block`/`deliver_tx`/`accumulate_reward`/
/// `commit` — `Sc` changes only at Commit.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Height of the last committed block. Zero before the first commit.
    fn height(&self) -> u64;

    /// App hash of the last committed block. Must be empty at height
    /// zero — consensus engines use this sentinel to detect first boot
    /// (the Info() special case for a fresh chain).
    fn last_app_hash(&self) -> Vec<u8>;

    /// Gas limit enforced for the current/next block.
    fn block_gas_limit(&self) -> u64;

    /// Whether `address` exists in the committed state.
    async fn account_exists(&self, address: &Address) -> Result<bool, BackendError>;

    /// Read-only projection of an account's balance/nonce from the
    /// committed state. Used by the mempool state view to seed its
    /// overlay on first touch.
    async fn account_snapshot(
        &self,
        address: &Address,
    ) -> Result<AccountSnapshot, BackendError>;

    /// Begin a new block: record the pending header. No state root
    /// change yet.
    async fn begin_block(&mut self, header: PendingHeader) -> Result<(), BackendError>;

    /// Apply a transaction against the pending block's intermediate
    /// state. Failures here are per-transaction, not fatal: the caller
    /// reports them and continues the block.
    async fn deliver_tx(
        &mut self,
        tx: &crate::tx::RecoveredTransaction,
    ) -> Result<(), BackendError>;

    /// Accumulate a validator reward into the per-block ledger
    /// (via the reward strategy).
    async fn accumulate_reward(
        &mut self,
        validator: &Address,
        amount: U256,
    ) -> Result<(), BackendError>;

    /// Finalize the pending block, producing a block hash and state
    /// root. Failure to read the new state back is fatal to the caller
    /// this trait just surfaces the error, the
    /// facade decides to abort.
    async fn commit(&mut self) -> Result<CommitResult, BackendError>;
}
