//! The mempool state view (C3). A writable overlay on top of the
//! committed state exposed by the execution backend: borrowed storage
//! plus an owned overlay map, carrying the EVM-shaped account model
//! (balance/nonce) this bridge needs.
//!
//! `Sm` is rebuilt on every commit by discarding the overlay — a fresh
//! snapshot of Sc taken immediately after commit: once the overlay is
//! empty, every read falls through to the backend's now-committed values,
//! which is exactly a fresh `Sc.snapshot()` without an explicit deep copy.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use bridge_common::account::AccountSnapshot;
use bridge_common::backend::{BackendError, ExecutionBackend};
use bridge_common::tx::RecoveredTransaction;
use tokio::sync::Mutex;

/// Single-owner overlay over a shared execution backend. Only the
/// admission validator (C4) mutates this; the facade is the sole owner of
/// the `Mutex` guarding it, so writes to Sm never leak into Sc.
pub struct MempoolState<B: ExecutionBackend> {
    backend: Arc<Mutex<B>>,
    overlay: HashMap<Address, AccountSnapshot>,
}

impl<B: ExecutionBackend> MempoolState<B> {
    pub fn new(backend: Arc<Mutex<B>>) -> Self {
        Self {
            backend,
            overlay: HashMap::new(),
        }
    }

    /// Discards the overlay. Called at Commit so the next read falls
    /// through to the freshly committed backend state: at the start of
    /// block N+1, Sm equals Sc(N).
    pub fn reset(&mut self) {
        self.overlay.clear();
    }

    /// Gas ceiling enforced against admitted/delivered transactions.
    /// Locks and releases the shared backend for the duration of this call
    /// only, so callers never need their own backend guard just to read it.
    pub async fn block_gas_limit(&self) -> u64 {
        self.backend.lock().await.block_gas_limit()
    }

    /// Whether `address` is known, either already touched in this
    /// overlay or present in the committed state.
    pub async fn exists(&mut self, address: &Address) -> Result<bool, BackendError> {
        if self.overlay.contains_key(address) {
            return Ok(true);
        }
        self.backend.lock().await.account_exists(address).await
    }

    /// The account's projection, preferring the overlay. A backend
    /// `AccountNotFound` is treated as an empty account rather than
    /// propagated: a never-touched recipient is a legitimate target for
    /// a transfer that will bring it into existence.
    pub async fn account(&mut self, address: &Address) -> Result<AccountSnapshot, BackendError> {
        if let Some(snapshot) = self.overlay.get(address) {
            return Ok(*snapshot);
        }

        let snapshot = match self.backend.lock().await.account_snapshot(address).await {
            Ok(snapshot) => snapshot,
            Err(BackendError::AccountNotFound(_)) => AccountSnapshot::empty(),
            Err(other) => return Err(other),
        };
        self.overlay.insert(*address, snapshot);
        Ok(snapshot)
    }

    /// Applies the balance/nonce effects of an admitted transaction:
    /// sender's nonce advances to `tx.nonce + 1`
    /// and its balance drops by `cost(T)`; the recipient, if any, gains
    /// `T.value`. `pre_sender` must be the snapshot the caller validated
    /// the transaction against, so nonce/funds checks and mutation agree
    /// on the same read.
    pub async fn apply_admitted(
        &mut self,
        recovered: &RecoveredTransaction,
        pre_sender: AccountSnapshot,
    ) -> Result<(), BackendError> {
        let tx = &recovered.tx;
        let cost = tx
            .cost()
            .expect("cost() was already validated as Some by the admission path");

        let mut sender = pre_sender;
        sender.nonce = tx.nonce + 1;
        sender.balance = sender
            .balance
            .checked_sub(cost)
            .expect("balance >= cost was already validated by the admission path");
        self.overlay.insert(recovered.sender, sender);

        if let Some(to) = tx.to {
            let mut recipient = self.account(&to).await?;
            recipient.balance = recipient.balance.saturating_add(tx.value);
            self.overlay.insert(to, recipient);
        }

        Ok(())
    }
}
