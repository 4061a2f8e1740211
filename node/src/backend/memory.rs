//! A minimal in-memory `ExecutionBackend`, restricted to balance/nonce —
//! no code/storage, since the EVM interpreter itself is out of scope.
//! Used by this crate's own tests and provided as a reference adapter for
//! callers with no real EVM/world-state backend to wire up yet.
//!
//! Committed state (`Sc`) only changes inside `commit`; `begin_block`
//! stages a clone as the pending block's intermediate state, and
//! `deliver_tx`/`accumulate_reward` mutate that clone, never `Sc`
//! directly.

use std::collections::HashMap;

use alloy_primitives::{keccak256, Address, U256};
use async_trait::async_trait;
use bridge_common::account::AccountSnapshot;
use bridge_common::backend::{BackendError, CommitResult, ExecutionBackend, PendingHeader};
use bridge_common::serializer::Writer;
use bridge_common::tx::RecoveredTransaction;

#[derive(Debug, Clone, Copy)]
struct MemoryAccount {
    balance: U256,
    nonce: u64,
}

struct PendingBlock {
    accounts: HashMap<Address, MemoryAccount>,
    #[allow(dead_code)]
    header: PendingHeader,
}

pub struct InMemoryBackend {
    committed: HashMap<Address, MemoryAccount>,
    pending: Option<PendingBlock>,
    height: u64,
    last_app_hash: Vec<u8>,
    block_gas_limit: u64,
}

impl InMemoryBackend {
    pub fn new(block_gas_limit: u64) -> Self {
        Self {
            committed: HashMap::new(),
            pending: None,
            height: 0,
            last_app_hash: Vec::new(),
            block_gas_limit,
        }
    }

    /// Test/bootstrap helper: directly seeds a committed account, as if
    /// it had been funded by a prior (out of scope) genesis allocation.
    pub fn fund(&mut self, address: Address, balance: U256, nonce: u64) {
        self.committed.insert(address, MemoryAccount { balance, nonce });
    }

    fn state_root(accounts: &HashMap<Address, MemoryAccount>) -> Vec<u8> {
        let mut addresses: Vec<&Address> = accounts.keys().collect();
        addresses.sort();

        let mut writer = Writer::new();
        for address in addresses {
            let account = &accounts[address];
            writer.write_fixed_bytes(address.as_slice());
            writer.write_u256(account.balance);
            writer.write_u64(account.nonce);
        }
        keccak256(writer.bytes()).to_vec()
    }
}

#[async_trait]
impl ExecutionBackend for InMemoryBackend {
    fn height(&self) -> u64 {
        self.height
    }

    fn last_app_hash(&self) -> Vec<u8> {
        self.last_app_hash.clone()
    }

    fn block_gas_limit(&self) -> u64 {
        self.block_gas_limit
    }

    async fn account_exists(&self, address: &Address) -> Result<bool, BackendError> {
        Ok(self.committed.contains_key(address))
    }

    async fn account_snapshot(&self, address: &Address) -> Result<AccountSnapshot, BackendError> {
        self.committed
            .get(address)
            .map(|account| AccountSnapshot::new(account.balance, account.nonce))
            .ok_or(BackendError::AccountNotFound(*address))
    }

    async fn begin_block(&mut self, header: PendingHeader) -> Result<(), BackendError> {
        self.pending = Some(PendingBlock {
            accounts: self.committed.clone(),
            header,
        });
        Ok(())
    }

    async fn deliver_tx(&mut self, recovered: &RecoveredTransaction) -> Result<(), BackendError> {
        let pending = self
            .pending
            .as_mut()
            .ok_or_else(|| BackendError::ExecutionFailed("deliver_tx outside a block".into()))?;

        let tx = &recovered.tx;
        let cost = tx
            .cost()
            .ok_or_else(|| BackendError::ExecutionFailed("transaction cost overflowed".into()))?;

        let sender = pending
            .accounts
            .entry(recovered.sender)
            .or_insert(MemoryAccount {
                balance: U256::ZERO,
                nonce: 0,
            });
        if sender.nonce != tx.nonce {
            return Err(BackendError::ExecutionFailed(format!(
                "nonce mismatch: expected {} got {}",
                sender.nonce, tx.nonce
            )));
        }
        if sender.balance < cost {
            return Err(BackendError::ExecutionFailed("insufficient funds".into()));
        }
        sender.balance -= cost;
        sender.nonce += 1;

        if let Some(to) = tx.to {
            let recipient = pending.accounts.entry(to).or_insert(MemoryAccount {
                balance: U256::ZERO,
                nonce: 0,
            });
            recipient.balance = recipient.balance.saturating_add(tx.value);
        }

        Ok(())
    }

    async fn accumulate_reward(
        &mut self,
        validator: &Address,
        amount: U256,
    ) -> Result<(), BackendError> {
        let pending = self.pending.as_mut().ok_or_else(|| {
            BackendError::ExecutionFailed("accumulate_reward outside a block".into())
        })?;
        let account = pending.accounts.entry(*validator).or_insert(MemoryAccount {
            balance: U256::ZERO,
            nonce: 0,
        });
        account.balance = account.balance.saturating_add(amount);
        Ok(())
    }

    async fn commit(&mut self) -> Result<CommitResult, BackendError> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| BackendError::StateUnreadable("commit without begin_block".into()))?;

        self.committed = pending.accounts;
        self.height += 1;

        let state_root = Self::state_root(&self.committed);
        let mut hash_input = self.height.to_be_bytes().to_vec();
        hash_input.extend_from_slice(&state_root);
        let block_hash = keccak256(&hash_input).to_vec();

        self.last_app_hash = block_hash.clone();

        Ok(CommitResult {
            block_hash,
            state_root,
        })
    }
}
