//! The block lifecycle controller (C5). Encodes the five legal states
//! as a tagged enum and the per-block transient state (Tb) as an
//! `Option`, present only between `BeginBlock` and `Commit` — the type
//! system then prevents DeliverTx-outside-block. Illegal transitions are
//! programmer errors: they abort the process rather than return a
//! `Result`, matching the broader fatal/recoverable error split.

use alloy_primitives::Address;
use bridge_common::error::FatalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    InBlock,
    Finalizing,
}

impl LifecycleState {
    fn name(self) -> &'static str {
        match self {
            LifecycleState::Idle => "Idle",
            LifecycleState::InBlock => "InBlock",
            LifecycleState::Finalizing => "Finalizing",
        }
    }
}

/// Per-block transient state (Tb): proposer, header time info, and a
/// running tally of delivery outcomes used by the validator set
/// manager's reward accumulation at EndBlock.
#[derive(Debug, Clone)]
pub struct BlockInProgress {
    pub proposer: Address,
    pub time_unix_seconds: i64,
    pub delivered: u64,
    pub failed_deliveries: u64,
}

pub struct BlockLifecycle {
    state: LifecycleState,
    current: Option<BlockInProgress>,
}

impl Default for BlockLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockLifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Idle,
            current: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// `InitChain` is an Idle -> Idle transition; it never touches
    /// `current`, it only asserts we're not mid-block.
    pub fn init_chain(&self) {
        self.assert_state(LifecycleState::Idle, "InitChain");
    }

    pub fn begin_block(&mut self, proposer: Address, time_unix_seconds: i64) {
        self.assert_state(LifecycleState::Idle, "BeginBlock");
        self.current = Some(BlockInProgress {
            proposer,
            time_unix_seconds,
            delivered: 0,
            failed_deliveries: 0,
        });
        self.state = LifecycleState::InBlock;
    }

    /// Records a delivery outcome. Called for every `DeliverTx`, whether
    /// the backend accepted or rejected the transaction — a malformed or
    /// rejected delivery is tallied, not aborted.
    pub fn record_delivery(&mut self, ok: bool) {
        self.assert_state(LifecycleState::InBlock, "DeliverTx");
        let block = self
            .current
            .as_mut()
            .expect("InBlock state implies `current` is populated");
        if ok {
            block.delivered += 1;
        } else {
            block.failed_deliveries += 1;
        }
    }

    /// Transitions `InBlock -> Finalizing` and returns the block-in-
    /// progress snapshot for the caller to run reward accumulation and
    /// validator-set updates against.
    pub fn end_block(&mut self) -> &BlockInProgress {
        self.assert_state(LifecycleState::InBlock, "EndBlock");
        self.state = LifecycleState::Finalizing;
        self.current
            .as_ref()
            .expect("InBlock/Finalizing state implies `current` is populated")
    }

    /// Transitions `Finalizing -> Idle`, clearing the transient state.
    pub fn commit(&mut self) -> BlockInProgress {
        self.assert_state(LifecycleState::Finalizing, "Commit");
        self.state = LifecycleState::Idle;
        self.current
            .take()
            .expect("Finalizing state implies `current` is populated")
    }

    fn assert_state(&self, expected: LifecycleState, attempted: &'static str) {
        if self.state != expected {
            FatalError::InvalidLifecycleTransition {
                current: self.state.name(),
                attempted,
            }
            .abort();
        }
    }
}
