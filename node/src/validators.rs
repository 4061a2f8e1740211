//! The validator set manager (C6) and the pluggable reward strategy it
//! is paired with at EndBlock. Both the elector (who gets added/evicted)
//! and the reward strategy (who gets paid, how much) are injected
//! traits, not globals — there is deliberately no process-global
//! singleton here.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An entry in the active validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub address: Address,
    pub voting_power: u64,
    pub public_key: Vec<u8>,
}

/// A voting-power change communicated to the consensus engine at
/// EndBlock. Zero voting power encodes a removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    pub address: Address,
    pub voting_power: u64,
}

/// Who gets added, re-weighted, or evicted at each block boundary. The
/// computation strategy is pluggable; this crate ships
/// only a no-op default suitable for a single fixed validator set.
pub trait ValidatorElector: Send + Sync {
    fn updates_at_height(&self, height: u64, current: &[ValidatorInfo]) -> Vec<ValidatorUpdate>;
}

/// Never changes the validator set. The reasonable default for a chain
/// whose validator membership is decided entirely by `InitChain`.
pub struct StaticValidatorElector;

impl ValidatorElector for StaticValidatorElector {
    fn updates_at_height(&self, _height: u64, _current: &[ValidatorInfo]) -> Vec<ValidatorUpdate> {
        Vec::new()
    }
}

/// Who gets paid a validator reward at EndBlock, and how much — reward
/// accumulation runs against this injected strategy.
pub trait RewardStrategy: Send + Sync {
    fn reward_for(&self, proposer: &Address, height: u64) -> U256;
}

/// Pays the same fixed amount to the block proposer every height.
pub struct FixedRewardStrategy(pub U256);

impl RewardStrategy for FixedRewardStrategy {
    fn reward_for(&self, _proposer: &Address, _height: u64) -> U256 {
        self.0
    }
}

/// Never pays a reward. Useful where the backend itself already accounts
/// for fees/rewards and this bridge should not double-pay.
pub struct NoReward;

impl RewardStrategy for NoReward {
    fn reward_for(&self, _proposer: &Address, _height: u64) -> U256 {
        U256::ZERO
    }
}

/// Tracks the active validator set and a height-indexed history used only
/// for observability only; nothing on the consensus-critical path reads
/// this history back.
pub struct ValidatorSetManager {
    current: Vec<ValidatorInfo>,
    history: HashMap<u64, Vec<ValidatorInfo>>,
    elector: std::sync::Arc<dyn ValidatorElector>,
}

impl ValidatorSetManager {
    pub fn new(elector: std::sync::Arc<dyn ValidatorElector>) -> Self {
        Self {
            current: Vec::new(),
            history: HashMap::new(),
            elector,
        }
    }

    /// `InitChain`: loads the genesis validator set.
    pub fn set_validators(&mut self, initial: Vec<ValidatorInfo>) {
        self.current = initial;
    }

    pub fn current(&self) -> &[ValidatorInfo] {
        &self.current
    }

    /// `EndBlock`: computes updates via the injected elector, applies
    /// them to the tracked set, and records a snapshot for observability.
    pub fn updates_at_height(&mut self, height: u64) -> Vec<ValidatorUpdate> {
        let updates = self.elector.updates_at_height(height, &self.current);

        for update in &updates {
            match self.current.iter_mut().find(|v| v.address == update.address) {
                Some(existing) => existing.voting_power = update.voting_power,
                None if update.voting_power > 0 => self.current.push(ValidatorInfo {
                    address: update.address,
                    voting_power: update.voting_power,
                    public_key: Vec::new(),
                }),
                None => {}
            }
        }
        self.current.retain(|v| v.voting_power > 0);
        self.history.insert(height, self.current.clone());

        updates
    }

    pub fn history_at(&self, height: u64) -> Option<&[ValidatorInfo]> {
        self.history.get(&height).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PromoteOneElector(ValidatorInfo);

    impl ValidatorElector for PromoteOneElector {
        fn updates_at_height(&self, _height: u64, _current: &[ValidatorInfo]) -> Vec<ValidatorUpdate> {
            vec![ValidatorUpdate {
                address: self.0.address,
                voting_power: self.0.voting_power,
            }]
        }
    }

    #[test]
    fn static_elector_never_changes_the_set() {
        let mut manager = ValidatorSetManager::new(std::sync::Arc::new(StaticValidatorElector));
        let v1 = ValidatorInfo {
            address: Address::repeat_byte(1),
            voting_power: 10,
            public_key: vec![],
        };
        manager.set_validators(vec![v1.clone()]);
        let updates = manager.updates_at_height(1);
        assert!(updates.is_empty());
        assert_eq!(manager.current(), &[v1]);
    }

    #[test]
    fn removal_is_encoded_as_zero_voting_power() {
        let v1 = ValidatorInfo {
            address: Address::repeat_byte(1),
            voting_power: 10,
            public_key: vec![],
        };
        let elector = PromoteOneElector(ValidatorInfo {
            address: v1.address,
            voting_power: 0,
            public_key: vec![],
        });
        let mut manager = ValidatorSetManager::new(std::sync::Arc::new(elector));
        manager.set_validators(vec![v1]);
        manager.updates_at_height(5);
        assert!(manager.current().is_empty());
    }

    #[test]
    fn new_validator_is_added_with_nonzero_power() {
        let v2 = ValidatorInfo {
            address: Address::repeat_byte(2),
            voting_power: 20,
            public_key: vec![],
        };
        let elector = PromoteOneElector(v2.clone());
        let mut manager = ValidatorSetManager::new(std::sync::Arc::new(elector));
        manager.updates_at_height(1);
        assert_eq!(manager.current(), &[v2]);
    }

    #[test]
    fn fixed_reward_strategy_pays_the_same_amount() {
        let strategy = FixedRewardStrategy(U256::from(50u64));
        assert_eq!(
            strategy.reward_for(&Address::repeat_byte(1), 1),
            U256::from(50u64)
        );
        assert_eq!(
            strategy.reward_for(&Address::repeat_byte(2), 99),
            U256::from(50u64)
        );
    }
}
