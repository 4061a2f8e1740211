//! Account-shaped primitives shared between the mempool projection and the
//! execution backend interface.

use alloy_primitives::U256;

pub use alloy_primitives::Address;

/// Account nonce. A plain alias over `u64` since this bridge has no
/// versioned-nonce history to track.
pub type Nonce = u64;

/// A read-only projection of an account as seen by the mempool or the
/// committed state: just enough to run admission and delivery checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub balance: U256,
    pub nonce: Nonce,
}

impl AccountSnapshot {
    pub fn new(balance: U256, nonce: Nonce) -> Self {
        Self { balance, nonce }
    }

    pub fn empty() -> Self {
        Self {
            balance: U256::ZERO,
            nonce: 0,
        }
    }
}
