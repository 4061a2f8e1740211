mod codec;
mod signer;

pub use codec::{RecoveredTransaction, Transaction};
