pub mod account;
pub mod backend;
pub mod config;
pub mod error;
pub mod serializer;
pub mod tx;

pub use account::{Address, Nonce};
pub use tx::{RecoveredTransaction, Transaction};
