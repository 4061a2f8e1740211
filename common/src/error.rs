//! Error taxonomy. Split into small, focused `thiserror` enums per concern
//! rather than one catch-all error type.

use thiserror::Error;

use crate::account::Nonce;

/// Stable numeric response codes returned to the consensus engine. The
/// discriminants are part of the wire contract and must never be
/// renumbered once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ResponseCode {
    Ok = 0,
    Internal = 1,
    UnknownRequest = 2,
    UnknownAddress = 3,
    OutOfGas = 4,
}

/// Per-transaction admission/delivery failures. Never fatal: every
/// variant is reported back to the caller as a `(code, log)` pair and
/// the node keeps running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("transaction exceeds max size")]
    OversizedTx,

    #[error("malformed transaction encoding")]
    MalformedTx,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("negative value")]
    NegativeValue,

    #[error("unknown sender account")]
    UnknownSender,

    #[error("gas limit {got} exceeds block gas limit {max}")]
    GasLimitExceeded { got: u64, max: u64 },

    #[error("bad nonce: Expected {expected} Got {got}")]
    BadNonce { expected: Nonce, got: Nonce },

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("intrinsic gas too low")]
    IntrinsicGasTooLow,

    #[error("backend rejected delivery: {0}")]
    BackendDeliverError(String),
}

impl AdmissionError {
    /// Maps a per-transaction failure to the stable response code and a
    /// human-readable log line. This is the only place internal error
    /// variants are translated into the wire contract — callers must not
    /// thread backend errors through unchanged.
    pub fn to_response(&self) -> (ResponseCode, String) {
        let code = match self {
            AdmissionError::OversizedTx
            | AdmissionError::MalformedTx
            | AdmissionError::InvalidSignature
            | AdmissionError::BadNonce { .. } => ResponseCode::Internal,
            AdmissionError::NegativeValue
            | AdmissionError::InsufficientFunds
            | AdmissionError::IntrinsicGasTooLow => ResponseCode::UnknownRequest,
            AdmissionError::UnknownSender => ResponseCode::UnknownAddress,
            AdmissionError::GasLimitExceeded { .. } => ResponseCode::OutOfGas,
            AdmissionError::BackendDeliverError(_) => ResponseCode::Internal,
        };
        (code, self.to_string())
    }
}

/// Consensus-level invariant violations. Never returned to a caller:
/// the facade logs with full context and aborts the process rather than
/// risk silent replica divergence.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("state unreadable after commit: {0}")]
    CommitStateUnreadable(String),

    #[error("intrinsic gas computation overflowed for a {payload_len}-byte payload")]
    IntrinsicGasComputationFailure { payload_len: usize },

    #[error("illegal lifecycle transition: {attempted} from {current:?}")]
    InvalidLifecycleTransition {
        current: &'static str,
        attempted: &'static str,
    },
}

impl FatalError {
    /// Logs with full context and aborts. There is deliberately no
    /// `Result` return here: callers that hit a `FatalError` have no
    /// safe path forward.
    pub fn abort(self) -> ! {
        log::error!("fatal consensus-bridge invariant violation: {self}");
        panic!("{self}");
    }
}

/// Failures forwarding a read query to the external RPC backend.
#[derive(Debug, Error)]
#[error("query error: {0}")]
pub struct QueryError(pub String);
