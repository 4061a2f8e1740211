//! The admission validator (C4). `check_tx` runs an ordered sequence of
//! checks, stopping at the first failure, and mutates the mempool state
//! view on success. This is a free function over `&mut MempoolState`,
//! not a struct with its own state — a thin stateless operation over
//! borrowed state, not a god object.

use bridge_common::backend::ExecutionBackend;
use bridge_common::config::{GasSchedule, MAX_TX_SIZE};
use bridge_common::error::{AdmissionError, FatalError};
use bridge_common::tx::RecoveredTransaction;

use crate::state::MempoolState;

/// Runs the admission checks against `bytes`, in order:
/// size bound, decode, signer recovery, sender existence, block gas
/// ceiling, nonce equality, funds, intrinsic gas. On success, applies the
/// balance/nonce effects to `mempool`.
///
/// Takes only `mempool`, not a separate backend reference: `MempoolState`
/// owns the sole `Arc<Mutex<B>>` handle this function ever touches, and
/// locks/releases it per call. A caller holding its own guard on that same
/// mutex across this call would deadlock against `tokio::sync::Mutex`'s
/// non-reentrancy the first time this function falls through to the
/// backend (e.g. `MempoolState::exists` on an overlay cache-miss).
///
/// A "negative value" check is not a runtime check here: `Transaction`
/// carries its value as `alloy_primitives::U256`, an unsigned integer, so
/// no decoded transaction can ever have a negative value — the type
/// system enforces that invariant on its own, guarding against the sort
/// of out-of-band construction a non-canonical encoding could attempt.
pub async fn check_tx<B: ExecutionBackend>(
    bytes: &[u8],
    mempool: &mut MempoolState<B>,
) -> Result<(), AdmissionError> {
    if bytes.len() > MAX_TX_SIZE {
        return Err(AdmissionError::OversizedTx);
    }

    // `RecoveredTransaction::decode` performs both the decode (MalformedTx
    // on failure) and the signer-selection/recovery (InvalidSignature on
    // failure) in one pass.
    let recovered = RecoveredTransaction::decode(bytes)?;
    let tx = &recovered.tx;

    let sender_exists = match mempool.exists(&recovered.sender).await {
        Ok(exists) => exists,
        Err(err) => {
            log::warn!(
                "admission: backend account-existence check failed for {:?}: {err}",
                recovered.sender
            );
            false
        }
    };
    if !sender_exists {
        return Err(AdmissionError::UnknownSender);
    }

    let block_gas_limit = mempool.block_gas_limit().await;
    if tx.gas_limit > block_gas_limit {
        return Err(AdmissionError::GasLimitExceeded {
            got: tx.gas_limit,
            max: block_gas_limit,
        });
    }

    let sender_snapshot = match mempool.account(&recovered.sender).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            log::warn!(
                "admission: backend account read failed for {:?}: {err}",
                recovered.sender
            );
            return Err(AdmissionError::UnknownSender);
        }
    };

    if tx.nonce != sender_snapshot.nonce {
        return Err(AdmissionError::BadNonce {
            expected: sender_snapshot.nonce,
            got: tx.nonce,
        });
    }

    let cost = tx.cost().ok_or(AdmissionError::InsufficientFunds)?;
    if sender_snapshot.balance < cost {
        return Err(AdmissionError::InsufficientFunds);
    }

    let intrinsic = GasSchedule::intrinsic_gas(&tx.data, tx.is_contract_creation())
        .unwrap_or_else(|| {
            FatalError::IntrinsicGasComputationFailure {
                payload_len: tx.data.len(),
            }
            .abort()
        });
    if tx.gas_limit < intrinsic {
        return Err(AdmissionError::IntrinsicGasTooLow);
    }

    mempool
        .apply_admitted(&recovered, sender_snapshot)
        .await
        .map_err(|err| {
            log::warn!("admission: failed to apply accepted tx to mempool overlay: {err}");
            AdmissionError::UnknownSender
        })
}
