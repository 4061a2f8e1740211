//! Property tests for the admission validator (C4): nonce monotonicity
//! in the mempool overlay, and agreement between `CheckTx` admission and
//! the in-memory backend's own `DeliverTx` bookkeeping for the
//! transactions admission accepts.

use std::sync::Arc;

use alloy_primitives::{keccak256, Address, B256, U256};
use bridge_common::backend::ExecutionBackend;
use bridge_common::serializer::{Serializer, Writer};
use bridge_common::tx::{RecoveredTransaction, Transaction};
use bridge_node::admission;
use bridge_node::backend::memory::InMemoryBackend;
use bridge_node::state::MempoolState;
use k256::ecdsa::SigningKey;
use proptest::prelude::*;
use tokio::sync::Mutex;

fn throwaway_key() -> SigningKey {
    SigningKey::from_bytes(&[42u8; 32].into()).unwrap()
}

fn sender_address() -> Address {
    let verifying_key = throwaway_key().verifying_key().to_owned();
    let encoded = verifying_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

fn signing_preimage(tx: &Transaction) -> Vec<u8> {
    let mut writer = Writer::new();
    match &tx.to {
        Some(addr) => {
            writer.write_u8(1);
            writer.write_fixed_bytes(addr.as_slice());
        }
        None => writer.write_u8(0),
    }
    writer.write_u256(tx.value);
    writer.write_u64(tx.gas_limit);
    writer.write_u256(tx.gas_price);
    writer.write_u64(tx.nonce);
    writer.write_bytes(&tx.data);
    match tx.chain_id {
        Some(id) => {
            writer.write_u8(1);
            writer.write_u64(id);
        }
        None => writer.write_u8(0),
    }
    writer.bytes()
}

fn sign(nonce: u64, to: Address, value: U256) -> Transaction {
    let signing_key = throwaway_key();
    let mut tx = Transaction {
        to: Some(to),
        value,
        gas_limit: 21_000,
        gas_price: U256::from(1u64),
        nonce,
        data: vec![],
        chain_id: Some(1),
        signature: [0u8; 65],
    };
    let hash: B256 = keccak256(&signing_preimage(&tx));
    let (sig, recid) = signing_key.sign_prehash_recoverable(hash.as_slice()).unwrap();
    let sig_bytes = sig.to_bytes();
    let mut raw = [0u8; 65];
    raw[..64].copy_from_slice(&sig_bytes);
    raw[64] = recid.to_byte();
    tx.signature = raw;
    tx
}

proptest! {
    /// Admitting a strictly increasing run of nonces, starting at the
    /// account's actual committed nonce, always succeeds and leaves the
    /// mempool's nonce exactly `start + len`: every admitted transaction
    /// advances the overlay nonce by exactly one.
    #[test]
    fn sequential_nonces_admit_in_order_and_advance_monotonically(
        start_nonce in 0u64..1000,
        run_length in 1usize..12,
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let sender = sender_address();
            let recipient = Address::repeat_byte(0x55);

            let mut backend = InMemoryBackend::new(30_000_000);
            // Fund generously enough to cover every tx in the run.
            let funding = U256::from(21_100u64) * U256::from(run_length as u64 + 1);
            backend.fund(sender, funding, start_nonce);
            let backend = Arc::new(Mutex::new(backend));
            let mut mempool = MempoolState::new(backend.clone());

            let mut observed_nonces = Vec::new();
            for offset in 0..run_length as u64 {
                let tx = sign(start_nonce + offset, recipient, U256::from(1u64));
                let bytes = tx.to_bytes();
                let result = admission::check_tx(&bytes, &mut mempool).await;
                prop_assert!(result.is_ok(), "admission failed at offset {offset}: {result:?}");

                let post = mempool.account(&sender).await.unwrap();
                observed_nonces.push(post.nonce);
            }

            // Each admitted tx advances the overlay nonce by exactly one,
            // so the recorded sequence is strictly increasing by one.
            for window in observed_nonces.windows(2) {
                prop_assert_eq!(window[1], window[0] + 1);
            }
            prop_assert_eq!(
                *observed_nonces.last().unwrap(),
                start_nonce + run_length as u64
            );
            Ok(())
        })?;
    }

    /// Any transaction admission accepts is one `DeliverTx` against the
    /// backend would also accept verbatim: CheckTx and DeliverTx agree on
    /// every admitted transaction, modulo concurrent interleaving the
    /// single-threaded consensus contract rules out.
    #[test]
    fn admitted_transactions_also_deliver_successfully(
        nonce in 0u64..500,
        value in 0u64..5_000,
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let sender = sender_address();
            let recipient = Address::repeat_byte(0x66);

            let mut backend = InMemoryBackend::new(30_000_000);
            backend.fund(sender, U256::from(1_000_000u64), nonce);
            let backend = Arc::new(Mutex::new(backend));
            let mut mempool = MempoolState::new(backend.clone());

            let tx = sign(nonce, recipient, U256::from(value));
            let bytes = tx.to_bytes();

            let admitted = admission::check_tx(&bytes, &mut mempool).await;
            prop_assert!(admitted.is_ok(), "{admitted:?}");

            let recovered = RecoveredTransaction::decode(&bytes).unwrap();
            let mut guard = backend.lock().await;
            guard
                .begin_block(bridge_common::backend::PendingHeader {
                    proposer: Address::repeat_byte(1),
                    time_unix_seconds: 0,
                })
                .await
                .unwrap();
            let delivered = guard.deliver_tx(&recovered).await;
            prop_assert!(delivered.is_ok(), "{delivered:?}");
            Ok(())
        })?;
    }
}
