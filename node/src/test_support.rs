//! Test-only helpers for building validly-signed transactions, used
//! across this crate's unit tests. Deliberately independent of
//! `bridge_common`'s own (crate-private) test helper, since that one is
//! not visible outside `bridge-common` itself.

use alloy_primitives::{keccak256, Address, B256, U256};
use bridge_common::account::Nonce;
use bridge_common::serializer::{Serializer, Writer};
use bridge_common::tx::Transaction;
use k256::ecdsa::SigningKey;

fn throwaway_signing_key() -> SigningKey {
    SigningKey::from_bytes(&[9u8; 32].into()).unwrap()
}

pub fn signer_address() -> Address {
    let verifying_key = throwaway_signing_key().verifying_key().to_owned();
    let encoded = verifying_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

fn signing_preimage(tx: &Transaction) -> Vec<u8> {
    // Mirrors `Transaction::signing_preimage`, which is private to
    // `bridge_common`; reconstructed here field-for-field.
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
    if let Some(chain_id) = tx.chain_id {
        writer.write_u8(1);
        writer.write_u64(chain_id);
    } else {
        writer.write_u8(0);
    }
    writer.bytes()
}

/// Builds a transaction and signs it with a fixed throwaway key, used by
/// tests across this crate that just need *some* validly-signed tx.
pub fn signed_transfer(nonce: Nonce, to: Option<Address>, value: U256) -> Transaction {
    let signing_key = throwaway_signing_key();
    let mut tx = Transaction {
        to,
        value,
        gas_limit: 21_000,
        gas_price: U256::from(1u64),
        nonce,
        data: vec![],
        chain_id: Some(1),
        signature: [0u8; 65],
    };

    let preimage = signing_preimage(&tx);
    let hash: B256 = keccak256(&preimage);
    let (sig, recid) = signing_key
        .sign_prehash_recoverable(hash.as_slice())
        .unwrap();
    let sig_bytes = sig.to_bytes();

    let mut raw = [0u8; 65];
    raw[..64].copy_from_slice(&sig_bytes);
    raw[64] = recid.to_byte();
    tx.signature = raw;
    tx
}

#[allow(dead_code)]
pub fn to_bytes(tx: &Transaction) -> Vec<u8> {
    tx.to_bytes()
}
