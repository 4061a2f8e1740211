//! Signer selection. The two signers differ only in
//! which preimage they were asked to verify (the caller already baked
//! chain-id presence into the hashed bytes); recovery itself is delegated
//! to `alloy_primitives`, which is the only place ECDSA math happens in
//! this crate.

use alloy_primitives::{keccak256, Address, Signature, SignatureError};

use super::codec::RawSignature;

fn recover(preimage: &[u8], raw_signature: &RawSignature) -> Result<Address, SignatureError> {
    let signature = Signature::try_from(raw_signature.as_slice())?;
    let hash = keccak256(preimage);
    signature.recover_address_from_prehash(&hash)
}

pub fn recover_legacy(
    preimage: &[u8],
    raw_signature: &RawSignature,
) -> Result<Address, SignatureError> {
    recover(preimage, raw_signature)
}

pub fn recover_chain_id_aware(
    preimage: &[u8],
    raw_signature: &RawSignature,
) -> Result<Address, SignatureError> {
    recover(preimage, raw_signature)
}
