use alloy_primitives::{Address, U256};

use crate::{
    account::Nonce,
    error::AdmissionError,
    serializer::{Reader, ReaderError, Serializer, Writer},
};

use super::signer;

/// Raw ECDSA signature bytes in the common wallet wire format: `r || s || v`.
pub type RawSignature = [u8; 65];

/// An Ethereum-shaped transaction: immutable, sender unknown
/// until signature recovery, recipient absent means contract creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub to: Option<Address>,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: U256,
    pub nonce: Nonce,
    pub data: Vec<u8>,
    /// `Some(id)` selects the chain-id-aware (EIP-155-style) signer;
    /// `None` selects the legacy signer.
    pub chain_id: Option<u64>,
    pub signature: RawSignature,
}

impl Transaction {
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// `cost(T) = value + gasPrice * gasLimit`.
    /// Returns `None` on overflow, which the admission path treats as
    /// `InsufficientFunds` — no finite balance can cover an overflowing
    /// cost.
    pub fn cost(&self) -> Option<U256> {
        let gas_cost = self.gas_price.checked_mul(U256::from(self.gas_limit))?;
        self.value.checked_add(gas_cost)
    }

    /// Bytes that get hashed and signed. Excludes the signature itself;
    /// includes `chain_id` only when replay protection is requested, so
    /// legacy and chain-id-aware signers produce different digests for
    /// the same logical transaction.
    fn signing_preimage(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        match &self.to {
            Some(addr) => {
                writer.write_u8(1);
                writer.write_fixed_bytes(addr.as_slice());
            }
            None => writer.write_u8(0),
        }
        writer.write_u256(self.value);
        writer.write_u64(self.gas_limit);
        writer.write_u256(self.gas_price);
        writer.write_u64(self.nonce);
        writer.write_bytes(&self.data);
        if let Some(chain_id) = self.chain_id {
            writer.write_u8(1);
            writer.write_u64(chain_id);
        } else {
            writer.write_u8(0);
        }
        writer.bytes()
    }

    /// Recovers the sender address using the chain-id-aware signer if
    /// `chain_id` is set, otherwise the legacy signer. Both delegate
    /// to `alloy_primitives`' ECDSA recovery;
    /// this crate implements neither signature scheme itself.
    pub fn recover_sender(&self) -> Result<Address, AdmissionError> {
        let preimage = self.signing_preimage();
        let recover = if self.chain_id.is_some() {
            signer::recover_chain_id_aware
        } else {
            signer::recover_legacy
        };
        recover(&preimage, &self.signature).map_err(|_| AdmissionError::InvalidSignature)
    }
}

/// A transaction whose sender has already been recovered. Admission and
/// delivery both operate on this type so the (potentially expensive)
/// recovery step happens exactly once per transaction, per block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredTransaction {
    pub tx: Transaction,
    pub sender: Address,
}

impl RecoveredTransaction {
    /// Decodes and recovers in one step. Returns `MalformedTx` if the
    /// bytes don't parse, `InvalidSignature` if the embedded signature
    /// doesn't recover.
    pub fn decode(bytes: &[u8]) -> Result<Self, AdmissionError> {
        let tx = Transaction::from_bytes(bytes).map_err(|_| AdmissionError::MalformedTx)?;
        let sender = tx.recover_sender()?;
        Ok(Self { tx, sender })
    }
}

impl Serializer for Transaction {
    fn write(&self, writer: &mut Writer) {
        match &self.to {
            Some(addr) => {
                writer.write_u8(1);
                writer.write_fixed_bytes(addr.as_slice());
            }
            None => writer.write_u8(0),
        }
        writer.write_u256(self.value);
        writer.write_u64(self.gas_limit);
        writer.write_u256(self.gas_price);
        writer.write_u64(self.nonce);
        writer.write_bytes(&self.data);
        match self.chain_id {
            Some(id) => {
                writer.write_u8(1);
                writer.write_u64(id);
            }
            None => writer.write_u8(0),
        }
        writer.write_fixed_bytes(&self.signature);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let to = match reader.read_u8()? {
            0 => None,
            1 => Some(Address::from_slice(reader.read_fixed_bytes(20)?)),
            _ => return Err(ReaderError::InvalidValue),
        };
        let value = reader.read_u256()?;
        let gas_limit = reader.read_u64()?;
        let gas_price = reader.read_u256()?;
        let nonce = reader.read_u64()?;
        let data = reader.read_bytes()?;
        let chain_id = match reader.read_u8()? {
            0 => None,
            1 => Some(reader.read_u64()?),
            _ => return Err(ReaderError::InvalidValue),
        };
        let signature: RawSignature = reader
            .read_fixed_bytes(65)?
            .try_into()
            .map_err(|_| ReaderError::InvalidValue)?;

        Ok(Transaction {
            to,
            value,
            gas_limit,
            gas_price,
            nonce,
            data,
            chain_id,
            signature,
        })
    }

    fn size(&self) -> usize {
        self.to_bytes().len()
    }
}
