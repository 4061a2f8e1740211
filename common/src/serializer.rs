// Minimal length-prefixed binary encoding used for everything this crate
// puts on the wire. Deliberately not Ethereum RLP: this bridge only needs
// to be self-consistent across replicas, not byte-compatible with other
// Ethereum clients' tx-pool gossip (that's out of scope for this bridge).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReaderError {
    #[error("unexpected end of data")]
    EndOfData,
    #[error("invalid value")]
    InvalidValue,
    #[error("trailing bytes after decoding")]
    TrailingBytes,
}

#[derive(Default)]
pub struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn write_u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    pub fn write_u64(&mut self, v: u64) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u256(&mut self, v: alloy_primitives::U256) {
        self.bytes.extend_from_slice(&v.to_be_bytes::<32>());
    }

    pub fn write_bytes(&mut self, b: &[u8]) {
        self.write_u64(b.len() as u64);
        self.bytes.extend_from_slice(b);
    }

    pub fn write_fixed_bytes(&mut self, b: &[u8]) {
        self.bytes.extend_from_slice(b);
    }

    pub fn bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub struct Reader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ReaderError> {
        let end = self.cursor.checked_add(n).ok_or(ReaderError::EndOfData)?;
        if self.bytes.len() < end {
            return Err(ReaderError::EndOfData);
        }
        let slice = &self.bytes[self.cursor..end];
        self.cursor = end;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReaderError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u64(&mut self) -> Result<u64, ReaderError> {
        let slice = self.take(8)?;
        Ok(u64::from_be_bytes(slice.try_into().unwrap()))
    }

    pub fn read_u256(&mut self) -> Result<alloy_primitives::U256, ReaderError> {
        let slice = self.take(32)?;
        Ok(alloy_primitives::U256::from_be_slice(slice))
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, ReaderError> {
        let len = self.read_u64()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub fn read_fixed_bytes(&mut self, n: usize) -> Result<&'a [u8], ReaderError> {
        self.take(n)
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    pub fn finish(self) -> Result<(), ReaderError> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(ReaderError::TrailingBytes)
        }
    }
}

pub trait Serializer: Sized {
    fn write(&self, writer: &mut Writer);
    fn read(reader: &mut Reader) -> Result<Self, ReaderError>;
    fn size(&self) -> usize;

    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        self.write(&mut writer);
        writer.bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, ReaderError> {
        let mut reader = Reader::new(bytes);
        let value = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}
