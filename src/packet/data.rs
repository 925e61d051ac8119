use std::mem::size_of;

use super::Block;
use crate::bytes::{FromBytes, IntoBytes};
use crate::error::DecodeError;

/// One block of file content.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Data {
    /// Position of this block in the transfer, starting at 1.
    pub block: Block,

    /// Up to [`MAX_PAYLOAD_SIZE`](super::MAX_PAYLOAD_SIZE) bytes. A shorter
    /// payload ends the transfer.
    pub data: Vec<u8>,
}

impl Data {
    /// Creates a new `Data` body.
    pub fn new<T: AsRef<[u8]>>(block: Block, data: T) -> Self {
        Self {
            block,
            data: data.as_ref().to_vec(),
        }
    }

    /// Whether this is the last block of a transfer.
    pub fn is_final(&self) -> bool {
        self.data.len() < super::MAX_PAYLOAD_SIZE
    }
}

impl FromBytes for Data {
    type Error = DecodeError;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, DecodeError> {
        let bytes = bytes.as_ref();

        let split_at = size_of::<Block>();
        if split_at > bytes.len() {
            return Err(DecodeError::Truncated {
                expected: split_at,
                actual: bytes.len(),
            });
        }

        let (block, data) = bytes.split_at(split_at);
        let block = Block::from_bytes(block)?;
        let data = data.to_vec();

        Ok(Self { block, data })
    }
}

impl IntoBytes for Data {
    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.block.into_bytes();
        let mut data = self.data;
        bytes.append(&mut data);
        bytes
    }
}
