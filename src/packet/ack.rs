use std::mem::size_of;

use super::Block;
use crate::bytes::{FromBytes, IntoBytes};
use crate::error::DecodeError;

/// Acknowledges a `Data` block, or with block 0, a write request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ack {
    /// The block being acknowledged.
    pub block: Block,
}

impl FromBytes for Ack {
    type Error = DecodeError;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, DecodeError> {
        let bytes = bytes.as_ref();

        let split_at = size_of::<Block>();

        if bytes.len() < split_at {
            return Err(DecodeError::Truncated {
                expected: split_at,
                actual: bytes.len(),
            });
        }

        let block = Block::from_bytes(&bytes[..split_at])?;

        Ok(Self { block })
    }
}

impl IntoBytes for Ack {
    fn into_bytes(self) -> Vec<u8> {
        self.block.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_from_bytes() {
        let ack = Ack::from_bytes(&[0x01, 0x0c]).unwrap();
        assert_eq!(ack.block, Block::new(268));

        assert!(Ack::from_bytes(&[0x01]).is_err());
    }

    #[test]
    fn test_ack_to_bytes() {
        let ack = Ack {
            block: Block::new(12),
        };
        assert_eq!(ack.into_bytes(), vec![0, 12]);
    }
}
