use std::convert::AsRef;
use std::mem::size_of;

use crate::error::DecodeError;

/// Types that can be decoded from their wire representation.
pub trait FromBytes: Sized {
    /// Why decoding failed.
    type Error;

    /// Decodes `bytes`.
    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, Self::Error>;
}

/// Types that can be encoded into their wire representation.
pub trait IntoBytes {
    /// Encodes `self`.
    fn into_bytes(self) -> Vec<u8>;
}

pub trait FirstNul {
    fn first_nul_idx(&self) -> Option<usize>;
}

impl FirstNul for [u8] {
    fn first_nul_idx(&self) -> Option<usize> {
        self.iter().position(|b| *b == 0)
    }
}

/// Wire representation of a primitive: network-order integers and
/// NUL-terminated strings.
#[derive(Debug)]
pub struct Bytes<T>(T);

impl<T> Bytes<T> {
    pub fn new(val: T) -> Self {
        Self(val)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl FromBytes for Bytes<u16> {
    type Error = DecodeError;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, DecodeError> {
        let bytes = bytes.as_ref();

        if bytes.len() != size_of::<u16>() {
            return Err(DecodeError::Truncated {
                expected: size_of::<u16>(),
                actual: bytes.len(),
            });
        }

        let mut bs = [0u8; size_of::<u16>()];
        bs.copy_from_slice(bytes);
        let be = u16::from_be_bytes(bs);

        Ok(Self(be))
    }
}

impl IntoBytes for Bytes<u16> {
    fn into_bytes(self) -> Vec<u8> {
        let bytes = self.0.to_be_bytes();
        bytes.to_vec()
    }
}

/// Reads a string up to (not including) its first NUL byte. Anything after
/// the terminator is left for the caller.
impl FromBytes for Bytes<String> {
    type Error = DecodeError;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, DecodeError> {
        let bytes = bytes.as_ref();

        let nul = bytes.first_nul_idx().ok_or(DecodeError::Unterminated)?;
        let s = std::str::from_utf8(&bytes[..nul]).map_err(|_| DecodeError::InvalidString)?;

        Ok(Self(s.to_string()))
    }
}

impl IntoBytes for Bytes<String> {
    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.0.into_bytes();
        bytes.push(0);
        bytes
    }
}
