//! TFTP packets and their wire encoding.
//!
//! Every datagram is one [`Packet`]. Decoding reads the two-byte opcode and
//! hands the rest of the datagram to the matching body type:
//!
//! ```
//! use memtftp::packet::{Block, Packet};
//! use memtftp::{FromBytes, IntoBytes};
//!
//! let bytes = Packet::ack(Block::new(7)).into_bytes();
//! assert_eq!(bytes, vec![0, 4, 0, 7]);
//! assert_eq!(Packet::from_bytes(&bytes).unwrap(), Packet::ack(Block::new(7)));
//! ```

use std::fmt;
use std::mem::size_of;

use crate::bytes::{Bytes, FromBytes, IntoBytes};
use crate::error::DecodeError;

mod ack;
mod data;
pub mod error;
mod mode;
mod opcode;
mod rq;

pub use ack::Ack;
pub use data::Data;
pub use error::{Error, ErrorCode};
pub use mode::{Mode, UnknownMode};
pub use opcode::Opcode;
pub use rq::Rq;

/// The largest payload a `Data` packet carries.
pub const MAX_PAYLOAD_SIZE: usize = 512;

/// Opcode, block number and a full payload.
pub const MAX_PACKET_SIZE: usize = MAX_PAYLOAD_SIZE + 4;

/// A 16-bit block number.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Block(u16);

impl Block {
    /// Creates a block number.
    pub const fn new(n: u16) -> Self {
        Self(n)
    }

    /// The raw block number.
    pub const fn get(self) -> u16 {
        self.0
    }

    /// The block after this one, wrapping past 65535.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromBytes for Block {
    type Error = DecodeError;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, DecodeError> {
        Ok(Self(Bytes::<u16>::from_bytes(bytes)?.into_inner()))
    }
}

impl IntoBytes for Block {
    fn into_bytes(self) -> Vec<u8> {
        Bytes::new(self.0).into_bytes()
    }
}

/// A single TFTP datagram.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Packet {
    /// Read request.
    Rrq(Rq),

    /// Write request.
    Wrq(Rq),

    /// A block of file content.
    Data(Data),

    /// Acknowledgement of a block.
    Ack(Ack),

    /// Abort the transfer.
    Error(Error),
}

impl Packet {
    /// Creates a read request.
    pub fn rrq<F: AsRef<str>, M: AsRef<str>>(filename: F, mode: M) -> Self {
        Packet::Rrq(Rq::new(filename, mode))
    }

    /// Creates a write request.
    pub fn wrq<F: AsRef<str>, M: AsRef<str>>(filename: F, mode: M) -> Self {
        Packet::Wrq(Rq::new(filename, mode))
    }

    /// Creates a data packet.
    pub fn data<T: AsRef<[u8]>>(block: Block, data: T) -> Self {
        Packet::Data(Data::new(block, data))
    }

    /// Creates an acknowledgement.
    pub fn ack(block: Block) -> Self {
        Packet::Ack(Ack { block })
    }

    /// Creates an error packet.
    pub fn error<S: Into<String>>(code: ErrorCode, message: S) -> Self {
        Packet::Error(Error {
            code,
            message: message.into(),
        })
    }

    /// The opcode this packet is sent with.
    pub fn opcode(&self) -> Opcode {
        match self {
            Packet::Rrq(_) => Opcode::Rrq,
            Packet::Wrq(_) => Opcode::Wrq,
            Packet::Data(_) => Opcode::Data,
            Packet::Ack(_) => Opcode::Ack,
            Packet::Error(_) => Opcode::Error,
        }
    }
}

impl FromBytes for Packet {
    type Error = DecodeError;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, DecodeError> {
        let bytes = bytes.as_ref();

        let split_at = size_of::<u16>();
        if bytes.len() < split_at {
            return Err(DecodeError::Truncated {
                expected: split_at,
                actual: bytes.len(),
            });
        }

        let (opcode, body) = bytes.split_at(split_at);
        Ok(match Opcode::from_bytes(opcode)? {
            Opcode::Rrq => Packet::Rrq(Rq::from_bytes(body)?),
            Opcode::Wrq => Packet::Wrq(Rq::from_bytes(body)?),
            Opcode::Data => Packet::Data(Data::from_bytes(body)?),
            Opcode::Ack => Packet::Ack(Ack::from_bytes(body)?),
            Opcode::Error => Packet::Error(Error::from_bytes(body)?),
        })
    }
}

impl IntoBytes for Packet {
    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.opcode().into_bytes();
        let mut body = match self {
            Packet::Rrq(rq) | Packet::Wrq(rq) => rq.into_bytes(),
            Packet::Data(data) => data.into_bytes(),
            Packet::Ack(ack) => ack.into_bytes(),
            Packet::Error(error) => error.into_bytes(),
        };
        bytes.append(&mut body);
        bytes
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Rrq(rq) | Packet::Wrq(rq) => {
                write!(f, "{} {:?} ({})", self.opcode(), rq.filename, rq.mode)
            }
            Packet::Data(data) => {
                write!(f, "DATA {} ({} bytes)", data.block, data.data.len())
            }
            Packet::Ack(ack) => write!(f, "ACK {}", ack.block),
            Packet::Error(error) => write!(f, "ERROR {}: {}", error.code, error.message),
        }
    }
}
