//! The `Error` packet.
//!
//! # Wire quirk
//!
//! The error code is written and read **little-endian**, unlike every other
//! integer in the protocol. Some peers (notably the stock macOS `tftp`
//! client) expect it that way, and it must stay bit-exact for them.

use std::fmt;
use std::mem::size_of;

use crate::bytes::{FirstNul, FromBytes, IntoBytes};
use crate::error::DecodeError;

/// `ErrorCode` represents the error conditions that can be reached during
/// a regular TFTP operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Not defined, see error message (if any).
    NotDefined,

    /// File not found.
    FileNotFound,

    /// Access violation.
    AccessViolation,

    /// Disk full or allocation exceeded.
    DiskFull,

    /// Illegal TFTP operation.
    IllegalOperation,

    /// Unknown transfer ID.
    UnknownTid,

    /// File already exists.
    FileAlreadyExists,

    /// No such user.
    NoSuchUser,

    /// A code outside the RFC 1350 table.
    Other(u16),
}

impl ErrorCode {
    /// The standard description for this code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotDefined => "Not defined",
            ErrorCode::FileNotFound => "File not found",
            ErrorCode::AccessViolation => "Access violation",
            ErrorCode::DiskFull => "Disk full or allocation exceeded",
            ErrorCode::IllegalOperation => "Illegal TFTP operation",
            ErrorCode::UnknownTid => "Unknown transfer ID",
            ErrorCode::FileAlreadyExists => "File already exists",
            ErrorCode::NoSuchUser => "No such user",
            ErrorCode::Other(_) => "Unknown error",
        }
    }
}

impl From<u16> for ErrorCode {
    fn from(val: u16) -> ErrorCode {
        match val {
            0 => ErrorCode::NotDefined,
            1 => ErrorCode::FileNotFound,
            2 => ErrorCode::AccessViolation,
            3 => ErrorCode::DiskFull,
            4 => ErrorCode::IllegalOperation,
            5 => ErrorCode::UnknownTid,
            6 => ErrorCode::FileAlreadyExists,
            7 => ErrorCode::NoSuchUser,
            v => ErrorCode::Other(v),
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        match code {
            ErrorCode::NotDefined => 0,
            ErrorCode::FileNotFound => 1,
            ErrorCode::AccessViolation => 2,
            ErrorCode::DiskFull => 3,
            ErrorCode::IllegalOperation => 4,
            ErrorCode::UnknownTid => 5,
            ErrorCode::FileAlreadyExists => 6,
            ErrorCode::NoSuchUser => 7,
            ErrorCode::Other(v) => v,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}", u16::from(*self))
    }
}

/// An `Error` packet is a courtesy packet that is sent prior to terminating
/// the TFTP connection due to an unrecoverable error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    /// An integer code that describes the error.
    pub code: ErrorCode,

    /// A human readable description of the error.
    pub message: String,
}

impl FromBytes for Error {
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

        let (code, message) = bytes.split_at(split_at);
        let code = ErrorCode::from(u16::from_le_bytes([code[0], code[1]]));

        // A peer that forgets the terminator still gets its message through.
        let end = message.first_nul_idx().unwrap_or(message.len());
        let message = std::str::from_utf8(&message[..end])
            .map_err(|_| DecodeError::InvalidString)?
            .to_string();

        Ok(Self { code, message })
    }
}

impl IntoBytes for Error {
    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = u16::from(self.code).to_le_bytes().to_vec();
        bytes.append(&mut self.message.into_bytes());
        bytes.push(0);
        bytes
    }
}
