//! The body shared by read and write requests.

use std::str::FromStr;

use super::mode::{Mode, UnknownMode};
use crate::bytes::{Bytes, FirstNul, FromBytes, IntoBytes};
use crate::error::DecodeError;

/// A read or write request: a file name and a transfer mode.
///
/// The mode is kept exactly as the peer spelled it; see [`Rq::mode`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rq {
    /// Name of the file to read or write.
    pub filename: String,

    /// Transfer mode as sent on the wire.
    pub mode: String,
}

impl Rq {
    /// Creates a new request.
    pub fn new<F: AsRef<str>, M: AsRef<str>>(filename: F, mode: M) -> Self {
        Self {
            filename: filename.as_ref().to_string(),
            mode: mode.as_ref().to_string(),
        }
    }

    /// Classifies the requested mode.
    pub fn mode(&self) -> Result<Mode, UnknownMode> {
        Mode::from_str(&self.mode)
    }
}

impl FromBytes for Rq {
    type Error = DecodeError;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, DecodeError> {
        let bytes = bytes.as_ref();

        let first_nul = bytes.first_nul_idx().ok_or(DecodeError::Unterminated)?;

        /* want to include the nul byte of the filename in its slice */
        let split_at = first_nul + 1;
        let (filename, mode) = bytes.split_at(split_at);
        let filename = Bytes::<String>::from_bytes(filename)?.into_inner();

        /* option extensions after the mode are ignored */
        let mode = Bytes::<String>::from_bytes(mode)?.into_inner();

        Ok(Self { filename, mode })
    }
}

impl IntoBytes for Rq {
    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = Bytes::new(self.filename).into_bytes();
        let mut mode = Bytes::new(self.mode).into_bytes();

        bytes.append(&mut mode);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rq_from_bytes() {
        let rq = Rq::from_bytes(b"hi.txt\0netascii\0").unwrap();

        assert_eq!(rq.filename, "hi.txt");
        assert_eq!(rq.mode, "netascii");
        assert_eq!(rq.mode(), Ok(Mode::NetAscii));
    }

    #[test]
    fn test_rq_keeps_unknown_mode() {
        let rq = Rq::from_bytes(b"hi.txt\0binary\0").unwrap();

        assert_eq!(rq.mode, "binary");
        assert!(rq.mode().is_err());
    }

    #[test]
    fn test_rq_ignores_options() {
        let rq = Rq::from_bytes(b"hi.txt\0octet\0blksize\01024\0").unwrap();

        assert_eq!(rq, Rq::new("hi.txt", "octet"));
    }

    #[test]
    fn test_rq_requires_terminators() {
        assert_eq!(Rq::from_bytes(b"hi.txt"), Err(DecodeError::Unterminated));
        assert_eq!(Rq::from_bytes(b"hi.txt\0octet"), Err(DecodeError::Unterminated));
        assert_eq!(Rq::from_bytes(b""), Err(DecodeError::Unterminated));
    }

    #[test]
    fn test_rq_to_bytes() {
        let bytes = Rq::new("bye.txt", "mail").into_bytes();

        assert_eq!(bytes, b"bye.txt\0mail\0");
    }

    #[test]
    fn test_rq_empty_filename() {
        let rq = Rq::from_bytes(b"\0octet\0").unwrap();

        assert_eq!(rq.filename, "");
        assert_eq!(rq.mode, "octet");
    }
}
