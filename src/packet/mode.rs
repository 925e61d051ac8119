//! Describes the modes of operation for TFTP.
//!
//! Transfers are always served byte-for-byte; the mode is only recognised
//! so that requests for anything other than `octet` can be logged.

use std::fmt;
use std::str::FromStr;

/// The modes of operation for TFTP.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Deprecated.
    Mail,

    /// 8-bit ASCII.
    NetAscii,

    /// 8-bit binary.
    Octet,
}

impl Mode {
    /// The canonical, lower-case spelling used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Mail => "mail",
            Mode::NetAscii => "netascii",
            Mode::Octet => "octet",
        }
    }
}

/// A mode string that names none of the RFC 1350 modes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownMode(
    /// The mode as the peer sent it.
    pub String,
);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, UnknownMode> {
        let lower = s.to_ascii_lowercase();

        Ok(match lower.as_str() {
            "mail" => Mode::Mail,
            "netascii" => Mode::NetAscii,
            "octet" => Mode::Octet,
            _ => return Err(UnknownMode(s.to_string())),
        })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
