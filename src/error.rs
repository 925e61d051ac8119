//! Error types for decoding packets, running transfer sessions and
//! accepting requests.

use std::io;

use thiserror::Error;

use crate::packet::{Block, ErrorCode, Opcode};

/// A datagram could not be decoded into a [`Packet`](crate::packet::Packet).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
    /// The datagram ended before a fixed-size field was complete.
    #[error("packet truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes needed for the field.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// The leading two bytes name no known packet type.
    #[error("unsupported opcode {0}")]
    UnsupportedOpcode(u16),

    /// A string field has no NUL terminator.
    #[error("missing NUL terminator")]
    Unterminated,

    /// A string field is not valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidString,
}

/// Why a transfer session ended without completing.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The peer sent something that could not be decoded.
    #[error("malformed packet from peer: {0}")]
    Decode(#[from] DecodeError),

    /// The peer sent a packet that makes no sense in the current state.
    #[error("unexpected {0} packet")]
    ProtocolViolation(Opcode),

    /// The requested file is not in the store.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The peer stopped answering.
    #[error("no reply for block {block} after {attempts} attempts")]
    Timeout {
        /// The block that was being sent or awaited.
        block: Block,
        /// Total transmissions of the last packet.
        attempts: usize,
    },

    /// The peer aborted the transfer with an error packet.
    #[error("peer aborted transfer: {message} ({code})")]
    PeerSignaledError {
        /// Code carried by the peer's error packet.
        code: ErrorCode,
        /// Message carried by the peer's error packet.
        message: String,
    },

    /// The session ran past its configured wall-clock deadline.
    #[error("session deadline exceeded")]
    DeadlineExceeded,

    /// The session socket failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Why the listener did not produce a session for a datagram.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The opening packet was valid but is not a read or write request.
    #[error("{0} packet is not a request")]
    NotARequest(Opcode),

    /// The opening datagram could not be decoded.
    #[error("malformed request: {0}")]
    Decode(#[from] DecodeError),

    /// A socket for the new session could not be set up. Only that request
    /// is lost.
    #[error("couldn't set up session socket: {0}")]
    Session(#[source] io::Error),

    /// The listening socket failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
