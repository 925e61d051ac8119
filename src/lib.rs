//! The `memtftp` crate is a Trivial File Transfer Protocol (RFC 1350)
//! server whose "filesystem" is an in-memory map from file name to bytes.
//!
//! It provides:
//!
//! * The protocol: a [`Packet`](packet::Packet) type covering the five TFTP
//!   packets, with their wire encoding.
//! * Transfer sessions: the lock-step state machines that serve a read
//!   request or accept a write request, with timeout-driven retransmission.
//! * A server: a listener that hands every request to its own session
//!   running on its own socket and thread.
//!
//! For more information, please see [THE TFTP PROTOCOL (REVISION 2)](
//! https://tools.ietf.org/html/rfc1350).
//!
//! ## Wire quirk
//!
//! The error code of an `Error` packet is encoded **little-endian**, unlike
//! every other integer on the wire. This keeps the server interoperable with
//! the peers that expect it; see [`packet::error`].
//!
//! ## Try it out
//!
//! In one terminal window, start up the server, seeding it with the files of
//! any directory of your own:
//!
//! ```console
//! $ cargo run -- --bind 127.0.0.1:6655 --preload /srv/tftp
//! INFO memtftp: serving TFTP addr=127.0.0.1:6655 files=1
//! ```
//!
//! Then in another window, use any TFTP client:
//!
//! ```console
//! $ tftp 127.0.0.1 6655 -m binary -c get alice-in-wonderland.txt
//! ```
//!
//! Files written to the server only live as long as the process.

#![deny(missing_docs)]

use std::time::Duration;

/// POD struct representing the configuration of the retransmission of packets
// NB: this is a struct so that you can only specify max_retransmissions if you specify a time :>
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct RetransmissionConfig {
    /// How long should we wait for a reply before retransmitting the last packet?
    timeout: Duration,

    /// How many times should we retransmit the last packet?
    ///
    /// Note that this is the number of *retransmissions*, not transmissions, so
    /// this means that setting this to `Some(0)` means that the packet will still be
    /// sent once.
    ///
    /// If this is set to `None`, the packet will be retransmitted indefinitely.
    max_retransmissions: Option<usize>,

    /// Upper bound on the wall-clock duration of a whole session.
    ///
    /// Not part of RFC 1350. `None` (the default) leaves sessions bounded only
    /// by the per-packet retry limit.
    session_deadline: Option<Duration>,
}

impl RetransmissionConfig {
    /// Wait 500ms for each reply.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

    /// Give up after the fifth unanswered transmission of a packet.
    pub const DEFAULT_MAX_RETRANSMISSIONS: usize = 4;

    /// Creates a config with no session deadline.
    ///
    /// # Panics
    ///
    /// Panics if `timeout` is zero, which sockets reject as a read timeout.
    pub fn new(timeout: Duration, max_retransmissions: Option<usize>) -> Self {
        assert!(!timeout.is_zero(), "retransmission timeout must be non-zero");

        Self {
            timeout,
            max_retransmissions,
            session_deadline: None,
        }
    }

    /// Bounds the total duration of every session.
    pub fn with_session_deadline(mut self, deadline: Duration) -> Self {
        self.session_deadline = Some(deadline);
        self
    }

    /// How long to wait for a reply before retransmitting.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// How many retransmissions of one packet are allowed.
    pub fn max_retransmissions(&self) -> Option<usize> {
        self.max_retransmissions
    }

    /// The wall-clock bound on a session, if any.
    pub fn session_deadline(&self) -> Option<Duration> {
        self.session_deadline
    }
}

impl Default for RetransmissionConfig {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_TIMEOUT,
            Some(Self::DEFAULT_MAX_RETRANSMISSIONS),
        )
    }
}

mod bytes;
pub mod error;
pub mod packet;
mod server;
mod session;
pub mod store;
mod transport;

pub use crate::bytes::{FromBytes, IntoBytes};
pub use error::{DecodeError, ServeError, SessionError};
pub use server::{Handler, Server};
pub use session::{Direction, Session, GENERIC_ERROR_MESSAGE};
pub use store::{MemoryStore, Store};
pub use transport::{PacketSocket, Received};
