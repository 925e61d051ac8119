//! Sending and receiving whole packets over a session socket.

use std::io;
use std::net::{SocketAddr, UdpSocket};

use tracing::trace;

use crate::bytes::{FromBytes, IntoBytes};
use crate::error::{DecodeError, SessionError};
use crate::packet::{Packet, MAX_PACKET_SIZE};

/// What came back from one receive attempt.
#[derive(Debug)]
pub enum Received {
    /// A packet arrived from `SocketAddr`.
    Packet(Packet, SocketAddr),

    /// Nothing arrived before the socket's read timeout.
    Timeout,

    /// A datagram arrived from `SocketAddr` but could not be decoded.
    Malformed(DecodeError, SocketAddr),

    /// The socket failed.
    Fatal(SessionError),
}

/// A socket that speaks in [`Packet`]s.
///
/// It is assumed that the socket already has a read timeout set.
pub trait PacketSocket {
    /// Encodes `packet` and sends it to `peer`.
    fn send_packet(&self, packet: Packet, peer: SocketAddr) -> io::Result<()>;

    /// Waits for the next datagram and decodes it.
    fn recv_packet(&self) -> Received;
}

impl PacketSocket for UdpSocket {
    fn send_packet(&self, packet: Packet, peer: SocketAddr) -> io::Result<()> {
        trace!(%peer, %packet, "send");
        let _ = self.send_to(&packet.into_bytes()[..], peer)?;
        Ok(())
    }

    fn recv_packet(&self) -> Received {
        let mut buf = [0; MAX_PACKET_SIZE];
        match self.recv_from(&mut buf) {
            Ok((nbytes, peer)) => match Packet::from_bytes(&buf[..nbytes]) {
                Ok(packet) => {
                    trace!(%peer, %packet, "recv");
                    Received::Packet(packet, peer)
                }
                Err(e) => {
                    trace!(%peer, error = %e, "recv malformed");
                    Received::Malformed(e, peer)
                }
            },
            Err(e) if is_timeout(&e) => Received::Timeout,
            Err(e) => Received::Fatal(e.into()),
        }
    }
}

/// Read timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows.
fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
