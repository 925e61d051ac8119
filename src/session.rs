use std::cmp;
use std::fmt;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::packet::*;
use crate::store::Store;
use crate::transport::{PacketSocket, Received};
use crate::RetransmissionConfig;

/// Sent to the peer whenever a session fails on our side.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Which way file content flows in a session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// The server sends a stored file to the peer.
    Read,

    /// The peer sends a file to be stored.
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => write!(f, "read"),
            Direction::Write => write!(f, "write"),
        }
    }
}

/// One lock-step transfer with one peer, over a socket of its own.
///
/// The peer is whoever sent the most recent datagram to the socket, so a
/// client that changes source port mid-transfer is followed.
pub struct Session {
    socket: UdpSocket,
    peer: SocketAddr,
    config: RetransmissionConfig,
    started: Instant,
}

impl Session {
    /// Creates a session talking to `peer` over `socket`.
    ///
    /// The socket's read timeout is set from `config`.
    pub fn new(
        socket: UdpSocket,
        peer: SocketAddr,
        config: RetransmissionConfig,
    ) -> io::Result<Self> {
        socket.set_read_timeout(Some(config.timeout()))?;

        Ok(Self {
            socket,
            peer,
            config,
            started: Instant::now(),
        })
    }

    /// The address the session currently sends to.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// The address of the session's own socket.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Sends `filename` from `store` to the peer, returning the number of
    /// bytes transferred.
    pub fn read(mut self, store: &dyn Store, filename: &str) -> Result<usize, SessionError> {
        let content = match store.get(filename) {
            Some(content) => content,
            None => {
                let code = ErrorCode::FileNotFound;
                if let Err(e) = self.send(Packet::error(code, code.as_str())) {
                    warn!(error = %e, "couldn't report missing file");
                }
                return Err(SessionError::NotFound(filename.to_string()));
            }
        };

        let result = self.put(&content);
        self.finish(result)
    }

    /// Receives a file from the peer and stores it under `filename`,
    /// returning the number of bytes stored.
    ///
    /// The store is only touched once the final block has arrived.
    pub fn write(mut self, store: &dyn Store, filename: &str) -> Result<usize, SessionError> {
        let result = self.get();
        let content = self.finish(result)?;

        let len = content.len();
        store.put(filename, content);
        Ok(len)
    }

    /// Sends `content` block by block, waiting for each to be acknowledged.
    fn put(&mut self, content: &[u8]) -> Result<usize, SessionError> {
        let mut block = Block::new(1);
        let mut offset = 0;

        loop {
            let end = cmp::min(offset + MAX_PAYLOAD_SIZE, content.len());
            let data = Data::new(block, &content[offset..end]);
            let is_final = data.is_final();
            let packet = Packet::Data(data);

            debug!(%block, len = end - offset, "sending");
            self.send(packet.clone())?;

            let mut current_retransmissions = 0;
            loop {
                match self.recv()? {
                    Some(Packet::Ack(ack)) if ack.block == block => break,
                    Some(Packet::Ack(ack)) => {
                        debug!(expected = %block, got = %ack.block, "ignoring stale ACK");
                    }
                    Some(Packet::Error(error)) => {
                        return Err(SessionError::PeerSignaledError {
                            code: error.code,
                            message: error.message,
                        })
                    }
                    Some(other) => return Err(SessionError::ProtocolViolation(other.opcode())),
                    None => {
                        self.check_retransmission(block, &mut current_retransmissions)?;
                        self.send(packet.clone())?;
                    }
                }
            }

            offset = end;
            if is_final {
                info!(bytes = offset, blocks = block.get(), "read complete");
                return Ok(offset);
            }
            block = block.next();
        }
    }

    /// Acknowledges the request, then collects blocks until a short one
    /// arrives.
    fn get(&mut self) -> Result<Vec<u8>, SessionError> {
        let mut content = Vec::new();
        let mut last_block = Block::new(0);
        let mut current_retransmissions = 0;

        self.send(Packet::ack(last_block))?;

        loop {
            match self.recv()? {
                Some(Packet::Data(data)) if data.block == last_block.next() => {
                    content.extend_from_slice(&data.data);
                    last_block = data.block;
                    current_retransmissions = 0;

                    debug!(block = %last_block, len = data.data.len(), "received");
                    self.send(Packet::ack(last_block))?;

                    if data.is_final() {
                        info!(bytes = content.len(), blocks = last_block.get(), "write complete");
                        return Ok(content);
                    }
                }
                // The sender will time out and resend what we actually want.
                Some(Packet::Data(data)) => {
                    debug!(expected = %last_block.next(), got = %data.block, "ignoring out-of-sequence DATA");
                }
                Some(other) => return Err(SessionError::ProtocolViolation(other.opcode())),
                None => {
                    self.check_retransmission(last_block, &mut current_retransmissions)?;
                    self.send(Packet::ack(last_block))?;
                }
            }
        }
    }

    /// Waits for the next packet. `None` means the read timed out.
    fn recv(&mut self) -> Result<Option<Packet>, SessionError> {
        if let Some(deadline) = self.config.session_deadline() {
            if self.started.elapsed() >= deadline {
                return Err(SessionError::DeadlineExceeded);
            }
        }

        match self.socket.recv_packet() {
            Received::Packet(packet, from) => {
                self.follow(from);
                Ok(Some(packet))
            }
            Received::Malformed(error, from) => {
                self.follow(from);
                Err(error.into())
            }
            Received::Timeout => Ok(None),
            Received::Fatal(error) => Err(error),
        }
    }

    fn follow(&mut self, from: SocketAddr) {
        if from != self.peer {
            debug!(old = %self.peer, new = %from, "peer address changed");
            self.peer = from;
        }
    }

    fn send(&self, packet: Packet) -> Result<(), SessionError> {
        self.socket.send_packet(packet, self.peer)?;
        Ok(())
    }

    fn check_retransmission(
        &self,
        block: Block,
        current_retransmissions: &mut usize,
    ) -> Result<(), SessionError> {
        // Check that we're under the max amount of retransmissions
        *current_retransmissions += 1;
        if let Some(max_retransmissions) = self.config.max_retransmissions() {
            if *current_retransmissions > max_retransmissions {
                return Err(SessionError::Timeout {
                    block,
                    attempts: *current_retransmissions,
                });
            }
        }

        warn!(%block, retransmission = *current_retransmissions, "timed out, retransmitting");
        Ok(())
    }

    /// Tells the peer about failures it didn't cause itself. Best effort.
    fn finish<T>(&self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        if let Err(ref error) = result {
            if !matches!(error, SessionError::PeerSignaledError { .. }) {
                let packet = Packet::error(ErrorCode::NotDefined, GENERIC_ERROR_MESSAGE);
                let _ = self.socket.send_packet(packet, self.peer);
            }
        }

        result
    }
}
