//! A bare-bones lock-step TFTP client for driving a real `Server` over
//! loopback.

#![allow(dead_code)]

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use memtftp::packet::{Block, Packet, MAX_PACKET_SIZE, MAX_PAYLOAD_SIZE};
use memtftp::{FromBytes, IntoBytes, MemoryStore, RetransmissionConfig, Server};

pub const TIMEOUT: Duration = Duration::from_secs(3);

/// Starts a server on a random loopback port, serving `count` requests on
/// their own threads.
pub fn spawn_server(store: Arc<MemoryStore>, count: usize) -> (SocketAddr, thread::JoinHandle<()>) {
    let (port, server) =
        Server::random_port("127.0.0.1", store, RetransmissionConfig::default()).unwrap();

    let handle = thread::spawn(move || {
        let sessions: Vec<_> = (0..count)
            .map(|_| {
                let handler = server.serve().unwrap();
                thread::spawn(move || {
                    let _ = handler.handle();
                })
            })
            .collect();

        for session in sessions {
            session.join().unwrap();
        }
    });

    (SocketAddr::from(([127, 0, 0, 1], port)), handle)
}

pub fn socket() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_read_timeout(Some(TIMEOUT)).unwrap();
    socket
}

pub fn recv(socket: &UdpSocket) -> (Packet, SocketAddr) {
    let mut buf = [0; MAX_PACKET_SIZE];
    let (n, from) = socket.recv_from(&mut buf).unwrap();
    (Packet::from_bytes(&buf[..n]).unwrap(), from)
}

pub fn send(socket: &UdpSocket, packet: Packet, to: SocketAddr) {
    socket.send_to(&packet.into_bytes()[..], to).unwrap();
}

/// Reads `file`, returning every DATA payload in order, or the ERROR packet
/// the server answered with.
pub fn get(server: SocketAddr, file: &str) -> Result<Vec<Vec<u8>>, Packet> {
    let socket = socket();
    send(&socket, Packet::rrq(file, "octet"), server);

    let mut blocks = Vec::new();
    loop {
        let (packet, from) = recv(&socket);
        match packet {
            Packet::Data(data) => {
                assert_eq!(data.block, Block::new(blocks.len() as u16 + 1));
                send(&socket, Packet::ack(data.block), from);

                let last = data.data.len() < MAX_PAYLOAD_SIZE;
                blocks.push(data.data);
                if last {
                    return Ok(blocks);
                }
            }
            other => return Err(other),
        }
    }
}

/// Writes `content` to `file`.
pub fn put(server: SocketAddr, file: &str, content: &[u8]) -> Result<(), Packet> {
    let socket = socket();
    send(&socket, Packet::wrq(file, "octet"), server);

    let (packet, session) = recv(&socket);
    if packet != Packet::ack(Block::new(0)) {
        return Err(packet);
    }

    // Always finish with a short block, even if it has to be empty
    let mut chunks: Vec<&[u8]> = content.chunks(MAX_PAYLOAD_SIZE).collect();
    if content.len() % MAX_PAYLOAD_SIZE == 0 {
        chunks.push(&[]);
    }

    for (i, chunk) in chunks.into_iter().enumerate() {
        let block = Block::new(i as u16 + 1);
        send(&socket, Packet::data(block, chunk), session);

        let (packet, _) = recv(&socket);
        if packet != Packet::ack(block) {
            return Err(packet);
        }
    }

    Ok(())
}
