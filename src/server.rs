use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use std::thread;

use tracing::{debug, error, info, info_span, warn};

use crate::bytes::FromBytes;
use crate::error::{ServeError, SessionError};
use crate::packet::*;
use crate::session::{Direction, Session};
use crate::store::Store;
use crate::RetransmissionConfig;

/// Listens on the well-known port and turns each request into a [`Handler`].
pub struct Server {
    socket: UdpSocket,
    store: Arc<dyn Store>,
    config: RetransmissionConfig,
    session_ip: Option<IpAddr>,
}

impl Server {
    /// Binds the listening socket.
    pub fn bind<A: ToSocketAddrs>(
        bind_to: A,
        store: Arc<dyn Store>,
        config: RetransmissionConfig,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(bind_to)?;

        Ok(Self {
            socket,
            store,
            config,
            session_ip: None,
        })
    }

    /// Binds the listening socket to a port of the OS's choosing on `ip`,
    /// returning that port alongside the server.
    pub fn random_port(
        ip: &str,
        store: Arc<dyn Store>,
        config: RetransmissionConfig,
    ) -> io::Result<(u16, Self)> {
        let server = Self::bind((ip, 0), store, config)?;
        let port = server.local_addr()?.port();

        Ok((port, server))
    }

    /// Binds session sockets to `ip` instead of the listener's address.
    pub fn with_session_ip(mut self, ip: IpAddr) -> Self {
        self.session_ip = Some(ip);
        self
    }

    /// The address the server listens on.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Waits for one datagram and, if it is a request, prepares a session
    /// for it.
    ///
    /// Nothing is ever sent back from here: datagrams that aren't requests
    /// are reported as errors and should simply be dropped. Only
    /// [`ServeError::Io`] says anything about the listener itself.
    pub fn serve(&self) -> Result<Handler, ServeError> {
        let mut buf = [0; MAX_PACKET_SIZE];
        let (nbytes, src_addr) = self.socket.recv_from(&mut buf)?;

        let (direction, rq) = match Packet::from_bytes(&buf[..nbytes])? {
            Packet::Rrq(rq) => (Direction::Read, rq),
            Packet::Wrq(rq) => (Direction::Write, rq),
            other => return Err(ServeError::NotARequest(other.opcode())),
        };

        let session = self
            .open_session(src_addr)
            .map_err(ServeError::Session)?;

        Ok(Handler {
            session,
            direction,
            rq,
            store: Arc::clone(&self.store),
        })
    }

    fn open_session(&self, peer: SocketAddr) -> io::Result<Session> {
        // Sessions answer from the same interface the request came in on.
        let ip = match self.session_ip {
            Some(ip) => ip,
            None => self.local_addr()?.ip(),
        };
        let socket = UdpSocket::bind((ip, 0))?;
        Session::new(socket, peer, self.config)
    }

    /// Serves requests forever, each on its own thread.
    ///
    /// Returns only when the listening socket fails.
    pub fn run(&self) -> io::Result<()> {
        loop {
            let handler = match self.serve() {
                Ok(handler) => handler,
                Err(ServeError::Io(e)) if is_transient(&e) => {
                    debug!(error = %e, "ignoring transient listener error");
                    continue;
                }
                Err(ServeError::Io(e)) => return Err(e),
                Err(e @ ServeError::Session(_)) => {
                    error!(error = %e, "dropping request");
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "discarding datagram");
                    continue;
                }
            };

            let name = format!("tftp-{}", handler.direction());
            let spawned = thread::Builder::new().name(name).spawn(move || {
                let _ = handler.handle();
            });
            if let Err(e) = spawned {
                error!(error = %e, "couldn't start session thread");
            }
        }
    }
}

/// Listener errors that say nothing about the listener itself, such as an
/// ICMP unreachable left over from an earlier send.
fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::Interrupted
    )
}

/// A request that has been accepted and is ready to be transferred.
pub struct Handler {
    session: Session,
    direction: Direction,
    rq: Rq,
    store: Arc<dyn Store>,
}

impl Handler {
    /// Whether the peer is reading or writing.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The peer's request.
    pub fn request(&self) -> &Rq {
        &self.rq
    }

    /// Runs the transfer to completion, returning the number of bytes
    /// moved.
    pub fn handle(self) -> Result<usize, SessionError> {
        let Handler {
            session,
            direction,
            rq,
            store,
        } = self;

        let span = info_span!(
            "session",
            peer = %session.peer(),
            file = %rq.filename,
            %direction
        );
        let _enter = span.enter();

        match rq.mode() {
            Ok(Mode::Octet) => {}
            Ok(mode) => debug!(%mode, "transferring bytes unchanged"),
            Err(UnknownMode(mode)) => debug!(%mode, "unknown mode, transferring bytes unchanged"),
        }
        info!("started");

        let result = match direction {
            Direction::Read => session.read(&*store, &rq.filename),
            Direction::Write => session.write(&*store, &rq.filename),
        };

        match &result {
            Ok(bytes) => info!(bytes, "finished"),
            Err(SessionError::NotFound(_)) => info!("file not found"),
            Err(e) => error!(error = %e, "failed"),
        }

        result
    }
}
