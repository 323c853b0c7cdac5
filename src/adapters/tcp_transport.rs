//! TCP line transport.
//!
//! Implements [`PeerListener`] / [`PeerLink`] over a non-blocking
//! `std::net` listener.  The same code runs on the host and on ESP-IDF
//! (lwIP exposes BSD sockets through `std::net`).
//!
//! ## Connection model
//!
//! 1. [`TcpLineListener::bind`] opens `0.0.0.0:<port>` in non-blocking mode.
//! 2. `accept_if_available()` returns a [`TcpPeer`] when a client is waiting.
//! 3. Inbound bytes are drained into a [`LineDecoder`] whenever the
//!    controller asks about the peer; reads never block.
//! 4. EOF or a socket error marks the peer disconnected once every
//!    complete line it sent has been read; the session manager then
//!    drops it and the socket closes.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use log::{debug, info, warn};

use crate::app::ports::{PeerLink, PeerListener};
use crate::error::{Error, TransportError};
use crate::link::codec::{Line, LineDecoder};

/// Bytes drained from the socket per `read()` call.
const READ_CHUNK: usize = 64;

// ───────────────────────────────────────────────────────────────
// Listener
// ───────────────────────────────────────────────────────────────

pub struct TcpLineListener {
    listener: TcpListener,
}

impl TcpLineListener {
    /// Bind `0.0.0.0:<port>`.  Pass `0` to let the OS pick a free port
    /// (use [`local_addr()`](Self::local_addr) to discover it).
    pub fn bind(port: u16) -> Result<Self, Error> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).map_err(|e| {
            warn!("TCP: bind {} failed: {}", addr, e);
            Error::Transport(TransportError::Bind)
        })?;
        listener
            .set_nonblocking(true)
            .map_err(|_| Error::Transport(TransportError::Io))?;

        info!("TCP: listening on port {}", port);
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        self.listener
            .local_addr()
            .map_err(|_| Error::Transport(TransportError::Io))
    }
}

impl PeerListener for TcpLineListener {
    type Peer = TcpPeer;

    fn accept_if_available(&mut self, _now_ms: u64) -> Option<TcpPeer> {
        match self.listener.accept() {
            Ok((stream, addr)) => {
                if stream.set_nonblocking(true).is_err() {
                    warn!("TCP: failed to set non-blocking on client socket");
                    return None;
                }
                info!("TCP: client connected from {}", addr);
                Some(TcpPeer::new(stream))
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => None,
            Err(e) => {
                warn!("TCP: accept error: {}", e);
                None
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Peer
// ───────────────────────────────────────────────────────────────

pub struct TcpPeer {
    stream: TcpStream,
    decoder: LineDecoder,
    connected: bool,
}

impl TcpPeer {
    fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            decoder: LineDecoder::new(),
            connected: true,
        }
    }

    /// Drain whatever the socket has buffered into the decoder.
    fn pump(&mut self) {
        let mut buf = [0u8; READ_CHUNK];
        while self.connected {
            match self.stream.read(&mut buf) {
                Ok(0) => {
                    info!("TCP: client disconnected (EOF)");
                    self.connected = false;
                }
                Ok(n) => self.decoder.push(&buf[..n]),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("TCP: read error: {}", e);
                    self.connected = false;
                }
            }
        }
    }
}

impl PeerLink for TcpPeer {
    /// A closed socket stays "connected" until its buffered lines are read.
    fn is_connected(&mut self) -> bool {
        self.pump();
        self.connected || self.decoder.has_line()
    }

    fn write_line(&mut self, line: &str) -> bool {
        if !self.connected {
            return false;
        }
        match self.stream.write(line.as_bytes()) {
            Ok(n) if n == line.len() => true,
            Ok(n) => {
                debug!("TCP: short write ({} of {} bytes)", n, line.len());
                false
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => false,
            Err(e) => {
                warn!("TCP: write error: {}", e);
                self.connected = false;
                false
            }
        }
    }

    fn has_line(&mut self) -> bool {
        self.pump();
        self.decoder.has_line()
    }

    fn read_line(&mut self) -> Option<Line> {
        self.decoder.next_line()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests (loopback)
// ───────────────────────────────────────────────────────────────
