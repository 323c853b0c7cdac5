//! Single-peer session manager.
//!
//! ```text
//!              listener yields a peer
//!   NoPeer ───────────────────────────▶ PeerActive
//!     ▲                                     │
//!     └───── peer reports disconnected ─────┘
//! ```
//!
//! While a peer is active the listener is not polled at all, so a second
//! client waits in the backlog until the first one leaves.  Without a
//! peer, writes and reads are skipped; nothing is queued.

use log::info;

use crate::app::ports::{PeerLink, PeerListener};
use crate::link::codec::Line;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoPeer,
    PeerActive,
}

/// Peer lifecycle changes observed by [`SessionManager::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    PeerConnected,
    PeerDisconnected,
}

/// Tracks at most one connected peer.
pub struct SessionManager<L: PeerListener> {
    listener: L,
    peer: Option<L::Peer>,
}

impl<L: PeerListener> SessionManager<L> {
    pub fn new(listener: L) -> Self {
        Self {
            listener,
            peer: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.peer.is_some() {
            SessionState::PeerActive
        } else {
            SessionState::NoPeer
        }
    }

    /// Per-pass upkeep: release a dead peer, then accept a new one if the
    /// slot is free.  Both can happen in the same pass.
    pub fn refresh(&mut self, now_ms: u64) -> heapless::Vec<SessionEvent, 2> {
        let mut events = heapless::Vec::new();
        if self.drop_if_disconnected() {
            // Capacity 2 covers both pushes.
            let _ = events.push(SessionEvent::PeerDisconnected);
        }
        if self.try_accept(now_ms) {
            let _ = events.push(SessionEvent::PeerConnected);
        }
        events
    }

    /// Release the active peer if it reports disconnected.
    /// Returns `true` when a peer was released.
    pub fn drop_if_disconnected(&mut self) -> bool {
        let dead = self.peer.as_mut().is_some_and(|peer| !peer.is_connected());
        if dead {
            self.peer = None;
            info!("Session: peer disconnected");
        }
        dead
    }

    /// Poll the listener for a new peer.  Only attempted while no peer is
    /// active; returns `true` when one was accepted.
    pub fn try_accept(&mut self, now_ms: u64) -> bool {
        if self.peer.is_some() {
            return false;
        }
        match self.listener.accept_if_available(now_ms) {
            Some(peer) => {
                self.peer = Some(peer);
                info!("Session: peer connected");
                true
            }
            None => false,
        }
    }

    /// Best-effort write to the active peer.  Returns `false` when there is
    /// no peer or nothing was sent.
    pub fn send_line(&mut self, line: &str) -> bool {
        self.peer.as_mut().is_some_and(|peer| peer.write_line(line))
    }

    /// One complete inbound line from the active peer, if any.
    pub fn poll_line(&mut self) -> Option<Line> {
        let peer = self.peer.as_mut()?;
        if peer.has_line() { peer.read_line() } else { None }
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn peer_mut(&mut self) -> Option<&mut L::Peer> {
        self.peer.as_mut()
    }
}
