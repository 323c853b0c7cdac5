//! Link-layer supervision.
//!
//! Polled once per loop pass.  While the link is down it issues at most
//! one association attempt per retry interval; after the retry budget is
//! spent it gives up and stays in [`LinkState::Failed`].  The controller
//! keeps running in every state, it simply never sees a peer.

use log::{error, info, warn};

use crate::app::ports::ConnectivityPort;
use crate::config::RetryPolicy;
use crate::link::retry::RetryGate;

/// Supervisor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Waiting for an association attempt to succeed.
    Connecting { attempt: u32 },
    Connected,
    /// Retry budget exhausted; no further attempts.
    Failed,
}

pub struct LinkSupervisor<C: ConnectivityPort> {
    link: C,
    gate: RetryGate,
    state: LinkState,
}

impl<C: ConnectivityPort> LinkSupervisor<C> {
    pub fn new(link: C, policy: RetryPolicy) -> Self {
        Self {
            link,
            gate: RetryGate::new(policy),
            state: LinkState::Connecting { attempt: 0 },
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn link(&self) -> &C {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut C {
        &mut self.link
    }

    /// Evaluate the link once.  Never blocks.
    pub fn poll(&mut self, now_ms: u64) -> LinkState {
        if self.link.is_connected() {
            if self.state != LinkState::Connected {
                info!("Link: connected");
                self.gate.reset();
                self.state = LinkState::Connected;
            }
            return self.state;
        }

        match self.state {
            LinkState::Failed => {}
            LinkState::Connected => {
                warn!("Link: lost, reconnecting");
                self.state = LinkState::Connecting { attempt: 0 };
                self.attempt(now_ms);
            }
            LinkState::Connecting { .. } => self.attempt(now_ms),
        }
        self.state
    }

    fn attempt(&mut self, now_ms: u64) {
        if self.gate.try_begin(now_ms) {
            let attempt = self.gate.attempts();
            info!("Link: association attempt {}", attempt);
            if let Err(e) = self.link.begin_connect() {
                warn!("Link: attempt {} failed to start: {}", attempt, e);
            }
            self.state = LinkState::Connecting { attempt };
        } else if self.gate.is_exhausted(now_ms) {
            error!(
                "Link: giving up after {} attempts; running without a peer",
                self.gate.attempts()
            );
            self.state = LinkState::Failed;
        }
    }
}
