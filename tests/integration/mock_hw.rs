//! Mock adapters for integration tests.
//!
//! Peers share their state with the test through [`PeerHandle`], so a
//! test can script inbound commands, inspect sent telemetry and pull the
//! plug after the controller has taken ownership of the peer.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use thermolink::app::events::AppEvent;
use thermolink::app::ports::{EventSink, PeerLink, PeerListener, SensorChannel, SensorPort};
use thermolink::link::codec::Line;

// ── Peer ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct PeerState {
    pub alive: bool,
    pub inbound: VecDeque<String>,
    pub sent: Vec<String>,
}

/// Test-side view of a mock peer.
#[derive(Clone)]
pub struct PeerHandle(Rc<RefCell<PeerState>>);

#[allow(dead_code)]
impl PeerHandle {
    pub fn send_command(&self, text: &str) {
        self.0.borrow_mut().inbound.push_back(text.to_owned());
    }

    pub fn hang_up(&self) {
        self.0.borrow_mut().alive = false;
    }

    pub fn sent(&self) -> Vec<String> {
        self.0.borrow().sent.clone()
    }

    pub fn last_sent(&self) -> Option<String> {
        self.0.borrow().sent.last().cloned()
    }
}

pub struct MockPeer(Rc<RefCell<PeerState>>);

impl PeerLink for MockPeer {
    fn is_connected(&mut self) -> bool {
        self.0.borrow().alive
    }

    fn write_line(&mut self, line: &str) -> bool {
        let mut state = self.0.borrow_mut();
        if !state.alive {
            return false;
        }
        state.sent.push(line.to_owned());
        true
    }

    fn has_line(&mut self) -> bool {
        !self.0.borrow().inbound.is_empty()
    }

    fn read_line(&mut self) -> Option<Line> {
        let text = self.0.borrow_mut().inbound.pop_front()?;
        Line::try_from(text.as_str()).ok()
    }
}

// ── Listener ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockListener {
    pending: VecDeque<MockPeer>,
}

#[allow(dead_code)]
impl MockListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a client that will be handed out by the next accept.
    pub fn connect(&mut self) -> PeerHandle {
        let state = Rc::new(RefCell::new(PeerState {
            alive: true,
            inbound: VecDeque::new(),
            sent: Vec::new(),
        }));
        self.pending.push_back(MockPeer(Rc::clone(&state)));
        PeerHandle(state)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl PeerListener for MockListener {
    type Peer = MockPeer;

    fn accept_if_available(&mut self, _now_ms: u64) -> Option<MockPeer> {
        self.pending.pop_front()
    }
}

// ── Sensors ───────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockSensors {
    pub core: u16,
    pub water: u16,
    pub reads: usize,
}

impl SensorPort for MockSensors {
    fn read_raw(&mut self, channel: SensorChannel) -> u16 {
        self.reads += 1;
        match channel {
            SensorChannel::Core => self.core,
            SensorChannel::Water => self.water,
        }
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
