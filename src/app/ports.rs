//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (transports, sensors, clocks, event sinks) implement
//! these traits.  The [`Controller`](super::service::Controller) consumes
//! them via generics, so the domain core never touches sockets, serial
//! ports or ADC registers directly.
//!
//! Every port is polled; none of them may block.

use super::events::AppEvent;
use crate::link::codec::Line;

// ───────────────────────────────────────────────────────────────
// Transport ports (driven adapter: socket / serial ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Source of new peers (a listening socket, a serial port waiting to be opened).
pub trait PeerListener {
    type Peer: PeerLink;

    /// Non-blocking check for a new peer.  `now_ms` lets adapters throttle
    /// expensive attempts (e.g. re-opening a serial device).
    fn accept_if_available(&mut self, now_ms: u64) -> Option<Self::Peer>;
}

/// One connected peer.
pub trait PeerLink {
    /// Whether the peer is still usable.  Adapters may probe the
    /// underlying channel here (read EOF, I/O error).
    fn is_connected(&mut self) -> bool;

    /// Best-effort, non-blocking write of one line.  The adapter appends
    /// nothing; `line` already carries its terminator.  Returns `false`
    /// when nothing was sent.
    fn write_line(&mut self, line: &str) -> bool;

    /// Whether a complete inbound line is ready.
    fn has_line(&mut self) -> bool;

    /// Pop one complete inbound line, terminator removed.
    fn read_line(&mut self) -> Option<Line>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: ADC → domain)
// ───────────────────────────────────────────────────────────────

/// The two analog inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorChannel {
    Core,
    Water,
}

/// Raw analog readings.
pub trait SensorPort {
    /// Current raw count on `channel`.
    fn read_raw(&mut self, channel: SensorChannel) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: radio / link layer)
// ───────────────────────────────────────────────────────────────

/// Link-layer association (WiFi).  Association itself is owned by the
/// platform; the domain only asks for attempts and checks the result.
pub trait ConnectivityPort {
    /// Whether the link is currently up.
    fn is_connected(&self) -> bool;

    /// Start one non-blocking association attempt.
    fn begin_connect(&mut self) -> Result<(), crate::error::Error>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the controller)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a timer fires.
pub trait SchedulerDelegate {
    fn on_schedule_fired(&mut self, kind: ScheduleFiredKind);
}

/// Discriminant passed to [`SchedulerDelegate::on_schedule_fired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleFiredKind {
    /// Refresh temperatures (model step or sensor read).
    Update,
    /// Send one telemetry line.
    Transmit,
}
