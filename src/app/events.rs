//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::control::thermal::ThermalState;
use crate::fsm::OperatingMode;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started (carries initial mode).
    Started(OperatingMode),

    /// A telemetry line was produced on a transmit tick.
    Telemetry(TelemetryData),

    /// A command changed the operating mode.
    ModeChanged { from: OperatingMode, to: OperatingMode },

    /// An inbound line was not a recognised command.
    CommandIgnored,

    /// A peer was accepted.
    PeerConnected,

    /// The active peer went away.
    PeerDisconnected,
}

/// A point-in-time telemetry snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub thermal: ThermalState,
    pub mode: OperatingMode,
    /// Whether the line reached a peer.
    pub delivered: bool,
}
