//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the `log`
//! facade (ESP-IDF console on target, `tracing-subscriber` on the host).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                debug!(
                    "TELEM | core={:.1}\u{00b0}C water={:.1}\u{00b0}C | mode={} | {}",
                    t.thermal.core_temp,
                    t.thermal.water_temp,
                    t.mode,
                    if t.delivered { "sent" } else { "no peer" },
                );
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {} -> {}", from, to);
            }
            AppEvent::CommandIgnored => {
                warn!("CMD | unrecognised command ignored");
            }
            AppEvent::PeerConnected => {
                info!("PEER | connected");
            }
            AppEvent::PeerDisconnected => {
                info!("PEER | disconnected");
            }
            AppEvent::Started(mode) => {
                info!("START | initial_mode={}", mode);
            }
        }
    }
}
