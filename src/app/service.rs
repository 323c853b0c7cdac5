//! Controller — the hexagonal core.
//!
//! [`Controller`] owns the thermal state, the mode machine, the scheduler
//! and the session manager.  All I/O flows through port traits injected
//! at call sites, making the entire loop testable with mock adapters.
//!
//! ```text
//!  PeerListener ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                   │          Controller           │
//!    SensorPort ──▶ │ Scheduler · Thermal · Modes   │
//!                   └──────────────────────────────┘
//! ```
//!
//! One [`Controller::poll`] is one loop pass:
//!
//! 1. release a dead peer / accept a new one
//! 2. update temperatures if the update interval elapsed
//! 3. transmit telemetry if the transmit interval elapsed
//! 4. apply at most one inbound command

use log::{debug, info};

use crate::config::{ControllerConfig, ModelParams, SensorCalibration, TemperatureSource};
use crate::control::thermal::{self, ThermalState};
use crate::fsm::{ModeMachine, OperatingMode, Transition};
use crate::link::codec::{decode_command, encode_telemetry};
use crate::link::session::{SessionEvent, SessionManager, SessionState};
use crate::scheduler::Scheduler;

use super::events::{AppEvent, TelemetryData};
use super::ports::{
    EventSink, PeerListener, ScheduleFiredKind, SchedulerDelegate, SensorChannel, SensorPort,
};

// ───────────────────────────────────────────────────────────────
// State snapshot
// ───────────────────────────────────────────────────────────────

/// Everything the loop mutates besides timers and the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    pub thermal: ThermalState,
    pub mode: OperatingMode,
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller<L: PeerListener> {
    thermal: ThermalState,
    modes: ModeMachine,
    scheduler: Scheduler,
    session: SessionManager<L>,
    source: TemperatureSource,
    model: ModelParams,
    calibration: SensorCalibration,
    passes: u64,
}

impl<L: PeerListener> Controller<L> {
    /// Build the controller from a resolved configuration.
    pub fn new(config: &ControllerConfig, listener: L) -> Self {
        Self {
            thermal: ThermalState::default(),
            modes: ModeMachine::new(),
            scheduler: Scheduler::new(config.update_interval_ms, config.transmit_interval_ms),
            session: SessionManager::new(listener),
            source: config.temperature_source,
            model: config.model,
            calibration: config.calibration,
            passes: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        info!(
            "Controller started in {} ({:?} temperatures)",
            self.modes.current(),
            self.source
        );
        sink.emit(&AppEvent::Started(self.modes.current()));
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Run one loop pass.  Never blocks and never fails.
    pub fn poll(&mut self, now_ms: u64, sensors: &mut impl SensorPort, sink: &mut impl EventSink) {
        self.passes += 1;

        // 1. Session upkeep, before the timers so a fresh peer gets this pass's line.
        for event in self.session.refresh(now_ms) {
            sink.emit(&match event {
                SessionEvent::PeerConnected => AppEvent::PeerConnected,
                SessionEvent::PeerDisconnected => AppEvent::PeerDisconnected,
            });
        }

        // 2 + 3. Timers (update strictly before transmit).
        let mut delegate = PassDelegate {
            thermal: &mut self.thermal,
            mode: self.modes.current(),
            source: self.source,
            model: &self.model,
            calibration: &self.calibration,
            session: &mut self.session,
            sensors,
            sink,
        };
        self.scheduler.tick(now_ms, &mut delegate);

        // 4. At most one command per pass.
        if let Some(line) = self.session.poll_line() {
            let token = decode_command(&line);
            info!("Received command: {:?}", token);
            match self.modes.handle(token) {
                Transition::Changed { from, to } => sink.emit(&AppEvent::ModeChanged { from, to }),
                Transition::Unchanged(_) => {}
                Transition::Ignored => sink.emit(&AppEvent::CommandIgnored),
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> ControllerState {
        ControllerState {
            thermal: self.thermal,
            mode: self.modes.current(),
        }
    }

    pub fn mode(&self) -> OperatingMode {
        self.modes.current()
    }

    pub fn thermal(&self) -> ThermalState {
        self.thermal
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &SessionManager<L> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionManager<L> {
        &mut self.session
    }

    /// Loop passes executed since construction.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Borrows the pieces of the controller a timer fire touches.
struct PassDelegate<'a, L: PeerListener, S: SensorPort, E: EventSink> {
    thermal: &'a mut ThermalState,
    mode: OperatingMode,
    source: TemperatureSource,
    model: &'a ModelParams,
    calibration: &'a SensorCalibration,
    session: &'a mut SessionManager<L>,
    sensors: &'a mut S,
    sink: &'a mut E,
}

impl<L: PeerListener, S: SensorPort, E: EventSink> PassDelegate<'_, L, S, E> {
    fn update(&mut self) {
        *self.thermal = match self.source {
            TemperatureSource::Simulated => thermal::step(*self.thermal, self.mode, self.model),
            TemperatureSource::Sensor => {
                let core = self.sensors.read_raw(SensorChannel::Core);
                let water = self.sensors.read_raw(SensorChannel::Water);
                ThermalState::new(
                    self.calibration.to_temperature(core),
                    self.calibration.to_temperature(water),
                )
                .clamped()
            }
        };
    }

    fn transmit(&mut self) {
        let line = encode_telemetry(&*self.thermal, self.mode);
        let delivered = self.session.send_line(&line);
        if delivered {
            debug!("Sent: {}", line.trim_end());
        }
        self.sink.emit(&AppEvent::Telemetry(TelemetryData {
            thermal: *self.thermal,
            mode: self.mode,
            delivered,
        }));
    }
}

impl<L: PeerListener, S: SensorPort, E: EventSink> SchedulerDelegate for PassDelegate<'_, L, S, E> {
    fn on_schedule_fired(&mut self, kind: ScheduleFiredKind) {
        match kind {
            ScheduleFiredKind::Update => self.update(),
            ScheduleFiredKind::Transmit => self.transmit(),
        }
    }
}
