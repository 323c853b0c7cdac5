//! Integration tests for the Controller → Scheduler → Session pipeline.
//!
//! Every test drives `Controller::poll` with synthetic timestamps, so
//! cadence assertions are exact.

use crate::mock_hw::{MockListener, MockSensors, PeerHandle, RecordingSink};

use thermolink::app::events::AppEvent;
use thermolink::app::service::Controller;
use thermolink::config::{ControllerConfig, SensorCalibration, TemperatureSource};
use thermolink::control::thermal::{TEMP_MAX, TEMP_MIN};
use thermolink::fsm::OperatingMode;
use thermolink::link::session::SessionState;

fn make_controller() -> (Controller<MockListener>, MockSensors, RecordingSink) {
    let mut controller = Controller::new(&ControllerConfig::default(), MockListener::new());
    let mut sink = RecordingSink::new();
    controller.start(&mut sink);
    (controller, MockSensors::default(), sink)
}

/// Queue a client and run one pass at `now_ms` so it gets accepted.
fn attach_peer(
    controller: &mut Controller<MockListener>,
    sensors: &mut MockSensors,
    sink: &mut RecordingSink,
    now_ms: u64,
) -> PeerHandle {
    let peer = controller.session_mut().listener_mut().connect();
    controller.poll(now_ms, sensors, sink);
    assert_eq!(controller.session_state(), SessionState::PeerActive);
    peer
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn starts_idle_at_ambient_without_peer() {
    let (controller, _, sink) = make_controller();
    assert_eq!(controller.mode(), OperatingMode::Idle);
    assert_eq!(controller.thermal().core_temp, 25.0);
    assert_eq!(controller.thermal().water_temp, 25.0);
    assert_eq!(controller.session_state(), SessionState::NoPeer);
    assert_eq!(sink.events, vec![AppEvent::Started(OperatingMode::Idle)]);
}

// ── Cadence ───────────────────────────────────────────────────

#[test]
fn telemetry_is_sent_once_per_interval() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let peer = attach_peer(&mut c, &mut sensors, &mut sink, 0);

    for t in 1..=5005 {
        c.poll(t, &mut sensors, &mut sink);
    }
    // Fires at 1001, 2002, 3003, 4004, 5005 (strictly more than 1000 ms apart).
    assert_eq!(peer.sent().len(), 5);
}

#[test]
fn no_telemetry_before_first_interval() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let peer = attach_peer(&mut c, &mut sensors, &mut sink, 0);
    c.poll(1000, &mut sensors, &mut sink);
    assert!(peer.sent().is_empty(), "exactly 1000 ms is not yet due");
    c.poll(1001, &mut sensors, &mut sink);
    assert_eq!(peer.sent().len(), 1);
}

#[test]
fn a_late_pass_fires_once_not_catch_up() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let peer = attach_peer(&mut c, &mut sensors, &mut sink, 0);
    c.poll(10_000, &mut sensors, &mut sink);
    assert_eq!(peer.sent().len(), 1);
    c.poll(10_500, &mut sensors, &mut sink);
    assert_eq!(peer.sent().len(), 1);
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn heat_command_changes_mode_and_telemetry() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let peer = attach_peer(&mut c, &mut sensors, &mut sink, 0);

    peer.send_command("heat");
    c.poll(1, &mut sensors, &mut sink);
    assert_eq!(c.mode(), OperatingMode::Heat);
    assert!(sink.events.contains(&AppEvent::ModeChanged {
        from: OperatingMode::Idle,
        to: OperatingMode::Heat,
    }));

    c.poll(1001, &mut sensors, &mut sink);
    assert_eq!(
        peer.last_sent().as_deref(),
        Some("T_CORE:25.3,T_WATER:25.3,MODE:HEAT\n")
    );
}

#[test]
fn commands_are_case_and_whitespace_insensitive() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let peer = attach_peer(&mut c, &mut sensors, &mut sink, 0);

    peer.send_command("  CoOl \r");
    c.poll(1, &mut sensors, &mut sink);
    assert_eq!(c.mode(), OperatingMode::Cool);

    peer.send_command("STOP");
    c.poll(2, &mut sensors, &mut sink);
    assert_eq!(c.mode(), OperatingMode::Idle);
}

#[test]
fn unknown_command_is_ignored() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let peer = attach_peer(&mut c, &mut sensors, &mut sink, 0);

    peer.send_command("heat");
    c.poll(1, &mut sensors, &mut sink);
    sink.clear();

    peer.send_command("warm");
    c.poll(2, &mut sensors, &mut sink);
    assert_eq!(c.mode(), OperatingMode::Heat);
    assert_eq!(sink.events, vec![AppEvent::CommandIgnored]);
}

#[test]
fn repeated_command_is_not_a_change() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let peer = attach_peer(&mut c, &mut sensors, &mut sink, 0);

    peer.send_command("stop");
    c.poll(1, &mut sensors, &mut sink);
    assert_eq!(c.mode(), OperatingMode::Idle);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ModeChanged { .. } | AppEvent::CommandIgnored)),
        0
    );
}

#[test]
fn one_command_per_pass() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let peer = attach_peer(&mut c, &mut sensors, &mut sink, 0);

    peer.send_command("heat");
    peer.send_command("cool");
    c.poll(1, &mut sensors, &mut sink);
    assert_eq!(c.mode(), OperatingMode::Heat);
    c.poll(2, &mut sensors, &mut sink);
    assert_eq!(c.mode(), OperatingMode::Cool);
}

#[test]
fn command_in_same_pass_applies_to_next_update() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let peer = attach_peer(&mut c, &mut sensors, &mut sink, 0);

    // Timers run before the command in a pass, so this update is still Idle.
    peer.send_command("heat");
    c.poll(1001, &mut sensors, &mut sink);
    assert_eq!(c.mode(), OperatingMode::Heat);
    assert_eq!(
        peer.last_sent().as_deref(),
        Some("T_CORE:25.0,T_WATER:25.0,MODE:IDLE\n")
    );
}

// ── Session ───────────────────────────────────────────────────

#[test]
fn disconnect_frees_the_slot_for_the_next_client() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let first = attach_peer(&mut c, &mut sensors, &mut sink, 0);
    let second = c.session_mut().listener_mut().connect();

    // Second client waits while the first is active.
    c.poll(1, &mut sensors, &mut sink);
    assert_eq!(c.session().listener().pending(), 1);

    first.hang_up();
    sink.clear();
    c.poll(2, &mut sensors, &mut sink);
    assert_eq!(
        sink.events,
        vec![AppEvent::PeerDisconnected, AppEvent::PeerConnected]
    );

    c.poll(1001, &mut sensors, &mut sink);
    assert_eq!(second.sent().len(), 1);
    assert!(first.sent().is_empty());
}

#[test]
fn telemetry_without_peer_is_not_delivered() {
    let (mut c, mut sensors, mut sink) = make_controller();
    c.poll(1001, &mut sensors, &mut sink);

    let delivered: Vec<bool> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t.delivered),
            _ => None,
        })
        .collect();
    assert_eq!(delivered, vec![false]);
}

#[test]
fn mode_survives_a_reconnect() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let first = attach_peer(&mut c, &mut sensors, &mut sink, 0);
    first.send_command("cool");
    c.poll(1, &mut sensors, &mut sink);
    first.hang_up();
    c.poll(2, &mut sensors, &mut sink);
    assert_eq!(c.session_state(), SessionState::NoPeer);

    let second = attach_peer(&mut c, &mut sensors, &mut sink, 3);
    c.poll(1001, &mut sensors, &mut sink);
    assert_eq!(
        second.last_sent().as_deref(),
        Some("T_CORE:24.8,T_WATER:24.8,MODE:COOL\n")
    );
}

// ── Thermal behaviour through the loop ────────────────────────

#[test]
fn sustained_heating_saturates_at_limit() {
    let (mut c, mut sensors, mut sink) = make_controller();
    let peer = attach_peer(&mut c, &mut sensors, &mut sink, 0);
    peer.send_command("heat");
    c.poll(1, &mut sensors, &mut sink);

    for k in 1..=400 {
        c.poll(k * 1001, &mut sensors, &mut sink);
        let t = c.thermal();
        assert!(t.core_temp <= t.water_temp);
        assert!((TEMP_MIN..=TEMP_MAX).contains(&t.water_temp));
    }
    assert_eq!(c.thermal().water_temp, TEMP_MAX);
    assert!(peer.last_sent().unwrap().ends_with(",T_WATER:100.0,MODE:HEAT\n"));
}

#[test]
fn sensor_source_reads_both_channels_per_update() {
    let config = ControllerConfig {
        temperature_source: TemperatureSource::Sensor,
        ..ControllerConfig::default()
    };
    let mut c = Controller::new(&config, MockListener::new());
    let mut sensors = MockSensors {
        core: 153,
        water: 184,
        reads: 0,
    };
    let mut sink = RecordingSink::new();

    c.poll(500, &mut sensors, &mut sink);
    assert_eq!(sensors.reads, 0, "no read before the update interval");

    c.poll(1001, &mut sensors, &mut sink);
    assert_eq!(sensors.reads, 2);

    let cal = SensorCalibration::default();
    assert_eq!(c.thermal().core_temp, cal.to_temperature(153));
    assert_eq!(c.thermal().water_temp, cal.to_temperature(184));
}

#[test]
fn sensor_source_ignores_mode_for_temperatures() {
    let config = ControllerConfig {
        temperature_source: TemperatureSource::Sensor,
        ..ControllerConfig::default()
    };
    let mut c = Controller::new(&config, MockListener::new());
    let mut sensors = MockSensors {
        core: 200,
        water: 200,
        reads: 0,
    };
    let mut sink = RecordingSink::new();
    let peer = attach_peer(&mut c, &mut sensors, &mut sink, 0);
    peer.send_command("heat");
    c.poll(1, &mut sensors, &mut sink);

    c.poll(1001, &mut sensors, &mut sink);
    let first = c.thermal();
    c.poll(2002, &mut sensors, &mut sink);
    assert_eq!(c.thermal(), first);
}
