//! End-to-end tests over a real loopback socket.
//!
//! The controller runs with synthetic timestamps while the client talks
//! to it through `std::net`, so only socket readiness depends on the
//! wall clock.

use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use crate::mock_hw::{MockSensors, RecordingSink};

use thermolink::adapters::tcp_transport::TcpLineListener;
use thermolink::app::events::AppEvent;
use thermolink::app::service::Controller;
use thermolink::config::ControllerConfig;
use thermolink::fsm::OperatingMode;
use thermolink::link::session::SessionState;

type TcpController = Controller<TcpLineListener>;

fn start() -> (TcpController, SocketAddr) {
    let listener = TcpLineListener::bind(0).unwrap();
    let port = listener.local_addr().unwrap().port();
    let controller = Controller::new(&ControllerConfig::default(), listener);
    (controller, SocketAddr::from(([127, 0, 0, 1], port)))
}

/// Poll at `now_ms` until `done` holds or two seconds pass.
fn poll_until(
    c: &mut TcpController,
    sensors: &mut MockSensors,
    sink: &mut RecordingSink,
    now_ms: u64,
    done: impl Fn(&TcpController, &RecordingSink) -> bool,
) {
    for _ in 0..200 {
        c.poll(now_ms, sensors, sink);
        if done(c, sink) {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("condition not reached");
}

#[test]
fn client_commands_and_receives_telemetry() {
    let (mut c, addr) = start();
    let mut sensors = MockSensors::default();
    let mut sink = RecordingSink::new();

    let mut client = TcpStream::connect(addr).unwrap();
    client
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    poll_until(&mut c, &mut sensors, &mut sink, 0, |c, _| {
        c.session_state() == SessionState::PeerActive
    });

    client.write_all(b"COOL\r\n").unwrap();
    poll_until(&mut c, &mut sensors, &mut sink, 1, |c, _| {
        c.mode() == OperatingMode::Cool
    });

    c.poll(1001, &mut sensors, &mut sink);
    let mut reader = BufReader::new(client.try_clone().unwrap());
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    // 24.75 rounds half away from zero.
    assert_eq!(line, "T_CORE:24.8,T_WATER:24.8,MODE:COOL\n");

    drop(reader);
    drop(client);
    poll_until(&mut c, &mut sensors, &mut sink, 1002, |c, _| {
        c.session_state() == SessionState::NoPeer
    });
    assert_eq!(sink.count(|e| *e == AppEvent::PeerDisconnected), 1);
}

#[test]
fn second_client_is_served_after_first_leaves() {
    let (mut c, addr) = start();
    let mut sensors = MockSensors::default();
    let mut sink = RecordingSink::new();

    let first = TcpStream::connect(addr).unwrap();
    poll_until(&mut c, &mut sensors, &mut sink, 0, |c, _| {
        c.session_state() == SessionState::PeerActive
    });

    let second = TcpStream::connect(addr).unwrap();
    second
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    for t in 1..20 {
        c.poll(t, &mut sensors, &mut sink);
    }
    assert_eq!(sink.count(|e| *e == AppEvent::PeerConnected), 1);

    drop(first);
    poll_until(&mut c, &mut sensors, &mut sink, 20, |_, sink| {
        sink.count(|e| *e == AppEvent::PeerConnected) == 2
    });

    c.poll(1001, &mut sensors, &mut sink);
    let mut line = String::new();
    BufReader::new(&second).read_line(&mut line).unwrap();
    assert_eq!(line, "T_CORE:25.0,T_WATER:25.0,MODE:IDLE\n");
}

#[test]
fn command_from_half_closed_client_is_applied() {
    let (mut c, addr) = start();
    let mut sensors = MockSensors::default();
    let mut sink = RecordingSink::new();

    let mut client = TcpStream::connect(addr).unwrap();
    poll_until(&mut c, &mut sensors, &mut sink, 0, |c, _| {
        c.session_state() == SessionState::PeerActive
    });

    // `echo heat | nc host port`: one line, then end of stream.
    client.write_all(b"heat\n").unwrap();
    client.shutdown(Shutdown::Write).unwrap();

    poll_until(&mut c, &mut sensors, &mut sink, 1, |c, _| {
        c.mode() == OperatingMode::Heat
    });
    poll_until(&mut c, &mut sensors, &mut sink, 2, |c, _| {
        c.session_state() == SessionState::NoPeer
    });
    assert_eq!(sink.count(|e| *e == AppEvent::PeerDisconnected), 1);
    assert!(sink.events.contains(&AppEvent::ModeChanged {
        from: OperatingMode::Idle,
        to: OperatingMode::Heat,
    }));
}
