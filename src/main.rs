//! Thermolink — main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  TcpLineListener / SerialLineListener   (PeerListener)     │
//! │  AnalogSensors (SensorPort)   LogEventSink (EventSink)     │
//! │  MonotonicClock (Clock)       WifiAdapter (Connectivity)   │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ───────────────      │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │          Controller (pure logic)                 │      │
//! │  │  Scheduler · Thermal model · Mode machine        │      │
//! │  └──────────────────────────────────────────────────┘      │
//! │                                                            │
//! │  LinkSupervisor (non-blocking WiFi retry)                  │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use thermolink::adapters::log_sink::LogEventSink;
use thermolink::adapters::tcp_transport::TcpLineListener;
use thermolink::adapters::time::MonotonicClock;
use thermolink::adapters::wifi::{WifiAdapter, WifiCredentials};
use thermolink::app::ports::{Clock, EventSink, PeerListener, SensorPort};
use thermolink::app::service::Controller;
use thermolink::config::{ControllerConfig, LinkConfig};
use thermolink::link::supervisor::LinkSupervisor;
use thermolink::sensors::AnalogSensors;
use thermolink::Error;

// ── Bootstrap helpers ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_platform() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_platform() -> Result<()> {
    // RUST_LOG overrides; `info` otherwise.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logger init failed: {e}"))
}

/// No filesystem on the device; the board runs the built-in defaults.
#[cfg(target_os = "espidf")]
fn load_config() -> Result<ControllerConfig> {
    let config = ControllerConfig::default();
    config.validate().map_err(Error::from)?;
    Ok(config)
}

/// First argument, if any, names a JSON config file.
#[cfg(not(target_os = "espidf"))]
fn load_config() -> Result<ControllerConfig> {
    match std::env::args_os().nth(1) {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let config = ControllerConfig::load_from_path(&path).map_err(Error::from)?;
            info!("Config loaded from {}", path.display());
            Ok(config)
        }
        None => {
            info!("No config file given, using defaults");
            let config = ControllerConfig::default();
            config.validate().map_err(Error::from)?;
            Ok(config)
        }
    }
}

#[cfg(target_os = "espidf")]
fn wifi_credentials() -> Result<WifiCredentials> {
    match WifiCredentials::from_build_env() {
        Some(creds) => Ok(creds?),
        None => Err(Error::Init("WIFI_SSID was not set at build time").into()),
    }
}

#[cfg(not(target_os = "espidf"))]
fn wifi_credentials() -> Result<WifiCredentials> {
    match WifiCredentials::from_build_env() {
        Some(creds) => Ok(creds?),
        None => Ok(WifiCredentials::new("thermolink-sim", "")?),
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_platform()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Thermolink v{}                   ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config()?;
    let clock = MonotonicClock::new();
    let sink = LogEventSink::new();
    let sensors = AnalogSensors::new()?;

    match &config.link {
        LinkConfig::Network { port } => {
            // The network stack must be up before the socket is bound.
            let wifi = WifiAdapter::new(wifi_credentials()?)?;
            let supervisor = LinkSupervisor::new(wifi, config.reconnect);
            let listener = TcpLineListener::bind(*port)?;
            info!("Boot complete: telemetry on TCP port {}", port);
            run(&config, listener, Some(supervisor), sensors, sink, &clock)
        }
        LinkConfig::Serial { path, baud_rate } => {
            let listener = open_serial(&config, path, *baud_rate)?;
            info!("Boot complete: telemetry on {} @ {} baud", path, baud_rate);
            run(&config, listener, None, sensors, sink, &clock)
        }
    }
}

#[cfg(all(feature = "serial", not(target_os = "espidf")))]
fn open_serial(
    config: &ControllerConfig,
    path: &str,
    baud_rate: u32,
) -> Result<thermolink::adapters::serial_transport::SerialLineListener> {
    Ok(thermolink::adapters::serial_transport::SerialLineListener::new(
        path,
        baud_rate,
        config.reconnect,
    ))
}

#[cfg(not(all(feature = "serial", not(target_os = "espidf"))))]
fn open_serial(
    _config: &ControllerConfig,
    _path: &str,
    _baud_rate: u32,
) -> Result<TcpLineListener> {
    Err(Error::Init("serial link is not available in this build").into())
}

// ── Event loop ────────────────────────────────────────────────

fn run<L: PeerListener>(
    config: &ControllerConfig,
    listener: L,
    mut supervisor: Option<LinkSupervisor<WifiAdapter>>,
    mut sensors: impl SensorPort,
    mut sink: impl EventSink,
    clock: &impl Clock,
) -> Result<()> {
    let mut controller = Controller::new(config, listener);
    controller.start(&mut sink);

    let idle = std::time::Duration::from_millis(u64::from(config.loop_idle_ms));
    if idle.is_zero() {
        warn!("loop_idle_ms is 0, the loop will spin");
    }

    loop {
        let now_ms = clock.now_ms();
        if let Some(supervisor) = supervisor.as_mut() {
            supervisor.poll(now_ms);
        }
        controller.poll(now_ms, &mut sensors, &mut sink);

        if !idle.is_zero() {
            std::thread::sleep(idle);
        }
    }
}
