//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`].  Attempts are non-blocking: the
//! [`LinkSupervisor`](crate::link::supervisor::LinkSupervisor) calls
//! `begin_connect()` at most once per retry interval and polls
//! `is_connected()` every loop pass.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::EspWifi` in client mode.
//! - **all other targets**: simulation that associates on the first
//!   attempt unless failures are injected with [`WifiAdapter::sim_fail_next`].

use log::info;
#[cfg(not(target_os = "espidf"))]
use log::warn;

use crate::app::ports::ConnectivityPort;
use crate::error::Error;

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

impl WifiCredentials {
    /// SSID: 1-32 printable ASCII bytes.  Password: empty (open network)
    /// or 8-64 bytes (WPA2).
    pub fn new(ssid: &str, password: &str) -> Result<Self, Error> {
        if ssid.is_empty() || !is_printable_ascii(ssid) {
            return Err(Error::Init("invalid WiFi SSID"));
        }
        if !password.is_empty() && password.len() < 8 {
            return Err(Error::Init("invalid WiFi password"));
        }
        let ssid = heapless::String::try_from(ssid).map_err(|_| Error::Init("invalid WiFi SSID"))?;
        let password = heapless::String::try_from(password)
            .map_err(|_| Error::Init("invalid WiFi password"))?;
        Ok(Self { ssid, password })
    }

    /// Credentials baked in at build time through `WIFI_SSID` /
    /// `WIFI_PASSWORD`, if present.
    pub fn from_build_env() -> Option<Result<Self, Error>> {
        let ssid = option_env!("WIFI_SSID")?;
        Some(Self::new(ssid, option_env!("WIFI_PASSWORD").unwrap_or("")))
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    credentials: WifiCredentials,
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_failures_left: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_connect_counter: u32,
}

impl WifiAdapter {
    /// Bring up the station interface.  Association starts with the first
    /// `begin_connect()`.
    #[cfg(target_os = "espidf")]
    pub fn new(credentials: WifiCredentials) -> Result<Self, Error> {
        use esp_idf_svc::eventloop::EspSystemEventLoop;
        use esp_idf_svc::hal::peripherals::Peripherals;
        use esp_idf_svc::nvs::EspDefaultNvsPartition;
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

        let peripherals = Peripherals::take().map_err(|_| Error::Init("peripherals"))?;
        let sysloop = EspSystemEventLoop::take().map_err(|_| Error::Init("event loop"))?;
        let nvs = EspDefaultNvsPartition::take().map_err(|_| Error::Init("nvs"))?;

        let mut wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))
            .map_err(|_| Error::Init("wifi driver"))?;
        let auth_method = if credentials.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: credentials.ssid.clone(),
            password: credentials.password.clone(),
            auth_method,
            ..Default::default()
        }))
        .map_err(|_| Error::Init("wifi configuration"))?;
        wifi.start().map_err(|_| Error::Init("wifi start"))?;

        info!("WiFi: station started (SSID='{}')", credentials.ssid);
        Ok(Self { credentials, wifi })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(credentials: WifiCredentials) -> Result<Self, Error> {
        info!("WiFi(sim): station ready (SSID='{}')", credentials.ssid);
        Ok(Self {
            credentials,
            sim_connected: false,
            sim_failures_left: 0,
            sim_connect_counter: 0,
        })
    }

    pub fn credentials(&self) -> &WifiCredentials {
        &self.credentials
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Make the next `n` association attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_failures_left = n;
    }

    /// Drop the simulated association (AP went away).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop(&mut self) {
        self.sim_connected = false;
    }

    /// Association attempts made so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_attempts(&self) -> u32 {
        self.sim_connect_counter
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl ConnectivityPort for WifiAdapter {
    fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn begin_connect(&mut self) -> Result<(), Error> {
        info!("WiFi: connecting to '{}'", self.credentials.ssid);
        self.wifi
            .connect()
            .map_err(|_| Error::Init("wifi connect"))
    }
}

#[cfg(not(target_os = "espidf"))]
impl ConnectivityPort for WifiAdapter {
    fn is_connected(&self) -> bool {
        self.sim_connected
    }

    fn begin_connect(&mut self) -> Result<(), Error> {
        self.sim_connect_counter = self.sim_connect_counter.wrapping_add(1);
        if self.sim_failures_left > 0 {
            self.sim_failures_left -= 1;
            warn!(
                "WiFi(sim): association failed (attempt {})",
                self.sim_connect_counter
            );
            return Ok(());
        }
        self.sim_connected = true;
        info!(
            "WiFi(sim): connected to '{}' (attempt {})",
            self.credentials.ssid, self.sim_connect_counter
        );
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
