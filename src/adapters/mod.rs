//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter            | Implements                 | Connects to              |
//! |--------------------|----------------------------|--------------------------|
//! | `log_sink`         | EventSink                  | `log` facade             |
//! | `serial_transport` | PeerListener / PeerLink    | serial device (host)     |
//! | `tcp_transport`    | PeerListener / PeerLink    | non-blocking TCP socket  |
//! | `time`             | Clock                      | ESP32 system timer       |
//! | `wifi`             | ConnectivityPort           | ESP-IDF WiFi STA         |
//!
//! The ADC adapter lives in [`crate::sensors`].

pub mod log_sink;
#[cfg(all(feature = "serial", not(target_os = "espidf")))]
pub mod serial_transport;
pub mod tcp_transport;
pub mod time;
pub mod wifi;
