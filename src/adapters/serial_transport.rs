//! Serial line transport (host builds with the `serial` feature).
//!
//! The "listener" is the device path itself: each accept attempt tries to
//! open the port, throttled by a [`RetryGate`] so a missing adapter costs
//! one `open()` per retry interval instead of one per loop pass.  Once
//! open, the port is the single peer until an I/O error closes it.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use log::{info, warn};
use serialport::SerialPort;

use crate::app::ports::{PeerLink, PeerListener};
use crate::config::RetryPolicy;
use crate::link::codec::{Line, LineDecoder};
use crate::link::retry::RetryGate;

const READ_CHUNK: usize = 64;

// ───────────────────────────────────────────────────────────────
// Listener
// ───────────────────────────────────────────────────────────────

pub struct SerialLineListener {
    path: String,
    baud_rate: u32,
    gate: RetryGate,
}

impl SerialLineListener {
    pub fn new(path: &str, baud_rate: u32, policy: RetryPolicy) -> Self {
        info!("Serial: using {} at {} baud", path, baud_rate);
        Self {
            path: path.to_owned(),
            baud_rate,
            // Reopening is retried for as long as the device is missing.
            gate: RetryGate::new(RetryPolicy {
                max_attempts: 0,
                ..policy
            }),
        }
    }

    /// `open()` calls made since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.gate.attempts()
    }
}

impl PeerListener for SerialLineListener {
    type Peer = SerialPeer;

    fn accept_if_available(&mut self, now_ms: u64) -> Option<SerialPeer> {
        if !self.gate.try_begin(now_ms) {
            return None;
        }
        let opened = serialport::new(self.path.as_str(), self.baud_rate)
            .timeout(Duration::ZERO)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .open();
        match opened {
            Ok(port) => {
                info!("Serial: opened {}", self.path);
                self.gate.reset();
                Some(SerialPeer::new(port))
            }
            Err(e) => {
                warn!(
                    "Serial: open {} failed (attempt {}): {}",
                    self.path,
                    self.gate.attempts(),
                    e
                );
                None
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Peer
// ───────────────────────────────────────────────────────────────

pub struct SerialPeer {
    port: Box<dyn SerialPort>,
    decoder: LineDecoder,
    connected: bool,
}

impl SerialPeer {
    fn new(port: Box<dyn SerialPort>) -> Self {
        Self {
            port,
            decoder: LineDecoder::new(),
            connected: true,
        }
    }

    fn pump(&mut self) {
        let mut buf = [0u8; READ_CHUNK];
        while self.connected {
            let available = match self.port.bytes_to_read() {
                Ok(0) => return,
                Ok(n) => (n as usize).min(READ_CHUNK),
                Err(e) => {
                    warn!("Serial: device lost: {}", e);
                    self.connected = false;
                    return;
                }
            };
            match self.port.read(&mut buf[..available]) {
                Ok(n) => self.decoder.push(&buf[..n]),
                Err(ref e) if e.kind() == ErrorKind::TimedOut => return,
                Err(e) => {
                    warn!("Serial: read error: {}", e);
                    self.connected = false;
                }
            }
        }
    }
}

impl PeerLink for SerialPeer {
    fn is_connected(&mut self) -> bool {
        self.pump();
        // Lines read before the device went away are still delivered.
        self.connected || self.decoder.has_line()
    }

    fn write_line(&mut self, line: &str) -> bool {
        if !self.connected {
            return false;
        }
        match self.port.write(line.as_bytes()) {
            Ok(n) => n == line.len(),
            Err(ref e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => false,
            Err(e) => {
                warn!("Serial: write error: {}", e);
                self.connected = false;
                false
            }
        }
    }

    fn has_line(&mut self) -> bool {
        self.pump();
        self.decoder.has_line()
    }

    fn read_line(&mut self) -> Option<Line> {
        self.decoder.next_line()
    }
}
