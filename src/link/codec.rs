//! Line protocol codec.
//!
//! Outbound (telemetry), one line per transmit tick:
//! ```text
//! T_CORE:<core>,T_WATER:<water>,MODE:<IDLE|HEAT|COOL>\n
//! ```
//! Temperatures are fixed-point with exactly one fractional digit,
//! rounded half away from zero on the stored value (`36.25 → 36.3`).
//!
//! Inbound (commands): one keyword per `\n`-terminated line.  The
//! [`LineDecoder`] accumulates bytes from a non-blocking read and yields
//! complete, trimmed lines.  A single read may carry part of a line or
//! several lines; both are handled.  The two directions share no
//! vocabulary, so the decoder never parses telemetry.

use core::fmt::{self, Write};

use heapless::{Deque, String, Vec};
use log::warn;

use crate::control::thermal::ThermalState;
use crate::fsm::OperatingMode;

/// Longest accepted inbound line, terminator excluded.
pub const MAX_LINE_LEN: usize = 128;

/// Complete lines buffered before the oldest is read.
const MAX_PENDING_LINES: usize = 4;

/// Capacity of an encoded telemetry line.  Covers the widest rendering
/// of any `f32`, so encoding never truncates.
pub const TELEMETRY_CAPACITY: usize = 96;

/// One decoded inbound line.
pub type Line = String<MAX_LINE_LEN>;

/// One encoded outbound line, terminator included.
pub type TelemetryLine = String<TELEMETRY_CAPACITY>;

// ───────────────────────────────────────────────────────────────
// Encoder
// ───────────────────────────────────────────────────────────────

/// Write `value` with exactly one fractional digit.
fn write_tenths(out: &mut impl Write, value: f32) -> fmt::Result {
    // Saturating cast: NaN renders as 0.0, infinities as the i64 extremes.
    let tenths = (f64::from(value) * 10.0).round() as i64;
    let sign = if tenths < 0 { "-" } else { "" };
    let abs = tenths.unsigned_abs();
    write!(out, "{}{}.{}", sign, abs / 10, abs % 10)
}

fn write_telemetry(out: &mut impl Write, state: &ThermalState, mode: OperatingMode) -> fmt::Result {
    out.write_str("T_CORE:")?;
    write_tenths(out, state.core_temp)?;
    out.write_str(",T_WATER:")?;
    write_tenths(out, state.water_temp)?;
    writeln!(out, ",MODE:{}", mode.as_str())
}

/// Encode one telemetry line, trailing newline included.
pub fn encode_telemetry(state: &ThermalState, mode: OperatingMode) -> TelemetryLine {
    let mut line = TelemetryLine::new();
    if write_telemetry(&mut line, state, mode).is_err() {
        // Unreachable with TELEMETRY_CAPACITY; keep the line well-formed anyway.
        line.clear();
        warn!("Telemetry line overflowed {} bytes", TELEMETRY_CAPACITY);
    }
    line
}

// ───────────────────────────────────────────────────────────────
// Decoder
// ───────────────────────────────────────────────────────────────

/// Reduce a raw inbound line to its command token.
pub fn decode_command(line: &str) -> &str {
    line.trim()
}

/// Streaming line decoder.
pub struct LineDecoder {
    partial: Vec<u8, MAX_LINE_LEN>,
    ready: Deque<Line, MAX_PENDING_LINES>,
    /// Set after an over-long line; bytes are dropped up to the next `\n`.
    discarding: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub const fn new() -> Self {
        Self {
            partial: Vec::new(),
            ready: Deque::new(),
            discarding: false,
        }
    }

    /// Feed raw bytes from the transport.
    pub fn push(&mut self, data: &[u8]) {
        for &byte in data {
            if byte == b'\n' {
                if self.discarding {
                    self.discarding = false;
                } else {
                    self.finish_line();
                }
                self.partial.clear();
                continue;
            }
            if self.discarding {
                continue;
            }
            if self.partial.push(byte).is_err() {
                warn!("Inbound line exceeds {} bytes, discarding", MAX_LINE_LEN);
                self.partial.clear();
                self.discarding = true;
            }
        }
    }

    /// Whether at least one complete line is waiting.
    pub fn has_line(&self) -> bool {
        !self.ready.is_empty()
    }

    /// Pop the oldest complete line.
    pub fn next_line(&mut self) -> Option<Line> {
        self.ready.pop_front()
    }

    /// Drop everything (e.g. after the peer changes).
    pub fn reset(&mut self) {
        self.partial.clear();
        self.ready.clear();
        self.discarding = false;
    }

    fn finish_line(&mut self) {
        let Ok(text) = core::str::from_utf8(&self.partial) else {
            warn!("Inbound line is not UTF-8, dropped");
            return;
        };
        let mut line = Line::new();
        // `partial` is bounded by MAX_LINE_LEN, so this always fits.
        if line.push_str(decode_command(text)).is_err() {
            return;
        }
        if self.ready.push_back(line).is_err() {
            warn!("Inbound line queue full, dropping newest line");
        }
    }
}
