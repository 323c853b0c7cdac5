//! Application core — pure domain logic, zero I/O.
//!
//! The controller loop ties the thermal model, the mode state machine,
//! the scheduler and the session manager together.  All interaction with
//! sockets, serial ports and ADCs happens through the **port traits** in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
