//! Operator link: line codec, single-peer session, and the retry
//! machinery that keeps the link layer up without blocking the loop.
//!
//! Transport adapters (TCP, serial) live in [`crate::adapters`] and plug
//! in through [`PeerListener`](crate::app::ports::PeerListener).

pub mod codec;
pub mod retry;
pub mod session;
pub mod supervisor;
