//! Control algorithms.

pub mod thermal;
