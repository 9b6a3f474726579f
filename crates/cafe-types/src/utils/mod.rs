//! Utility functions shared across the café crates.

pub mod time;

pub use time::{format_clock_time, parse_clock_time};
