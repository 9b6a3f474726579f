//! Time-of-day helpers.
//!
//! Pickup times, opening hours and analytics slots are all expressed as
//! `HH:MM` strings on the wire.

use chrono::{NaiveTime, Timelike};

/// Parses a strict `HH:MM` time of day.
///
/// Both components must be exactly two ASCII digits; `9:30` and `09:30:00`
/// are rejected.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
	let (hours, minutes) = value.split_once(':')?;
	if hours.len() != 2 || minutes.len() != 2 {
		return None;
	}
	if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
		return None;
	}
	let hours: u32 = hours.parse().ok()?;
	let minutes: u32 = minutes.parse().ok()?;
	NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Formats a time of day as `HH:MM`.
pub fn format_clock_time(time: NaiveTime) -> String {
	format!("{:02}:{:02}", time.hour(), time.minute())
}
