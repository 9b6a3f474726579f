//! Source of the current time.
//!
//! The pickup window and order timestamps depend on "now"; routing them
//! through [`Clock`] lets tests pin the time.

use chrono::{DateTime, Utc};

/// Provides the current UTC time.
pub trait Clock: Send + Sync + std::fmt::Debug {
	fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// A clock that only moves when told to.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug)]
pub struct FixedClock {
	now: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
	pub fn new(now: DateTime<Utc>) -> Self {
		Self {
			now: std::sync::Mutex::new(now),
		}
	}

	/// Fixed clock at the given UTC wall time on 2024-05-06.
	pub fn at(hour: u32, minute: u32) -> Self {
		use chrono::TimeZone;
		Self::new(
			Utc.with_ymd_and_hms(2024, 5, 6, hour, minute, 0)
				.single()
				.unwrap_or_default(),
		)
	}

	pub fn advance(&self, by: chrono::Duration) {
		let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
		*now += by;
	}
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
	fn now(&self) -> DateTime<Utc> {
		*self.now.lock().unwrap_or_else(|e| e.into_inner())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fixed_clock_advances() {
		let clock = FixedClock::at(9, 0);
		let start = clock.now();
		clock.advance(chrono::Duration::minutes(90));
		assert_eq!(clock.now() - start, chrono::Duration::minutes(90));
	}
}
