//! Input validation and the pickup-time rule.
//!
//! Validators run before the engine touches storage. Every failure is a
//! [`CafeError::Validation`] carrying a message suitable for the client.

use crate::CafeError;
use cafe_config::CafeConfig;
use cafe_types::{
	format_clock_time, parse_clock_time, CreateOrderRequest, CreateUserRequest, PaymentMethod,
	PaymentRequest,
};
use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Timelike, Utc};

const MIN_PASSWORD_LEN: usize = 6;

fn invalid(message: impl Into<String>) -> CafeError {
	CafeError::Validation(message.into())
}

/// Checks registration payloads.
pub struct UserValidator;

impl UserValidator {
	pub fn validate(request: &CreateUserRequest) -> Result<(), CafeError> {
		if request.name.trim().is_empty() {
			return Err(invalid("name is required"));
		}
		if request.phone.trim().is_empty() {
			return Err(invalid("phone is required"));
		}
		if let Some(email) = &request.email {
			let valid = email
				.split_once('@')
				.is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
			if !valid {
				return Err(invalid(format!("'{}' is not a valid email address", email)));
			}
		}
		if let Some(password) = &request.password {
			if password.chars().count() < MIN_PASSWORD_LEN {
				return Err(invalid(format!(
					"password must be at least {} characters",
					MIN_PASSWORD_LEN
				)));
			}
		}
		Ok(())
	}
}

/// Checks the shape of an order payload.
pub struct OrderValidator;

impl OrderValidator {
	/// Returns the parsed pickup time on success.
	pub fn validate(request: &CreateOrderRequest) -> Result<NaiveTime, CafeError> {
		if request.items.is_empty() {
			return Err(invalid("order must contain at least one item"));
		}
		if let Some(line) = request.items.iter().find(|line| line.quantity == 0) {
			return Err(invalid(format!(
				"quantity for menu item {} must be at least 1",
				line.menu_item_id
			)));
		}
		parse_clock_time(&request.pickup_time).ok_or_else(|| {
			invalid(format!(
				"pickup time '{}' must use the HH:MM format",
				request.pickup_time
			))
		})
	}
}

/// Checks payment payloads.
///
/// Card details are optional. When a card payment carries any of them, all
/// three must be present and well-formed. They are never stored.
pub struct PaymentValidator;

impl PaymentValidator {
	pub fn validate(request: &PaymentRequest) -> Result<(), CafeError> {
		if request.payment_method != PaymentMethod::Card {
			return Ok(());
		}
		let details = [&request.card_number, &request.expiry_date, &request.cvv];
		if details.iter().all(|d| d.is_none()) {
			return Ok(());
		}

		let (Some(number), Some(expiry), Some(cvv)) =
			(&request.card_number, &request.expiry_date, &request.cvv)
		else {
			return Err(invalid(
				"card number, expiry date and CVV must be supplied together",
			));
		};

		let digits: String = number.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
		if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
			return Err(invalid("card number must have 16 digits"));
		}
		if !is_valid_expiry(expiry) {
			return Err(invalid("expiry date must use the MM/YY format"));
		}
		if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
			return Err(invalid("CVV must have 3 or 4 digits"));
		}
		Ok(())
	}
}

fn is_valid_expiry(expiry: &str) -> bool {
	let Some((month, year)) = expiry.split_once('/') else {
		return false;
	};
	let two_digits = |s: &str| s.len() == 2 && s.chars().all(|c| c.is_ascii_digit());
	two_digits(month)
		&& two_digits(year)
		&& month.parse::<u8>().is_ok_and(|m| (1..=12).contains(&m))
}

/// Same-day pickup rule.
///
/// A pickup time is accepted when it falls within `[earliest, closing]`,
/// where `earliest` is the later of opening time and local now plus the
/// minimum lead time, rounded up to a whole minute. Once that reaches past
/// midnight no pickup is possible until the next day.
#[derive(Debug, Clone)]
pub struct PickupWindow {
	opening: NaiveTime,
	closing: NaiveTime,
	min_lead: Duration,
	offset: FixedOffset,
}

impl PickupWindow {
	pub fn new(
		opening: NaiveTime,
		closing: NaiveTime,
		min_lead_minutes: u32,
		utc_offset_minutes: i32,
	) -> Result<Self, CafeError> {
		if opening >= closing {
			return Err(invalid(format!(
				"opening time {} must be before closing time {}",
				format_clock_time(opening),
				format_clock_time(closing)
			)));
		}
		let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
			invalid(format!("UTC offset of {} minutes is out of range", utc_offset_minutes))
		})?;
		Ok(Self {
			opening,
			closing,
			min_lead: Duration::minutes(i64::from(min_lead_minutes)),
			offset,
		})
	}

	pub fn from_config(cafe: &CafeConfig) -> Result<Self, CafeError> {
		let parse = |label: &str, value: &str| {
			parse_clock_time(value)
				.ok_or_else(|| invalid(format!("{} '{}' is not a valid HH:MM time", label, value)))
		};
		Self::new(
			parse("opening_time", &cafe.opening_time)?,
			parse("closing_time", &cafe.closing_time)?,
			cafe.min_lead_minutes,
			cafe.utc_offset_minutes,
		)
	}

	pub fn opening(&self) -> NaiveTime {
		self.opening
	}

	pub fn closing(&self) -> NaiveTime {
		self.closing
	}

	/// Earliest acceptable pickup today, or `None` when the lead time
	/// crosses midnight.
	pub fn earliest(&self, now: DateTime<Utc>) -> Option<NaiveTime> {
		let local_now = now.with_timezone(&self.offset).naive_local();
		let mut ready_at = local_now + self.min_lead;
		let past_minute = Duration::seconds(i64::from(ready_at.second()))
			+ Duration::nanoseconds(i64::from(ready_at.nanosecond()));
		if past_minute > Duration::zero() {
			ready_at = ready_at - past_minute + Duration::minutes(1);
		}
		if ready_at.date() != local_now.date() {
			return None;
		}
		Some(ready_at.time().max(self.opening))
	}

	pub fn check(&self, pickup: NaiveTime, now: DateTime<Utc>) -> Result<(), CafeError> {
		let Some(earliest) = self.earliest(now) else {
			return Err(invalid("no pickup times are left today"));
		};
		if pickup < earliest || pickup > self.closing {
			return Err(invalid(format!(
				"pickup time {} is outside today's pickup window {}-{}",
				format_clock_time(pickup),
				format_clock_time(earliest),
				format_clock_time(self.closing)
			)));
		}
		Ok(())
	}
}
