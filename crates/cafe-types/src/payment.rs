//! Payment types.
//!
//! Payments are recorded, not processed: the backend stores the method and
//! amount and flips the order's payment status.

use crate::{Entity, EntityId, StorageKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
	Card,
	Cash,
}

impl fmt::Display for PaymentMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PaymentMethod::Card => write!(f, "card"),
			PaymentMethod::Cash => write!(f, "cash"),
		}
	}
}

/// A prepayment recorded against an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
	pub id: EntityId,
	pub order_id: EntityId,
	/// Prepaid amount in minor currency units.
	pub amount: u64,
	pub payment_method: PaymentMethod,
	pub created_at: DateTime<Utc>,
}

impl Entity for Payment {
	const KEY: StorageKey = StorageKey::Payments;

	fn id(&self) -> EntityId {
		self.id
	}
}
