//! Order types for the café backend.
//!
//! This module defines pickup orders and the two independent state machines
//! attached to them: the kitchen-driven order status and the payment status.

use crate::{Entity, EntityId, StorageKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A customer's pickup order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier for this order.
	pub id: EntityId,
	/// Customer who placed the order, if known.
	#[serde(default)]
	pub user_id: Option<EntityId>,
	/// Current kitchen status.
	pub status: OrderStatus,
	/// Ordered lines; never empty.
	pub items: Vec<OrderItem>,
	/// Canonical total in minor currency units, computed from menu prices.
	pub total: u64,
	/// Requested pickup time in `HH:MM` form.
	pub pickup_time: String,
	#[serde(default)]
	pub special_instructions: Option<String>,
	/// Prepayment status.
	pub payment_status: PaymentStatus,
	/// Creation timestamp; the sort key for listings.
	pub created_at: DateTime<Utc>,
}

impl Entity for Order {
	const KEY: StorageKey = StorageKey::Orders;

	fn id(&self) -> EntityId {
		self.id
	}
}

/// A single line of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
	pub menu_item_id: EntityId,
	pub quantity: u32,
	/// Free text from the customer; send `""` when there is none.
	pub notes: String,
}

/// Kitchen status of an order.
///
/// The forward path is strictly linear: Pending -> Preparing -> Ready ->
/// Completed. Cancelled can be reached from any non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
	/// Order has been placed and awaits the kitchen.
	Pending,
	/// Kitchen is preparing the order.
	Preparing,
	/// Order is ready for pickup.
	Ready,
	/// Order has been handed over.
	Completed,
	/// Order was cancelled.
	Cancelled,
}

impl OrderStatus {
	/// Returns the single legal forward successor, if any.
	pub fn next(&self) -> Option<OrderStatus> {
		match self {
			OrderStatus::Pending => Some(OrderStatus::Preparing),
			OrderStatus::Preparing => Some(OrderStatus::Ready),
			OrderStatus::Ready => Some(OrderStatus::Completed),
			OrderStatus::Completed | OrderStatus::Cancelled => None,
		}
	}

	/// Completed and Cancelled orders accept no further transitions.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
	}

	/// Returns the wire name of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Preparing => "preparing",
			OrderStatus::Ready => "ready",
			OrderStatus::Completed => "completed",
			OrderStatus::Cancelled => "cancelled",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(OrderStatus::Pending),
			"preparing" => Ok(OrderStatus::Preparing),
			"ready" => Ok(OrderStatus::Ready),
			"completed" => Ok(OrderStatus::Completed),
			"cancelled" => Ok(OrderStatus::Cancelled),
			other => Err(format!("unknown order status '{}'", other)),
		}
	}
}

/// Prepayment status of an order. Moves from Pending to Completed once.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus {
	#[default]
	Pending,
	Completed,
}

impl PaymentStatus {
	pub fn is_completed(&self) -> bool {
		matches!(self, PaymentStatus::Completed)
	}
}

impl fmt::Display for PaymentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PaymentStatus::Pending => write!(f, "pending"),
			PaymentStatus::Completed => write!(f, "completed"),
		}
	}
}
