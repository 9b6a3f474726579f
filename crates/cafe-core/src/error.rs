//! Error type returned by every engine operation.

use crate::state::OrderStateError;
use cafe_storage::StorageError;
use cafe_types::{EntityId, OrderStatus};
use thiserror::Error;

/// Errors surfaced to callers of the café engine.
#[derive(Debug, Error)]
pub enum CafeError {
	/// Input failed a structural or business rule check.
	#[error("Validation error: {0}")]
	Validation(String),
	/// A referenced menu item is missing or switched off.
	#[error("Menu item {0} is unavailable")]
	ItemUnavailable(EntityId),
	/// A referenced entity does not exist.
	#[error("{entity} {id} not found")]
	NotFound { entity: &'static str, id: EntityId },
	/// The requested status change is not part of the order workflow.
	#[error("Cannot change order status from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// The storage backend failed.
	#[error("Storage error: {0}")]
	Storage(String),
	/// Any other server-side failure.
	#[error("Internal error: {0}")]
	Internal(String),
}

impl CafeError {
	pub(crate) fn not_found(entity: &'static str, id: EntityId) -> Self {
		CafeError::NotFound { entity, id }
	}
}

impl From<StorageError> for CafeError {
	fn from(err: StorageError) -> Self {
		CafeError::Storage(err.to_string())
	}
}

impl From<OrderStateError> for CafeError {
	fn from(err: OrderStateError) -> Self {
		match err {
			OrderStateError::OrderNotFound(id) => CafeError::not_found("Order", id),
			OrderStateError::InvalidTransition { from, to } => {
				CafeError::InvalidTransition { from, to }
			},
			OrderStateError::Storage(message) => CafeError::Storage(message),
		}
	}
}
