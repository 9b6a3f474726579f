//! Order state machine implementation.
//!
//! Orders move `pending -> preparing -> ready -> completed`, and may be
//! cancelled from any of the first three states. `completed` and `cancelled`
//! are terminal. Payment status moves `pending -> completed` once.

use cafe_storage::StorageService;
use cafe_types::{EntityId, Order, OrderStatus, PaymentStatus};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during order state management.
#[derive(Debug, Error)]
pub enum OrderStateError {
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Invalid state transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	#[error("Order not found: {0}")]
	OrderNotFound(EntityId),
}

/// Result of a status operation.
#[derive(Debug, Clone)]
pub struct StatusChange {
	/// The order after the operation.
	pub order: Order,
	/// Status before the operation.
	pub previous: OrderStatus,
}

impl StatusChange {
	/// Whether the operation moved the order to a new status.
	pub fn changed(&self) -> bool {
		self.order.status != self.previous
	}
}

/// Manages order state transitions and persistence.
pub struct OrderStateMachine {
	storage: Arc<StorageService>,
}

impl OrderStateMachine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Checks if a status change follows the workflow.
	pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
		from.next() == Some(to) || (to == OrderStatus::Cancelled && !from.is_terminal())
	}

	/// Gets an order by ID.
	pub async fn get_order(&self, order_id: EntityId) -> Result<Order, OrderStateError> {
		self.storage
			.find::<Order>(order_id)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))?
			.ok_or(OrderStateError::OrderNotFound(order_id))
	}

	/// Updates an order with a closure and persists it.
	pub async fn update_order_with<F>(
		&self,
		order_id: EntityId,
		updater: F,
	) -> Result<Order, OrderStateError>
	where
		F: FnOnce(&mut Order),
	{
		self.storage
			.update::<Order, _>(order_id, updater)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))?
			.ok_or(OrderStateError::OrderNotFound(order_id))
	}

	/// Moves the order one step along the workflow. Terminal orders are
	/// returned unchanged.
	pub async fn advance(&self, order_id: EntityId) -> Result<StatusChange, OrderStateError> {
		let order = self.get_order(order_id).await?;
		match order.status.next() {
			Some(next) => self.apply(order, next).await,
			None => Ok(Self::unchanged(order)),
		}
	}

	/// Cancels a non-terminal order. Terminal orders are returned unchanged.
	pub async fn cancel(&self, order_id: EntityId) -> Result<StatusChange, OrderStateError> {
		let order = self.get_order(order_id).await?;
		if order.status.is_terminal() {
			return Ok(Self::unchanged(order));
		}
		self.apply(order, OrderStatus::Cancelled).await
	}

	/// Sets an explicit target status.
	///
	/// No-op when the order is terminal or already in `target`. Any other
	/// change must be the next workflow step or a cancellation.
	pub async fn transition(
		&self,
		order_id: EntityId,
		target: OrderStatus,
	) -> Result<StatusChange, OrderStateError> {
		let order = self.get_order(order_id).await?;
		if order.status.is_terminal() || order.status == target {
			return Ok(Self::unchanged(order));
		}
		if !Self::is_valid_transition(order.status, target) {
			return Err(OrderStateError::InvalidTransition {
				from: order.status,
				to: target,
			});
		}
		self.apply(order, target).await
	}

	/// Marks the order paid. Returns `None` if it already was.
	pub async fn mark_paid(&self, order_id: EntityId) -> Result<Option<Order>, OrderStateError> {
		let order = self.get_order(order_id).await?;
		if order.payment_status.is_completed() {
			return Ok(None);
		}
		self.update_order_with(order_id, |o| o.payment_status = PaymentStatus::Completed)
			.await
			.map(Some)
	}

	async fn apply(
		&self,
		order: Order,
		target: OrderStatus,
	) -> Result<StatusChange, OrderStateError> {
		let previous = order.status;
		let order = self
			.update_order_with(order.id, |o| o.status = target)
			.await?;
		tracing::info!(
			order_id = order.id,
			from = %previous,
			to = %order.status,
			"Order status changed"
		);
		Ok(StatusChange { order, previous })
	}

	fn unchanged(order: Order) -> StatusChange {
		StatusChange {
			previous: order.status,
			order,
		}
	}
}
