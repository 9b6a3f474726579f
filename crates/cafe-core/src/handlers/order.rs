//! Order handler for placing and progressing pickup orders.

use crate::clock::Clock;
use crate::handlers::{MenuHandler, NotificationHandler, UserHandler};
use crate::state::{OrderStateMachine, StatusChange};
use crate::validation::{OrderValidator, PickupWindow};
use crate::CafeError;
use cafe_storage::StorageService;
use cafe_types::{
	format_clock_time, CreateOrderRequest, EntityId, Order, OrderFilter, OrderStatus,
	PaymentStatus,
};
use std::sync::Arc;

/// Handler for order creation, queries and status changes.
pub struct OrderHandler {
	storage: Arc<StorageService>,
	state_machine: Arc<OrderStateMachine>,
	menu: Arc<MenuHandler>,
	users: Arc<UserHandler>,
	notifications: Arc<NotificationHandler>,
	window: PickupWindow,
	clock: Arc<dyn Clock>,
}

impl OrderHandler {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		storage: Arc<StorageService>,
		state_machine: Arc<OrderStateMachine>,
		menu: Arc<MenuHandler>,
		users: Arc<UserHandler>,
		notifications: Arc<NotificationHandler>,
		window: PickupWindow,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self {
			storage,
			state_machine,
			menu,
			users,
			notifications,
			window,
			clock,
		}
	}

	/// Validates and stores a new order.
	///
	/// All checks run before anything is written: shape, pickup window, item
	/// availability, customer existence and the client total.
	pub async fn create(&self, request: CreateOrderRequest) -> Result<Order, CafeError> {
		let pickup = OrderValidator::validate(&request)?;
		let now = self.clock.now();
		self.window.check(pickup, now)?;

		let mut total: u64 = 0;
		for line in &request.items {
			let item = self
				.menu
				.find(line.menu_item_id)
				.await?
				.filter(|item| item.available)
				.ok_or(CafeError::ItemUnavailable(line.menu_item_id))?;
			let line_total = item
				.price
				.checked_mul(u64::from(line.quantity))
				.and_then(|t| t.checked_add(total))
				.ok_or_else(|| CafeError::Validation("order total is too large".into()))?;
			total = line_total;
		}

		if let Some(user_id) = request.user_id {
			if !self.users.exists(user_id).await? {
				return Err(CafeError::not_found("User", user_id));
			}
		}

		if request.total != total {
			return Err(CafeError::Validation(format!(
				"order total {} does not match menu prices (expected {})",
				request.total, total
			)));
		}

		let special_instructions = request
			.special_instructions
			.filter(|s| !s.trim().is_empty());
		let order = self
			.storage
			.insert(|id| Order {
				id,
				user_id: request.user_id,
				status: OrderStatus::Pending,
				items: request.items,
				total,
				pickup_time: format_clock_time(pickup),
				special_instructions,
				payment_status: PaymentStatus::Pending,
				created_at: now,
			})
			.await?;

		tracing::info!(
			order_id = order.id,
			total = order.total,
			pickup_time = %order.pickup_time,
			"Order created"
		);
		Ok(order)
	}

	pub async fn get(&self, id: EntityId) -> Result<Order, CafeError> {
		Ok(self.state_machine.get_order(id).await?)
	}

	/// Orders matching the filter, newest first with ties broken by ID.
	pub async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, CafeError> {
		let mut orders: Vec<Order> = self
			.storage
			.list::<Order>()
			.await?
			.into_iter()
			.filter(|order| filter.status.is_none_or(|status| order.status == status))
			.filter(|order| {
				filter
					.active
					.is_none_or(|active| order.status.is_terminal() != active)
			})
			.collect();
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
		Ok(orders)
	}

	pub async fn advance(&self, id: EntityId) -> Result<Order, CafeError> {
		let change = self.state_machine.advance(id).await?;
		self.finish(change).await
	}

	pub async fn cancel(&self, id: EntityId) -> Result<Order, CafeError> {
		let change = self.state_machine.cancel(id).await?;
		self.finish(change).await
	}

	pub async fn transition(&self, id: EntityId, target: OrderStatus) -> Result<Order, CafeError> {
		let change = self.state_machine.transition(id, target).await?;
		self.finish(change).await
	}

	/// The status change is already stored; a failed notification is
	/// logged and does not fail the operation.
	async fn finish(&self, change: StatusChange) -> Result<Order, CafeError> {
		if change.changed() {
			let message = format!("Order #{} is now {}", change.order.id, change.order.status);
			if let Err(e) = self.notifications.notify(&change.order, message).await {
				tracing::warn!(
					order_id = change.order.id,
					error = %e,
					"Failed to store status notification"
				);
			}
		}
		Ok(change.order)
	}
}
