//! Café engine facade.
//!
//! [`CafeEngine`] wires the handlers to a single storage service and is the
//! only entry point the HTTP layer uses. Every mutating operation takes the
//! engine's writer lock, so check-then-write sequences such as "item is
//! available, then insert order" cannot interleave. Reads take no lock.

use crate::analytics::AnalyticsAggregator;
use crate::clock::Clock;
use crate::handlers::{
	MenuHandler, NotificationHandler, OrderHandler, PaymentHandler, UserHandler,
};
use crate::seed::default_menu;
use crate::state::OrderStateMachine;
use crate::validation::PickupWindow;
use crate::CafeError;
use cafe_config::Config;
use cafe_storage::StorageService;
use cafe_types::{
	CreateOrderRequest, CreateUserRequest, EntityId, MenuItem, Notification, Order, OrderFilter,
	OrderStatus, Payment, PaymentRequest, PopularItem, TimeSlotCount, User,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

/// Main engine serving all café operations.
pub struct CafeEngine {
	config: Config,
	users: Arc<UserHandler>,
	menu: Arc<MenuHandler>,
	orders: OrderHandler,
	payments: PaymentHandler,
	notifications: Arc<NotificationHandler>,
	analytics: AnalyticsAggregator,
	/// Serializes all writes.
	write_lock: Mutex<()>,
}

impl CafeEngine {
	/// Creates an engine over the given store. Call [`initialize`] before
	/// serving requests.
	///
	/// [`initialize`]: CafeEngine::initialize
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		clock: Arc<dyn Clock>,
	) -> Result<Self, CafeError> {
		let window = PickupWindow::from_config(&config.cafe)?;
		let state_machine = Arc::new(OrderStateMachine::new(storage.clone()));
		let users = Arc::new(UserHandler::new(storage.clone()));
		let menu = Arc::new(MenuHandler::new(storage.clone()));
		let notifications = Arc::new(NotificationHandler::new(storage.clone(), clock.clone()));
		let analytics =
			AnalyticsAggregator::new(storage.clone(), window.opening(), window.closing());

		let orders = OrderHandler::new(
			storage.clone(),
			state_machine.clone(),
			menu.clone(),
			users.clone(),
			notifications.clone(),
			window,
			clock.clone(),
		);
		let payments = PaymentHandler::new(
			storage,
			state_machine,
			notifications.clone(),
			clock,
			config.cafe.prepayment_percent,
		);

		Ok(Self {
			config,
			users,
			menu,
			orders,
			payments,
			notifications,
			analytics,
			write_lock: Mutex::new(()),
		})
	}

	/// Seeds the menu (only into an empty catalogue) and the staff accounts.
	#[instrument(skip_all, fields(cafe = %self.config.cafe.name))]
	pub async fn initialize(&self) -> Result<(), CafeError> {
		let _guard = self.write_lock.lock().await;

		let seeds = if self.config.menu.is_empty() {
			default_menu()
		} else {
			self.config.menu.clone()
		};
		let seeded_items = self.menu.seed(seeds).await?;
		let seeded_staff = self.users.seed_staff(&self.config.cafe.staff).await?;

		tracing::info!(seeded_items, seeded_staff, "Engine initialized");
		Ok(())
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Registers a customer. The flag is `false` when the phone was already
	/// known and the existing user is returned.
	#[instrument(skip_all)]
	pub async fn create_user(
		&self,
		request: CreateUserRequest,
	) -> Result<(User, bool), CafeError> {
		let _guard = self.write_lock.lock().await;
		self.users.create(request).await
	}

	pub async fn get_user(&self, id: EntityId) -> Result<User, CafeError> {
		self.users.get(id).await
	}

	pub async fn list_menu_items(&self) -> Result<Vec<MenuItem>, CafeError> {
		self.menu.list().await
	}

	pub async fn get_menu_item(&self, id: EntityId) -> Result<MenuItem, CafeError> {
		self.menu.get(id).await
	}

	/// Switches a menu item on or off. Unknown IDs are a no-op.
	#[instrument(skip_all, fields(menu_item_id = id, available = available))]
	pub async fn set_menu_item_availability(
		&self,
		id: EntityId,
		available: bool,
	) -> Result<(), CafeError> {
		let _guard = self.write_lock.lock().await;
		self.menu.set_availability(id, available).await?;
		Ok(())
	}

	#[instrument(skip_all, fields(user_id = ?request.user_id, lines = request.items.len()))]
	pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, CafeError> {
		let _guard = self.write_lock.lock().await;
		self.orders.create(request).await
	}

	pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, CafeError> {
		self.orders.list(filter).await
	}

	pub async fn get_order(&self, id: EntityId) -> Result<Order, CafeError> {
		self.orders.get(id).await
	}

	/// Moves an order to its next status; no-op for terminal orders.
	#[instrument(skip_all, fields(order_id = id))]
	pub async fn advance_order_status(&self, id: EntityId) -> Result<Order, CafeError> {
		let _guard = self.write_lock.lock().await;
		self.orders.advance(id).await
	}

	/// Cancels a non-terminal order; no-op for terminal orders.
	#[instrument(skip_all, fields(order_id = id))]
	pub async fn cancel_order(&self, id: EntityId) -> Result<Order, CafeError> {
		let _guard = self.write_lock.lock().await;
		self.orders.cancel(id).await
	}

	#[instrument(skip_all, fields(order_id = id, target = %target))]
	pub async fn transition_order_status(
		&self,
		id: EntityId,
		target: OrderStatus,
	) -> Result<Order, CafeError> {
		let _guard = self.write_lock.lock().await;
		self.orders.transition(id, target).await
	}

	/// Records the prepayment for an order. Returns `None` when the order
	/// was already paid.
	#[instrument(skip_all, fields(order_id = order_id, method = %request.payment_method))]
	pub async fn record_payment(
		&self,
		order_id: EntityId,
		request: PaymentRequest,
	) -> Result<Option<Payment>, CafeError> {
		let _guard = self.write_lock.lock().await;
		self.payments.record(order_id, request).await
	}

	pub async fn popular_items(&self) -> Result<Vec<PopularItem>, CafeError> {
		self.analytics.popular_items().await
	}

	pub async fn orders_by_time_slot(&self) -> Result<Vec<TimeSlotCount>, CafeError> {
		self.analytics.orders_by_time_slot().await
	}

	pub async fn list_notifications(
		&self,
		user_id: EntityId,
	) -> Result<Vec<Notification>, CafeError> {
		self.notifications.list_for_user(user_id).await
	}

	/// Marks a notification read; unknown IDs are a no-op.
	#[instrument(skip_all, fields(notification_id = id))]
	pub async fn mark_notification_read(&self, id: EntityId) -> Result<(), CafeError> {
		let _guard = self.write_lock.lock().await;
		self.notifications.mark_read(id).await?;
		Ok(())
	}
}
