//! Customer notifications about order changes.

use crate::clock::Clock;
use crate::CafeError;
use cafe_storage::StorageService;
use cafe_types::{EntityId, Notification, Order};
use std::sync::Arc;

/// Handler for notification records.
pub struct NotificationHandler {
	storage: Arc<StorageService>,
	clock: Arc<dyn Clock>,
}

impl NotificationHandler {
	pub fn new(storage: Arc<StorageService>, clock: Arc<dyn Clock>) -> Self {
		Self { storage, clock }
	}

	/// Stores a message for the order's customer. Orders without a customer
	/// produce nothing.
	pub async fn notify(
		&self,
		order: &Order,
		message: String,
	) -> Result<Option<Notification>, CafeError> {
		let Some(user_id) = order.user_id else {
			return Ok(None);
		};
		let created_at = self.clock.now();
		let notification = self
			.storage
			.insert(|id| Notification {
				id,
				user_id,
				order_id: order.id,
				message,
				read: false,
				created_at,
			})
			.await?;
		tracing::debug!(
			notification_id = notification.id,
			user_id,
			order_id = order.id,
			"Notification stored"
		);
		Ok(Some(notification))
	}

	/// A user's notifications, newest first.
	pub async fn list_for_user(&self, user_id: EntityId) -> Result<Vec<Notification>, CafeError> {
		let mut notifications: Vec<Notification> = self
			.storage
			.list::<Notification>()
			.await?
			.into_iter()
			.filter(|n| n.user_id == user_id)
			.collect();
		notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
		Ok(notifications)
	}

	/// Marks a notification read. Unknown IDs are ignored.
	pub async fn mark_read(&self, id: EntityId) -> Result<Option<Notification>, CafeError> {
		Ok(self
			.storage
			.update::<Notification, _>(id, |n| n.read = true)
			.await?)
	}
}
