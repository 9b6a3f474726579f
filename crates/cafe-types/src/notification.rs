//! Customer notification types.

use crate::{Entity, EntityId, StorageKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message telling a customer that their order changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
	pub id: EntityId,
	pub user_id: EntityId,
	pub order_id: EntityId,
	pub message: String,
	pub read: bool,
	pub created_at: DateTime<Utc>,
}

impl Entity for Notification {
	const KEY: StorageKey = StorageKey::Notifications;

	fn id(&self) -> EntityId {
		self.id
	}
}
