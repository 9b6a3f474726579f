//! Menu catalogue handler.

use crate::CafeError;
use cafe_storage::StorageService;
use cafe_types::{EntityId, MenuItem, MenuItemSeed};
use std::sync::Arc;

/// Handler for menu items.
pub struct MenuHandler {
	storage: Arc<StorageService>,
}

impl MenuHandler {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// All menu items, including unavailable ones, in ID order.
	pub async fn list(&self) -> Result<Vec<MenuItem>, CafeError> {
		Ok(self.storage.list::<MenuItem>().await?)
	}

	pub async fn get(&self, id: EntityId) -> Result<MenuItem, CafeError> {
		self.storage
			.find::<MenuItem>(id)
			.await?
			.ok_or_else(|| CafeError::not_found("Menu item", id))
	}

	pub async fn find(&self, id: EntityId) -> Result<Option<MenuItem>, CafeError> {
		Ok(self.storage.find::<MenuItem>(id).await?)
	}

	/// Switches an item on or off. Unknown IDs are ignored.
	pub async fn set_availability(
		&self,
		id: EntityId,
		available: bool,
	) -> Result<Option<MenuItem>, CafeError> {
		let updated = self
			.storage
			.update::<MenuItem, _>(id, |item| item.available = available)
			.await?;
		match &updated {
			Some(item) => {
				tracing::info!(menu_item_id = item.id, available, "Menu item availability set")
			},
			None => tracing::debug!(menu_item_id = id, "Availability change for unknown item"),
		}
		Ok(updated)
	}

	/// Inserts the seeds when the catalogue is empty. Returns how many items
	/// were created.
	pub async fn seed(&self, seeds: Vec<MenuItemSeed>) -> Result<usize, CafeError> {
		if self.storage.count::<MenuItem>().await? > 0 {
			return Ok(0);
		}
		let count = seeds.len();
		for seed in seeds {
			self.storage.insert(|id| seed.into_item(id)).await?;
		}
		Ok(count)
	}
}
