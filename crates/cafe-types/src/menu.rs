//! Menu catalogue types.

use crate::{Entity, EntityId, StorageKey};
use serde::{Deserialize, Serialize};

/// An item customers can order.
///
/// Prices are integers in the minor currency unit. Only `available` changes
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
	pub id: EntityId,
	pub name: String,
	pub description: String,
	pub price: u64,
	pub category: String,
	pub image_url: String,
	pub available: bool,
}

impl Entity for MenuItem {
	const KEY: StorageKey = StorageKey::MenuItems;

	fn id(&self) -> EntityId {
		self.id
	}
}

/// Definition of a menu item before it has been assigned an identifier.
///
/// Used for seeding the catalogue from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct MenuItemSeed {
	pub name: String,
	#[serde(default)]
	pub description: String,
	pub price: u64,
	pub category: String,
	#[serde(default)]
	pub image_url: String,
	#[serde(default = "default_available")]
	pub available: bool,
}

fn default_available() -> bool {
	true
}

impl MenuItemSeed {
	/// Materializes the seed into a stored item with the given identifier.
	pub fn into_item(self, id: EntityId) -> MenuItem {
		MenuItem {
			id,
			name: self.name,
			description: self.description,
			price: self.price,
			category: self.category,
			image_url: self.image_url,
			available: self.available,
		}
	}
}
