//! Storage-related types for the café backend.

use serde::{de::DeserializeOwned, Serialize};
use std::str::FromStr;

/// Identifier type shared by every stored entity.
pub type EntityId = u64;

/// Storage namespaces for the different entity collections.
///
/// Each variant owns its own ID sequence, so a user and an order may both
/// carry ID 1 without conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Registered customers and staff
	Users,
	/// Menu catalogue
	MenuItems,
	/// Pickup orders
	Orders,
	/// Recorded prepayments
	Payments,
	/// Customer notifications
	Notifications,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Users => "users",
			StorageKey::MenuItems => "menu_items",
			StorageKey::Orders => "orders",
			StorageKey::Payments => "payments",
			StorageKey::Notifications => "notifications",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Users,
			Self::MenuItems,
			Self::Orders,
			Self::Payments,
			Self::Notifications,
		]
		.into_iter()
	}

	/// Builds the backend key for a single entity, e.g. `orders:42`.
	pub fn entity_key(&self, id: EntityId) -> String {
		format!("{}:{}", self.as_str(), id)
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"users" => Ok(Self::Users),
			"menu_items" => Ok(Self::MenuItems),
			"orders" => Ok(Self::Orders),
			"payments" => Ok(Self::Payments),
			"notifications" => Ok(Self::Notifications),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}

/// Contract for values kept in the entity store.
///
/// The store uses `KEY` to pick the namespace and ID sequence, and `id()` to
/// order listings.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
	/// Namespace this entity lives in.
	const KEY: StorageKey;

	/// Identifier assigned at insertion.
	fn id(&self) -> EntityId;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_storage_key_round_trips_through_str() {
		for key in StorageKey::all() {
			assert_eq!(key.as_str().parse::<StorageKey>(), Ok(key));
		}
		assert!("quotes".parse::<StorageKey>().is_err());
	}

	#[test]
	fn test_entity_key_format() {
		assert_eq!(StorageKey::MenuItems.entity_key(7), "menu_items:7");
	}
}
