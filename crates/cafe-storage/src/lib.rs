//! Storage module for the café backend.
//!
//! This module provides the entity store behind users, menu items, orders,
//! payments and notifications. Backends implement a small byte-oriented
//! key-value interface with per-namespace ID sequences; [`StorageService`]
//! layers typed, JSON-encoded entity operations on top of it.

use async_trait::async_trait;
use cafe_types::{ConfigSchema, Entity, EntityId, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// Keys have the form `namespace:id`. Values are opaque bytes.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, replacing any previous value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Returns every value stored in a namespace, in no particular order.
	async fn list_bytes(&self, namespace: &str) -> Result<Vec<Vec<u8>>, StorageError>;

	/// Reserves the next identifier of a namespace.
	///
	/// Sequences start at 1 and never hand out the same value twice.
	async fn next_id(&self, namespace: &str) -> Result<EntityId, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Typed entity store over a storage backend.
///
/// Entities are JSON-encoded and addressed by their [`Entity::KEY`]
/// namespace plus numeric ID. The service does no locking of its own;
/// callers that need read-modify-write atomicity serialize their writes.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Assigns the next ID of `T`'s namespace, builds the entity with it and
	/// stores it.
	pub async fn insert<T, F>(&self, build: F) -> Result<T, StorageError>
	where
		T: Entity,
		F: FnOnce(EntityId) -> T,
	{
		let id = self.backend.next_id(T::KEY.as_str()).await?;
		let entity = build(id);
		self.save(&entity).await?;
		Ok(entity)
	}

	/// Writes an entity under its own ID, replacing any previous version.
	pub async fn save<T: Entity>(&self, entity: &T) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(entity).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend
			.set_bytes(&T::KEY.entity_key(entity.id()), bytes)
			.await
	}

	/// Retrieves an entity, failing with [`StorageError::NotFound`] when absent.
	pub async fn get<T: Entity>(&self, id: EntityId) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&T::KEY.entity_key(id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Retrieves an entity if it exists.
	pub async fn find<T: Entity>(&self, id: EntityId) -> Result<Option<T>, StorageError> {
		match self.get(id).await {
			Ok(entity) => Ok(Some(entity)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Lists every entity of a type, ordered by ascending ID.
	pub async fn list<T: Entity>(&self) -> Result<Vec<T>, StorageError> {
		let mut entities = self
			.backend
			.list_bytes(T::KEY.as_str())
			.await?
			.iter()
			.map(|bytes| {
				serde_json::from_slice::<T>(bytes)
					.map_err(|e| StorageError::Serialization(e.to_string()))
			})
			.collect::<Result<Vec<T>, _>>()?;
		entities.sort_by_key(|entity| entity.id());
		Ok(entities)
	}

	/// Returns the lowest-ID entity matching a predicate.
	pub async fn find_first<T, P>(&self, predicate: P) -> Result<Option<T>, StorageError>
	where
		T: Entity,
		P: Fn(&T) -> bool,
	{
		Ok(self.list::<T>().await?.into_iter().find(|e| predicate(e)))
	}

	/// Applies a mutation to a stored entity and writes it back.
	///
	/// Returns `None` when the entity does not exist. A mutation that changes
	/// the entity's ID is rejected and nothing is written.
	pub async fn update<T, F>(&self, id: EntityId, mutate: F) -> Result<Option<T>, StorageError>
	where
		T: Entity,
		F: FnOnce(&mut T),
	{
		let Some(mut entity) = self.find::<T>(id).await? else {
			return Ok(None);
		};
		mutate(&mut entity);
		if entity.id() != id {
			return Err(StorageError::Backend(format!(
				"update of {} changed its id to {}",
				T::KEY.entity_key(id),
				entity.id()
			)));
		}
		self.save(&entity).await?;
		Ok(Some(entity))
	}

	/// Checks if an entity exists.
	pub async fn exists<T: Entity>(&self, id: EntityId) -> Result<bool, StorageError> {
		self.backend.exists(&T::KEY.entity_key(id)).await
	}

	/// Counts the entities of a type.
	pub async fn count<T: Entity>(&self) -> Result<usize, StorageError> {
		Ok(self.backend.list_bytes(T::KEY.as_str()).await?.len())
	}
}

/// Splits a `namespace:id` key.
pub(crate) fn split_key(key: &str) -> Result<(&str, &str), StorageError> {
	match key.split_once(':') {
		Some((namespace, id)) if !namespace.is_empty() && !id.is_empty() => Ok((namespace, id)),
		_ => Err(StorageError::Backend(format!(
			"malformed storage key '{}', expected namespace:id",
			key
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use cafe_types::{MenuItem, StorageKey};
	use implementations::memory::MemoryStorage;

	fn item(id: EntityId, name: &str) -> MenuItem {
		MenuItem {
			id,
			name: name.to_string(),
			description: String::new(),
			price: 300,
			category: "Pastries".to_string(),
			image_url: String::new(),
			available: true,
		}
	}

	fn service() -> StorageService {
		StorageService::new(Box::new(MemoryStorage::new()))
	}

	#[tokio::test]
	async fn test_insert_assigns_sequential_ids() {
		let storage = service();
		let first = storage.insert(|id| item(id, "Scone")).await.unwrap();
		let second = storage.insert(|id| item(id, "Muffin")).await.unwrap();

		assert_eq!(first.id, 1);
		assert_eq!(second.id, 2);
		assert_eq!(storage.get::<MenuItem>(2).await.unwrap().name, "Muffin");
	}

	#[tokio::test]
	async fn test_get_missing_is_not_found() {
		let storage = service();
		assert!(matches!(
			storage.get::<MenuItem>(42).await,
			Err(StorageError::NotFound)
		));
		assert!(storage.find::<MenuItem>(42).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_list_is_ordered_by_id() {
		let storage = service();
		for name in ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K"] {
			storage.insert(|id| item(id, name)).await.unwrap();
		}
		let ids: Vec<_> = storage
			.list::<MenuItem>()
			.await
			.unwrap()
			.iter()
			.map(|i| i.id)
			.collect();
		assert_eq!(ids, (1..=11).collect::<Vec<_>>());
		assert_eq!(storage.count::<MenuItem>().await.unwrap(), 11);
	}

	#[tokio::test]
	async fn test_update_applies_mutation() {
		let storage = service();
		storage.insert(|id| item(id, "Scone")).await.unwrap();

		let updated = storage
			.update::<MenuItem, _>(1, |i| i.available = false)
			.await
			.unwrap()
			.unwrap();
		assert!(!updated.available);
		assert!(!storage.get::<MenuItem>(1).await.unwrap().available);

		let missing = storage
			.update::<MenuItem, _>(5, |i| i.available = false)
			.await
			.unwrap();
		assert!(missing.is_none());
	}

	#[tokio::test]
	async fn test_update_cannot_change_id() {
		let storage = service();
		storage.insert(|id| item(id, "Scone")).await.unwrap();
		let result = storage.update::<MenuItem, _>(1, |i| i.id = 9).await;
		assert!(matches!(result, Err(StorageError::Backend(_))));
		assert!(!storage.exists::<MenuItem>(9).await.unwrap());
	}

	#[tokio::test]
	async fn test_find_first_returns_lowest_match() {
		let storage = service();
		storage.insert(|id| item(id, "Latte")).await.unwrap();
		storage.insert(|id| item(id, "Mocha")).await.unwrap();
		storage.insert(|id| item(id, "Mocha")).await.unwrap();

		let found = storage
			.find_first::<MenuItem, _>(|i| i.name == "Mocha")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(found.id, 2);
	}

	#[test]
	fn test_split_key() {
		assert_eq!(
			split_key(&StorageKey::Orders.entity_key(3)).unwrap(),
			("orders", "3")
		);
		assert!(split_key("orders").is_err());
		assert!(split_key(":3").is_err());
	}
}
