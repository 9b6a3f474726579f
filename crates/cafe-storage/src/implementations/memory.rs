//! In-memory storage backend.
//!
//! Holds every entity in a map behind a read-write lock. Nothing survives a
//! restart, which makes it the default for development and tests.

use crate::{split_key, StorageError, StorageInterface};
use async_trait::async_trait;
use cafe_types::{ConfigSchema, EntityId, ImplementationRegistry, Schema, ValidationError};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
	values: HashMap<String, Vec<u8>>,
	/// Last ID handed out per namespace.
	sequences: HashMap<String, EntityId>,
}

/// In-memory storage implementation.
pub struct MemoryStorage {
	state: RwLock<MemoryState>,
}

impl MemoryStorage {
	/// Creates a new MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			state: RwLock::new(MemoryState::default()),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let state = self.state.read().await;
		state.values.get(key).cloned().ok_or(StorageError::NotFound)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		split_key(key)?;
		let mut state = self.state.write().await;
		state.values.insert(key.to_string(), value);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let state = self.state.read().await;
		Ok(state.values.contains_key(key))
	}

	async fn list_bytes(&self, namespace: &str) -> Result<Vec<Vec<u8>>, StorageError> {
		let prefix = format!("{}:", namespace);
		let state = self.state.read().await;
		Ok(state
			.values
			.iter()
			.filter(|(key, _)| key.starts_with(&prefix))
			.map(|(_, value)| value.clone())
			.collect())
	}

	async fn next_id(&self, namespace: &str) -> Result<EntityId, StorageError> {
		let mut state = self.state.write().await;
		let sequence = state.sequences.entry(namespace.to_string()).or_insert(0);
		*sequence += 1;
		Ok(*sequence)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStorageSchema)
	}
}

/// Configuration schema for MemoryStorage.
pub struct MemoryStorageSchema;

impl ConfigSchema for MemoryStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// No settings; any key is a typo
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Factory function to create a memory storage backend from configuration.
pub fn create_storage(_config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	Ok(Box::new(MemoryStorage::new()))
}

/// Registry for the memory storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}
