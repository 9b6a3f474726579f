//! File-based storage backend.
//!
//! Each entity is a JSON file at `<storage_path>/<namespace>/<id>.json`.
//! Writes go to a temporary file that is then renamed over the target, so a
//! reader never sees a half-written entity. Each namespace keeps its last
//! handed-out ID in a `.sequence` file.

use crate::{split_key, StorageError, StorageInterface};
use async_trait::async_trait;
use cafe_types::{
	ConfigSchema, EntityId, Field, FieldType, ImplementationRegistry, Schema, ValidationError,
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

const SEQUENCE_FILE: &str = ".sequence";
const DEFAULT_STORAGE_PATH: &str = "./data/storage";

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
	/// Serializes sequence file updates.
	sequence_lock: Mutex<()>,
}

impl FileStorage {
	/// Creates a new FileStorage instance rooted at `base_path`.
	pub fn new(base_path: PathBuf) -> Self {
		Self {
			base_path,
			sequence_lock: Mutex::new(()),
		}
	}

	fn namespace_dir(&self, namespace: &str) -> Result<PathBuf, StorageError> {
		if namespace.is_empty()
			|| !namespace
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '_')
		{
			return Err(StorageError::Backend(format!(
				"invalid namespace '{}'",
				namespace
			)));
		}
		Ok(self.base_path.join(namespace))
	}

	/// Maps `namespace:id` to its file path.
	fn file_path(&self, key: &str) -> Result<PathBuf, StorageError> {
		let (namespace, id) = split_key(key)?;
		if !id.chars().all(|c| c.is_ascii_digit()) {
			return Err(StorageError::Backend(format!(
				"invalid entity id in key '{}'",
				key
			)));
		}
		Ok(self.namespace_dir(namespace)?.join(format!("{}.json", id)))
	}

	/// Highest ID among the entity files of a namespace directory.
	async fn max_existing_id(dir: &Path) -> Result<EntityId, StorageError> {
		let mut entries = match fs::read_dir(dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut max = 0;
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("json")) {
				continue;
			}
			if let Some(id) = path
				.file_stem()
				.and_then(|stem| stem.to_str())
				.and_then(|stem| stem.parse::<EntityId>().ok())
			{
				max = max.max(id);
			}
		}
		Ok(max)
	}
}

async fn write_atomically(path: &Path, data: &[u8]) -> Result<(), StorageError> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
	}

	let temp_path = path.with_extension("tmp");
	fs::write(&temp_path, data)
		.await
		.map_err(|e| StorageError::Backend(e.to_string()))?;
	fs::rename(&temp_path, path)
		.await
		.map_err(|e| StorageError::Backend(e.to_string()))
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.file_path(key)?;
		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.file_path(key)?;
		write_atomically(&path, &value).await
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.file_path(key)?;
		fs::try_exists(&path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn list_bytes(&self, namespace: &str) -> Result<Vec<Vec<u8>>, StorageError> {
		let dir = self.namespace_dir(namespace)?;
		let mut entries = match fs::read_dir(&dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut values = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("json")) {
				continue;
			}
			match fs::read(&path).await {
				Ok(data) => values.push(data),
				// Removed between read_dir and read
				Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
					tracing::debug!("Skipping file {:?}: removed during listing", path);
				},
				Err(e) => return Err(StorageError::Backend(e.to_string())),
			}
		}
		Ok(values)
	}

	async fn next_id(&self, namespace: &str) -> Result<EntityId, StorageError> {
		let dir = self.namespace_dir(namespace)?;
		let sequence_path = dir.join(SEQUENCE_FILE);
		let _guard = self.sequence_lock.lock().await;

		let last = match fs::read_to_string(&sequence_path).await {
			Ok(content) => content.trim().parse::<EntityId>().map_err(|e| {
				StorageError::Backend(format!(
					"corrupt sequence file {}: {}",
					sequence_path.display(),
					e
				))
			})?,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				let recovered = Self::max_existing_id(&dir).await?;
				if recovered > 0 {
					tracing::warn!(
						namespace = %namespace,
						last_id = recovered,
						"Sequence file missing, continuing after highest stored id"
					);
				}
				recovered
			},
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let next = last + 1;
		write_atomically(&sequence_path, next.to_string().as_bytes()).await?;
		Ok(next)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("storage_path", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(path) if !path.trim().is_empty() => Ok(()),
						_ => Err("storage_path cannot be empty".to_string()),
					}
				}),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for entity files (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_STORAGE_PATH);

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::StorageService;
	use cafe_types::{Notification, StorageKey};
	use tempfile::TempDir;

	fn notification(id: u64, user_id: u64) -> Notification {
		Notification {
			id,
			user_id,
			order_id: 1,
			message: "Your order is ready".to_string(),
			read: false,
			created_at: Default::default(),
		}
	}

	#[tokio::test]
	async fn test_basic_operations() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::new(temp_dir.path().to_path_buf());

		storage.set_bytes("orders:1", b"{}".to_vec()).await.unwrap();
		assert!(temp_dir.path().join("orders").join("1.json").exists());
		assert_eq!(storage.get_bytes("orders:1").await.unwrap(), b"{}".to_vec());
		assert!(storage.exists("orders:1").await.unwrap());
		assert!(!storage.exists("orders:2").await.unwrap());
		assert!(matches!(
			storage.get_bytes("orders:2").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_rejects_path_like_keys() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::new(temp_dir.path().to_path_buf());

		assert!(storage.set_bytes("../etc:1", b"x".to_vec()).await.is_err());
		assert!(storage.set_bytes("orders:../1", b"x".to_vec()).await.is_err());
	}

	#[tokio::test]
	async fn test_list_skips_sequence_file() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::new(temp_dir.path().to_path_buf());

		assert!(storage.list_bytes("users").await.unwrap().is_empty());
		let id = storage.next_id("users").await.unwrap();
		storage
			.set_bytes(&StorageKey::Users.entity_key(id), b"{}".to_vec())
			.await
			.unwrap();
		assert_eq!(storage.list_bytes("users").await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_sequence_survives_restart() {
		let temp_dir = TempDir::new().unwrap();
		{
			let storage = FileStorage::new(temp_dir.path().to_path_buf());
			assert_eq!(storage.next_id("orders").await.unwrap(), 1);
			assert_eq!(storage.next_id("orders").await.unwrap(), 2);
		}
		let storage = FileStorage::new(temp_dir.path().to_path_buf());
		assert_eq!(storage.next_id("orders").await.unwrap(), 3);
		assert_eq!(storage.next_id("payments").await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_missing_sequence_recovers_from_files() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::new(temp_dir.path().to_path_buf());
		storage.set_bytes("orders:7", b"{}".to_vec()).await.unwrap();

		assert_eq!(storage.next_id("orders").await.unwrap(), 8);
	}

	#[tokio::test]
	async fn test_service_round_trip_on_disk() {
		let temp_dir = TempDir::new().unwrap();
		let service = StorageService::new(Box::new(FileStorage::new(
			temp_dir.path().to_path_buf(),
		)));

		service
			.insert(|id| notification(id, 4))
			.await
			.unwrap();
		service
			.insert(|id| notification(id, 5))
			.await
			.unwrap();

		let reopened = StorageService::new(Box::new(FileStorage::new(
			temp_dir.path().to_path_buf(),
		)));
		let all = reopened.list::<Notification>().await.unwrap();
		assert_eq!(all.len(), 2);
		assert_eq!(all[1].user_id, 5);
	}

	#[test]
	fn test_schema() {
		let schema = FileStorageSchema;
		let ok: toml::Value = toml::from_str("storage_path = \"./data\"").unwrap();
		assert!(schema.validate(&ok).is_ok());

		let empty: toml::Value = toml::from_str("storage_path = \"  \"").unwrap();
		assert!(schema.validate(&empty).is_err());

		let ttl: toml::Value = toml::from_str("ttl_orders = 60").unwrap();
		assert!(schema.validate(&ttl).is_err());
	}
}
