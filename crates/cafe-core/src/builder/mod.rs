//! Builder for constructing café engines.
//!
//! Resolves the configured storage backend through a name-to-factory map,
//! validates its settings against the backend's schema, and initializes the
//! engine (menu and staff seeding) before handing it out.

use crate::clock::{Clock, SystemClock};
use crate::engine::CafeEngine;
use cafe_config::Config;
use cafe_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Initialization error: {0}")]
	Initialization(String),
}

/// Factory functions for the pluggable parts of the engine.
pub struct CafeFactories<SF> {
	pub storage_factories: HashMap<String, SF>,
}

/// Builder for constructing a CafeEngine with a pluggable storage backend.
pub struct CafeBuilder {
	config: Config,
	clock: Arc<dyn Clock>,
}

impl CafeBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			clock: Arc::new(SystemClock),
		}
	}

	/// Replaces the wall clock, e.g. with a fixed clock in tests.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	/// Builds and initializes the engine.
	pub async fn build<SF>(self, factories: CafeFactories<SF>) -> Result<CafeEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		let primary = &self.config.storage.primary;
		let settings = self.config.storage.implementations.get(primary).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary storage '{}' has no configuration",
				primary
			))
		})?;
		let factory = factories.storage_factories.get(primary).ok_or_else(|| {
			BuilderError::Config(format!("Unknown storage implementation '{}'", primary))
		})?;

		let backend = match factory(settings) {
			Ok(backend) => backend,
			Err(e) => {
				tracing::error!(
					component = "storage",
					implementation = %primary,
					error = %e,
					"Failed to create storage implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create storage implementation '{}': {}",
					primary, e
				)));
			},
		};
		backend.config_schema().validate(settings).map_err(|e| {
			BuilderError::Config(format!("Invalid settings for storage '{}': {}", primary, e))
		})?;
		tracing::info!(component = "storage", implementation = %primary, "Loaded");

		for name in self.config.storage.implementations.keys() {
			if name != primary {
				tracing::debug!(component = "storage", implementation = %name, "Configured but not primary");
			}
		}

		let storage = Arc::new(StorageService::new(backend));
		let engine = CafeEngine::new(self.config, storage, self.clock)
			.map_err(|e| BuilderError::Config(e.to_string()))?;
		engine
			.initialize()
			.await
			.map_err(|e| BuilderError::Initialization(e.to_string()))?;
		Ok(engine)
	}
}
