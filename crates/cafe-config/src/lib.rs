//! Configuration module for the café backend.
//!
//! This module provides structures and utilities for managing the service
//! configuration. It supports loading configuration from TOML files and
//! validates business hours, prepayment settings, seed data and storage
//! selection before anything is built from it.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["menu.toml", "storage.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

use cafe_types::{parse_clock_time, MenuItemSeed, Role};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Business settings of the café.
	pub cafe: CafeConfig,
	/// Menu items seeded into an empty store. The built-in sample menu is
	/// used when this list is empty.
	#[serde(default)]
	pub menu: Vec<MenuItemSeed>,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Business settings of the café.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CafeConfig {
	/// Display name used in logs.
	pub name: String,
	/// Opening time, `HH:MM`. Defaults to 10:00.
	#[serde(default = "default_opening_time")]
	pub opening_time: String,
	/// Closing time, `HH:MM`; the latest accepted pickup. Defaults to 22:00.
	#[serde(default = "default_closing_time")]
	pub closing_time: String,
	/// Minimum minutes between placing an order and picking it up.
	#[serde(default = "default_min_lead_minutes")]
	pub min_lead_minutes: u32,
	/// Share of the total taken as prepayment, in percent.
	#[serde(default = "default_prepayment_percent")]
	pub prepayment_percent: u8,
	/// Offset of the café's local time from UTC, in minutes.
	#[serde(default)]
	pub utc_offset_minutes: i32,
	/// Staff accounts created at startup.
	#[serde(default)]
	pub staff: Vec<StaffConfig>,
}

/// A staff account seeded at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaffConfig {
	pub name: String,
	pub phone: String,
	#[serde(default = "default_staff_role")]
	pub role: Role,
}

fn default_opening_time() -> String {
	"10:00".to_string()
}

fn default_closing_time() -> String {
	"22:00".to_string()
}

fn default_min_lead_minutes() -> u32 {
	30
}

fn default_prepayment_percent() -> u8 {
	50
}

fn default_staff_role() -> Role {
	Role::Staff
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
	/// Maximum request size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
	/// CORS configuration. Permissive when absent.
	pub cors: Option<CorsConfig>,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
	/// Allowed origins for CORS.
	pub allowed_origins: Vec<String>,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

fn default_api_timeout() -> u64 {
	30
}

fn default_max_request_size() -> usize {
	64 * 1024
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving includes and environment
	/// variables.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Validates the configuration.
	///
	/// Checks business hours, prepayment bounds, staff and menu seeds, the
	/// storage selection and the API section.
	fn validate(&self) -> Result<(), ConfigError> {
		self.validate_cafe()?;
		self.validate_menu()?;

		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		if let Some(ref api) = self.api {
			if api.enabled {
				if api.timeout_seconds == 0 {
					return Err(ConfigError::Validation(
						"API timeout_seconds must be greater than 0".into(),
					));
				}
				if api.max_request_size == 0 {
					return Err(ConfigError::Validation(
						"API max_request_size must be greater than 0".into(),
					));
				}
			}
		}

		Ok(())
	}

	fn validate_cafe(&self) -> Result<(), ConfigError> {
		let cafe = &self.cafe;
		if cafe.name.trim().is_empty() {
			return Err(ConfigError::Validation("Cafe name cannot be empty".into()));
		}

		let opening = parse_clock_time(&cafe.opening_time).ok_or_else(|| {
			ConfigError::Validation(format!(
				"opening_time '{}' is not a valid HH:MM time",
				cafe.opening_time
			))
		})?;
		let closing = parse_clock_time(&cafe.closing_time).ok_or_else(|| {
			ConfigError::Validation(format!(
				"closing_time '{}' is not a valid HH:MM time",
				cafe.closing_time
			))
		})?;
		if opening >= closing {
			return Err(ConfigError::Validation(format!(
				"opening_time {} must be earlier than closing_time {}",
				cafe.opening_time, cafe.closing_time
			)));
		}

		if cafe.min_lead_minutes > 12 * 60 {
			return Err(ConfigError::Validation(
				"min_lead_minutes cannot exceed 720 (12 hours)".into(),
			));
		}
		if cafe.prepayment_percent == 0 || cafe.prepayment_percent > 100 {
			return Err(ConfigError::Validation(
				"prepayment_percent must be between 1 and 100".into(),
			));
		}
		if cafe.utc_offset_minutes.abs() > 14 * 60 {
			return Err(ConfigError::Validation(
				"utc_offset_minutes must be within +/-840".into(),
			));
		}

		let mut phones = HashSet::new();
		for staff in &cafe.staff {
			if staff.name.trim().is_empty() || staff.phone.trim().is_empty() {
				return Err(ConfigError::Validation(
					"Staff entries need a name and a phone".into(),
				));
			}
			if !phones.insert(staff.phone.trim()) {
				return Err(ConfigError::Validation(format!(
					"Duplicate staff phone '{}'",
					staff.phone
				)));
			}
		}

		Ok(())
	}

	fn validate_menu(&self) -> Result<(), ConfigError> {
		for (index, item) in self.menu.iter().enumerate() {
			if item.name.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Menu entry {} has an empty name",
					index
				)));
			}
			if item.category.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Menu item '{}' has an empty category",
					item.name
				)));
			}
			if item.price == 0 {
				return Err(ConfigError::Validation(format!(
					"Menu item '{}' must have a positive price",
					item.name
				)));
			}
		}
		Ok(())
	}

	/// Minimal valid configuration: default business hours, memory storage,
	/// no API section.
	#[cfg(any(test, feature = "testing"))]
	pub fn for_tests() -> Self {
		let mut implementations = HashMap::new();
		implementations.insert(
			"memory".to_string(),
			toml::Value::Table(toml::map::Map::new()),
		);
		Self {
			cafe: CafeConfig {
				name: "Test Cafe".to_string(),
				opening_time: default_opening_time(),
				closing_time: default_closing_time(),
				min_lead_minutes: default_min_lead_minutes(),
				prepayment_percent: default_prepayment_percent(),
				utc_offset_minutes: 0,
				staff: Vec::new(),
			},
			menu: Vec::new(),
			storage: StorageConfig {
				primary: "memory".to_string(),
				implementations,
			},
			api: None,
		}
	}
}

/// Parses configuration from a TOML string, resolving environment variables
/// and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE: &str = r#"
[cafe]
name = "Corner Cafe"

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[test]
	fn test_defaults_applied() {
		let config: Config = BASE.parse().unwrap();
		assert_eq!(config.cafe.opening_time, "10:00");
		assert_eq!(config.cafe.closing_time, "22:00");
		assert_eq!(config.cafe.min_lead_minutes, 30);
		assert_eq!(config.cafe.prepayment_percent, 50);
		assert!(config.menu.is_empty());
		assert!(config.api.is_none());
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_CAFE_HOST", "localhost");
		std::env::set_var("TEST_CAFE_PORT", "5432");

		let input = "host = \"${TEST_CAFE_HOST}:${TEST_CAFE_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("TEST_CAFE_HOST");
		std::env::remove_var("TEST_CAFE_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_CAFE_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_CAFE_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.unwrap_err().to_string().contains("MISSING_CAFE_VAR"));
	}

	#[test]
	fn test_full_config_with_env_vars() {
		std::env::set_var("TEST_CAFE_NAME", "Env Cafe");

		let config_str = r#"
[cafe]
name = "${TEST_CAFE_NAME}"
opening_time = "08:30"
closing_time = "20:00"
min_lead_minutes = 15
prepayment_percent = 30
utc_offset_minutes = 180

[[cafe.staff]]
name = "Kitchen"
phone = "555-0001"

[[cafe.staff]]
name = "Owner"
phone = "555-0002"
role = "admin"

[[menu]]
name = "Flat White"
price = 400
category = "Beverages"

[storage]
primary = "file"
[storage.implementations.file]
storage_path = "./data"

[api]
enabled = true
port = 8080
"#;

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.cafe.name, "Env Cafe");
		assert_eq!(config.cafe.staff.len(), 2);
		assert_eq!(config.cafe.staff[0].role, Role::Staff);
		assert_eq!(config.cafe.staff[1].role, Role::Admin);
		assert_eq!(config.menu[0].name, "Flat White");
		assert!(config.menu[0].available);
		assert_eq!(config.api.as_ref().map(|a| a.port), Some(8080));
		assert_eq!(config.api.as_ref().map(|a| a.host.as_str()), Some("127.0.0.1"));

		std::env::remove_var("TEST_CAFE_NAME");
	}

	#[test]
	fn test_inverted_business_hours_rejected() {
		let config_str = BASE.replace(
			"name = \"Corner Cafe\"",
			"name = \"Corner Cafe\"\nopening_time = \"22:00\"\nclosing_time = \"10:00\"",
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("must be earlier than closing_time"));
	}

	#[test]
	fn test_malformed_time_rejected() {
		let config_str = BASE.replace(
			"name = \"Corner Cafe\"",
			"name = \"Corner Cafe\"\nopening_time = \"10am\"",
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("opening_time '10am'"));
	}

	#[test]
	fn test_prepayment_out_of_range_rejected() {
		let config_str = BASE.replace(
			"name = \"Corner Cafe\"",
			"name = \"Corner Cafe\"\nprepayment_percent = 0",
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("prepayment_percent"));
	}

	#[test]
	fn test_duplicate_staff_phone_rejected() {
		let config_str = format!(
			"{}\n[[cafe.staff]]\nname = \"A\"\nphone = \"1\"\n[[cafe.staff]]\nname = \"B\"\nphone = \"1\"\n",
			BASE
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("Duplicate staff phone '1'"));
	}

	#[test]
	fn test_zero_price_menu_item_rejected() {
		let config_str =
			format!("{}\n[[menu]]\nname = \"Water\"\nprice = 0\ncategory = \"Beverages\"\n", BASE);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("'Water' must have a positive price"));
	}

	#[test]
	fn test_unknown_primary_storage_rejected() {
		let config_str = BASE.replace("primary = \"memory\"", "primary = \"redis\"");
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err
			.to_string()
			.contains("Primary storage 'redis' not found in implementations"));
	}
}
