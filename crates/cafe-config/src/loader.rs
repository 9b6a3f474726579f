//! Loader for configurations split across several files.
//!
//! A root file may name other files with `include = [...]`. Every top-level
//! section (`cafe`, `menu`, `storage`, `api`) may appear in exactly one file.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Reads a root configuration file and merges its includes.
pub struct ConfigLoader {
	/// Directory relative includes are resolved against.
	base_path: PathBuf,
	/// Canonical paths already read, for cycle detection.
	visited: HashSet<PathBuf>,
	/// File each top-level section came from.
	section_sources: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			visited: HashSet::new(),
			section_sources: HashMap::new(),
		}
	}

	/// Loads the root file, merges every included file and validates the
	/// combined result.
	pub async fn load_config(&mut self, root: impl AsRef<Path>) -> Result<Config, ConfigError> {
		let root_path = self.resolve_path(root)?;
		let root_content = self.read_resolved(&root_path).await?;
		let mut root_toml: toml::Value = toml::from_str(&root_content)?;

		let includes = extract_includes(&root_toml)?;
		if includes.is_empty() {
			return root_content.parse();
		}

		if let Some(table) = root_toml.as_table_mut() {
			table.remove("include");
			for key in table.keys() {
				self.section_sources.insert(key.clone(), root_path.clone());
			}
		}

		for include in includes {
			let include_path = self.resolve_path(&include)?;
			let content = self.read_resolved(&include_path).await?;
			let include_toml: toml::Value = toml::from_str(&content)?;
			self.merge(&mut root_toml, include_toml, &include_path)?;
		}

		let combined = toml::to_string(&root_toml).map_err(|e| {
			ConfigError::Parse(format!("Failed to serialize combined config: {}", e))
		})?;
		combined.parse()
	}

	fn merge(
		&mut self,
		target: &mut toml::Value,
		source: toml::Value,
		source_path: &Path,
	) -> Result<(), ConfigError> {
		let toml::Value::Table(source_table) = source else {
			return Ok(());
		};
		let Some(target_table) = target.as_table_mut() else {
			return Ok(());
		};

		for (key, value) in source_table {
			if key == "include" {
				return Err(ConfigError::Validation(format!(
					"Nested include in {} is not supported",
					source_path.display()
				)));
			}
			if let Some(existing) = self.section_sources.get(&key) {
				return Err(ConfigError::Validation(format!(
					"Duplicate section '{}' found in {} and {}. \
					Each top-level section must be unique across all configuration files.",
					key,
					existing.display(),
					source_path.display()
				)));
			}
			self.section_sources
				.insert(key.clone(), source_path.to_path_buf());
			target_table.insert(key, value);
		}
		Ok(())
	}

	/// Reads a file once and substitutes environment variables.
	async fn read_resolved(&mut self, path: &Path) -> Result<String, ConfigError> {
		let canonical = tokio::fs::canonicalize(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Cannot resolve path {}: {}", path.display(), e),
			))
		})?;

		if !self.visited.insert(canonical.clone()) {
			return Err(ConfigError::Validation(format!(
				"Circular include detected: {} was already loaded",
				canonical.display()
			)));
		}

		let content = tokio::fs::read_to_string(path).await?;
		resolve_env_vars(&content)
	}

	fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
		let path = path.as_ref();
		let resolved = if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_path.join(path)
		};

		if !resolved.exists() {
			return Err(ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Configuration file not found: {}", resolved.display()),
			)));
		}
		Ok(resolved)
	}
}

/// Reads the `include` directive, accepting a string or an array of strings.
fn extract_includes(toml: &toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	match toml.get("include") {
		None => Ok(Vec::new()),
		Some(toml::Value::String(path)) => Ok(vec![PathBuf::from(path)]),
		Some(toml::Value::Array(items)) => items
			.iter()
			.map(|item| {
				item.as_str().map(PathBuf::from).ok_or_else(|| {
					ConfigError::Validation("Include array must contain only strings".into())
				})
			})
			.collect(),
		Some(_) => Err(ConfigError::Validation(
			"Include must be a string or array of strings".into(),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const CAFE: &str = r#"
[cafe]
name = "Harbour Cafe"
opening_time = "07:00"
closing_time = "19:00"
"#;

	const STORAGE: &str = r#"
[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[tokio::test]
	async fn test_single_file_config() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("cafe.toml");
		fs::write(&config_path, format!("{}{}", CAFE, STORAGE)).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let config = loader.load_config(&config_path).await.unwrap();

		assert_eq!(config.cafe.name, "Harbour Cafe");
		assert_eq!(config.cafe.opening_time, "07:00");
	}

	#[tokio::test]
	async fn test_config_with_includes() {
		let temp_dir = TempDir::new().unwrap();

		let main_config = format!("include = [\"menu.toml\", \"storage.toml\"]\n{}", CAFE);
		let menu_config = r#"
[[menu]]
name = "Espresso"
price = 250
category = "Beverages"

[[menu]]
name = "Bagel"
price = 300
category = "Breakfast"
available = false
"#;

		fs::write(temp_dir.path().join("main.toml"), main_config).unwrap();
		fs::write(temp_dir.path().join("menu.toml"), menu_config).unwrap();
		fs::write(temp_dir.path().join("storage.toml"), STORAGE).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let config = loader.load_config("main.toml").await.unwrap();

		assert_eq!(config.cafe.name, "Harbour Cafe");
		assert_eq!(config.storage.primary, "memory");
		assert_eq!(config.menu.len(), 2);
		assert!(!config.menu[1].available);
	}

	#[tokio::test]
	async fn test_single_string_include() {
		let temp_dir = TempDir::new().unwrap();
		let main_config = format!("include = \"storage.toml\"\n{}", CAFE);

		fs::write(temp_dir.path().join("main.toml"), main_config).unwrap();
		fs::write(temp_dir.path().join("storage.toml"), STORAGE).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let config = loader.load_config("main.toml").await.unwrap();
		assert_eq!(config.storage.primary, "memory");
	}

	#[tokio::test]
	async fn test_duplicate_section_error() {
		let temp_dir = TempDir::new().unwrap();

		let main_config = format!("include = [\"duplicate.toml\"]\n{}{}", CAFE, STORAGE);
		let duplicate_config = "[cafe]\nname = \"Other Cafe\"\n";

		fs::write(temp_dir.path().join("main.toml"), main_config).unwrap();
		fs::write(temp_dir.path().join("duplicate.toml"), duplicate_config).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let error_msg = loader
			.load_config("main.toml")
			.await
			.unwrap_err()
			.to_string();
		assert!(error_msg.contains("Duplicate section 'cafe'"));
	}

	#[tokio::test]
	async fn test_self_include_detection() {
		let temp_dir = TempDir::new().unwrap();
		let config = format!("include = [\"self.toml\"]\n{}", CAFE);
		fs::write(temp_dir.path().join("self.toml"), config).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let error_msg = loader
			.load_config("self.toml")
			.await
			.unwrap_err()
			.to_string();
		assert!(error_msg.contains("already loaded"));
	}

	#[tokio::test]
	async fn test_missing_include_reported() {
		let temp_dir = TempDir::new().unwrap();
		let config = format!("include = [\"absent.toml\"]\n{}", CAFE);
		fs::write(temp_dir.path().join("main.toml"), config).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let error_msg = loader
			.load_config("main.toml")
			.await
			.unwrap_err()
			.to_string();
		assert!(error_msg.contains("Configuration file not found"));
	}

	#[tokio::test]
	async fn test_from_file_uses_parent_directory() {
		let temp_dir = TempDir::new().unwrap();
		let nested = temp_dir.path().join("config");
		fs::create_dir(&nested).unwrap();
		fs::write(
			nested.join("main.toml"),
			format!("include = [\"storage.toml\"]\n{}", CAFE),
		)
		.unwrap();
		fs::write(nested.join("storage.toml"), STORAGE).unwrap();

		let path = nested.join("main.toml");
		let config = Config::from_file(path.to_str().unwrap()).await.unwrap();
		assert_eq!(config.cafe.closing_time, "19:00");
	}
}
