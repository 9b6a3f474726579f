//! Main entry point for the café order service.
//!
//! Loads the configuration, builds the engine on the configured storage
//! backend and serves the HTTP API until interrupted.

use cafe_config::Config;
use cafe_core::{CafeBuilder, CafeEngine, CafeFactories};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod auth;
mod server;

use cafe_storage::implementations::file::create_storage as create_file_storage;
use cafe_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments for the café service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/cafe.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started cafe service");

	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Config path is not valid UTF-8: {}", args.config.display()))?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.cafe.name);

	let engine = Arc::new(build_engine(config.clone()).await?);

	match config.api.filter(|api| api.enabled) {
		Some(api_config) => {
			server::start_server(api_config, engine).await?;
		},
		None => {
			tracing::warn!("API server disabled; waiting for shutdown signal");
			tokio::signal::ctrl_c().await?;
		},
	}

	tracing::info!("Stopped cafe service");
	Ok(())
}

/// Builds a name-to-factory map, casting each factory to a plain fn pointer.
macro_rules! create_factory_map {
    ($interface:path, $error:path, $( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                $factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
            );
        )*
        factories
    }};
}

/// Builds the engine with every available storage backend registered.
async fn build_engine(config: Config) -> Result<CafeEngine, Box<dyn std::error::Error>> {
	let storage_factories = create_factory_map!(
		cafe_storage::StorageInterface,
		cafe_storage::StorageError,
		"file" => create_file_storage,
		"memory" => create_memory_storage,
	);

	let factories = CafeFactories { storage_factories };

	Ok(CafeBuilder::new(config).build(factories).await?)
}
