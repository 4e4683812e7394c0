//! Main entry point for the ordering service.
//!
//! This binary loads configuration, wires the configured storage and
//! identity backends through their factory registries, and serves the
//! order API until interrupted.

use clap::Parser;
use ordering_config::Config;
use ordering_core::OrderLifecycle;
use ordering_identity::{IdentityFactory, IdentityService};
use ordering_service::server::{self, AppState};
use ordering_storage::{OrderStoreService, StorageFactory};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line arguments for the ordering service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the ordering service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Wires the configured backends into the lifecycle controller
/// 5. Serves the API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	tracing::info!("Started ordering service");

	// Load configuration
	let config = Config::from_file(args.config.to_str().ok_or("Invalid config path")?).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let state = build_state(&config)?;

	let api_config = config.api.clone().unwrap_or_default();
	if !api_config.enabled {
		tracing::warn!("API server is disabled in configuration; nothing to serve");
		return Ok(());
	}

	server::start_server(api_config, state).await?;

	tracing::info!("Stopped ordering service");
	Ok(())
}

/// Wires the configured storage and identity backends into shared state.
///
/// Backends are resolved by name through their implementation registries,
/// and each backend's configuration section is validated against the
/// schema the implementation declares.
fn build_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
	// Storage backend
	let storage_factories: HashMap<&str, StorageFactory> =
		ordering_storage::get_all_implementations().into_iter().collect();
	let factory = storage_factories
		.get(config.storage.primary.as_str())
		.ok_or_else(|| format!("Unknown storage implementation '{}'", config.storage.primary))?;
	let section = config
		.storage
		.implementations
		.get(&config.storage.primary)
		.ok_or_else(|| format!("Missing configuration for storage '{}'", config.storage.primary))?;
	let store = factory(section)?;
	store.config_schema().validate(section)?;
	tracing::info!("Using '{}' order store", config.storage.primary);

	// Identity provider
	let identity_factories: HashMap<&str, IdentityFactory> =
		ordering_identity::get_all_implementations().into_iter().collect();
	let factory = identity_factories
		.get(config.identity.primary.as_str())
		.ok_or_else(|| format!("Unknown identity implementation '{}'", config.identity.primary))?;
	let section = config
		.identity
		.implementations
		.get(&config.identity.primary)
		.ok_or_else(|| {
			format!("Missing configuration for identity '{}'", config.identity.primary)
		})?;
	let provider = factory(section)?;
	provider.config_schema().validate(section)?;
	tracing::info!("Using '{}' identity provider", config.identity.primary);

	let identity = Arc::new(IdentityService::new(provider));
	let lifecycle = Arc::new(OrderLifecycle::new(
		Arc::new(OrderStoreService::new(store)),
		Arc::clone(&identity),
	));

	Ok(AppState {
		lifecycle,
		identity,
	})
}
