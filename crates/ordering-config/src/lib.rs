//! Configuration module for the ordering service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files,
//! resolving `${VAR}` / `${VAR:-default}` environment references, and
//! validating that all required configuration values are properly set.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
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
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the ordering service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub service: ServiceConfig,
	/// Configuration for the order store backend.
	pub storage: StorageConfig,
	/// Configuration for the identity provider.
	pub identity: IdentityConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
}

/// Configuration for the order store backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the identity provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of identity implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default = "default_api_enabled")]
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
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			enabled: default_api_enabled(),
			host: default_api_host(),
			port: default_api_port(),
			timeout_seconds: default_api_timeout(),
			max_request_size: default_max_request_size(),
		}
	}
}

fn default_api_enabled() -> bool {
	true
}

/// Returns the default API host (localhost).
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	5000
}

/// Returns the default API request timeout in seconds.
fn default_api_timeout() -> u64 {
	30
}

/// Returns the default maximum request size in bytes (1MB).
fn default_max_request_size() -> usize {
	1024 * 1024
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// Environment references are resolved before parsing and the result
	/// is validated before being returned.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let raw = tokio::fs::read_to_string(path).await?;
		raw.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		// Validate storage config
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

		// Validate identity config
		if self.identity.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one identity implementation must be configured".into(),
			));
		}
		if self.identity.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Identity primary implementation cannot be empty".into(),
			));
		}
		if !self
			.identity
			.implementations
			.contains_key(&self.identity.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary identity provider '{}' not found in implementations",
				self.identity.primary
			)));
		}

		// Validate API config if present
		if let Some(ref api) = self.api {
			if api.enabled && api.timeout_seconds == 0 {
				return Err(ConfigError::Validation(
					"API timeout_seconds must be greater than 0".into(),
				));
			}
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is
/// automatically validated after parsing.
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

	const VALID_CONFIG: &str = r#"
[service]
id = "ordering-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[identity]
primary = "jwt"
[identity.implementations.jwt]
secret = "test-secret"

[api]
host = "127.0.0.1"
port = 5000
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_ORDERING_HOST", "localhost");
		std::env::set_var("TEST_ORDERING_PORT", "5000");

		let input = "host = \"${TEST_ORDERING_HOST}:${TEST_ORDERING_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5000\"");

		std::env::remove_var("TEST_ORDERING_HOST");
		std::env::remove_var("TEST_ORDERING_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_VAR"));
	}

	#[test]
	fn test_valid_config_parses() {
		let config: Config = VALID_CONFIG.parse().unwrap();
		assert_eq!(config.service.id, "ordering-test");
		assert_eq!(config.storage.primary, "memory");
		assert_eq!(config.identity.primary, "jwt");

		let api = config.api.unwrap();
		assert_eq!(api.port, 5000);
		assert_eq!(api.timeout_seconds, 30);
		assert_eq!(api.max_request_size, 1024 * 1024);
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("TEST_ORDERING_SECRET", "s3cret");

		let config_str = r#"
[service]
id = "ordering-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[identity]
primary = "jwt"
[identity.implementations.jwt]
secret = "${TEST_ORDERING_SECRET}"
"#;

		let config: Config = config_str.parse().unwrap();
		let jwt = config.identity.implementations.get("jwt").unwrap();
		assert_eq!(jwt.get("secret").and_then(|v| v.as_str()), Some("s3cret"));

		std::env::remove_var("TEST_ORDERING_SECRET");
	}

	#[test]
	fn test_unknown_primary_storage_rejected() {
		let config_str = r#"
[service]
id = "ordering-test"

[storage]
primary = "file"
[storage.implementations.memory]

[identity]
primary = "jwt"
[identity.implementations.jwt]
secret = "test-secret"
"#;

		let result = Config::from_str(config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Primary storage 'file' not found"));
	}

	#[test]
	fn test_empty_service_id_rejected() {
		let config_str = r#"
[service]
id = ""

[storage]
primary = "memory"
[storage.implementations.memory]

[identity]
primary = "jwt"
[identity.implementations.jwt]
secret = "test-secret"
"#;

		let result = Config::from_str(config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Service ID cannot be empty"));
	}

	#[test]
	fn test_missing_identity_implementation_rejected() {
		let config_str = r#"
[service]
id = "ordering-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[identity]
primary = "jwt"
[identity.implementations.other]
"#;

		let result = Config::from_str(config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Primary identity provider 'jwt' not found"));
	}
}
