//! Identity verification module for the ordering system.
//!
//! User registration and credential issuance belong to an external
//! identity provider; this module only verifies presented credentials and
//! resolves them to a caller identity. It defines the provider interface
//! and a service wrapper used by the rest of the system.

use async_trait::async_trait;
use ordering_types::{CallerIdentity, ConfigSchema, ImplementationRegistry, OwnerProfile, UserId};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod jwt;
}

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
	/// Error that occurs when no credential was presented.
	#[error("No credential presented")]
	MissingCredential,
	/// Error that occurs when a presented credential fails verification.
	#[error("Invalid credential: {0}")]
	InvalidCredential(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// Error that occurs in the identity provider itself.
	#[error("Provider error: {0}")]
	Provider(String),
}

/// Trait defining the interface for identity providers.
///
/// This trait must be implemented by any identity provider that wants to
/// integrate with the ordering service. Verification is the only required
/// capability; the profile directory is optional.
#[async_trait]
pub trait IdentityInterface: Send + Sync {
	/// Returns the configuration schema for this identity provider.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Verifies a presented credential and resolves the caller identity.
	async fn authenticate(&self, credential: &str) -> Result<CallerIdentity, IdentityError>;

	/// Looks up the display profile of a known user.
	///
	/// Used to enrich administrative listings. Providers without a
	/// directory return None; an unknown user is never an error.
	async fn profile(&self, _user: &UserId) -> Result<Option<OwnerProfile>, IdentityError> {
		Ok(None)
	}
}

/// Type alias for identity factory functions.
///
/// This is the function signature that all identity implementations must
/// provide to create instances of their provider.
pub type IdentityFactory = fn(&toml::Value) -> Result<Box<dyn IdentityInterface>, IdentityError>;

/// Registry trait for identity implementations.
pub trait IdentityRegistry: ImplementationRegistry<Factory = IdentityFactory> {}

/// Get all registered identity implementations.
///
/// Returns a vector of (name, factory) tuples for all available identity
/// providers.
pub fn get_all_implementations() -> Vec<(&'static str, IdentityFactory)> {
	use implementations::jwt;

	vec![(jwt::Registry::NAME, jwt::Registry::factory())]
}

/// Service that manages identity operations.
///
/// This struct provides a high-level interface for credential verification
/// and profile lookup, wrapping the configured provider.
pub struct IdentityService {
	/// The underlying identity provider implementation.
	provider: Box<dyn IdentityInterface>,
}

impl IdentityService {
	/// Creates a new IdentityService with the specified provider.
	pub fn new(provider: Box<dyn IdentityInterface>) -> Self {
		Self { provider }
	}

	/// Verifies a presented credential and resolves the caller identity.
	pub async fn authenticate(&self, credential: &str) -> Result<CallerIdentity, IdentityError> {
		self.provider.authenticate(credential).await
	}

	/// Looks up the display profile of a known user, if the provider has one.
	pub async fn profile(&self, user: &UserId) -> Result<Option<OwnerProfile>, IdentityError> {
		self.provider.profile(user).await
	}
}
