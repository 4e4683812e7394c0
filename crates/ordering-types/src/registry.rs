//! Registry trait for self-registering implementations.
//!
//! This module provides the base trait that pluggable backends implement
//! to register themselves with their configuration name and factory function.

/// Base trait for implementation registries.
///
/// Each backend module (storage, identity) must provide a Registry struct
/// that implements this trait, so every implementation declares its
/// configuration name and provides a factory function.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the key used in the TOML configuration, for example:
	/// - "memory" for storage.implementations.memory
	/// - "file" for storage.implementations.file
	/// - "jwt" for identity.implementations.jwt
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	///
	/// Each module defines its own factory type, for example
	/// StorageFactory for storage backends or IdentityFactory for
	/// identity providers.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
