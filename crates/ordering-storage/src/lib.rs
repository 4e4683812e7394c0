//! Order store module for the ordering system.
//!
//! This module provides the durable keyed storage of order records,
//! supporting different backend implementations such as in-memory or
//! file-based storage.

use async_trait::async_trait;
use ordering_types::{
	ConfigSchema, ImplementationRegistry, NewOrder, Order, OrderId, OrderStatus, UserId,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested order is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for order store backends.
///
/// This trait must be implemented by any storage backend that wants to
/// hold order records. The store owns id and creation-timestamp
/// assignment; everything above it treats records as opaque.
#[async_trait]
pub trait OrderStore: Send + Sync {
	/// Persists a validated order, assigning its unique id and creation
	/// timestamp, and returns the stored record.
	async fn insert(&self, order: NewOrder) -> Result<Order, StorageError>;

	/// Point lookup by order id.
	async fn get_by_id(&self, id: &OrderId) -> Result<Order, StorageError>;

	/// Returns all orders belonging to one owner, most recent first.
	/// Returns an empty vector when the owner has no orders.
	async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Order>, StorageError>;

	/// Returns all orders across every owner, most recent first.
	async fn list_all(&self) -> Result<Vec<Order>, StorageError>;

	/// Rewrites only the status field of an existing record and returns
	/// the updated record. Concurrent updates to the same id resolve
	/// last-write-wins.
	async fn update_status(&self, id: &OrderId, status: OrderStatus)
		-> Result<Order, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their store.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn OrderStore>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations. This is used when wiring the service to resolve the
/// configured primary backend.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Sorts orders most recent first.
///
/// Ties on the creation timestamp are broken by id so listings are stable
/// across calls.
pub(crate) fn sort_newest_first(orders: &mut [Order]) {
	orders.sort_by(|a, b| {
		b.created_at
			.cmp(&a.created_at)
			.then_with(|| b.id.0.cmp(&a.id.0))
	});
}

/// Service that manages order persistence.
///
/// This struct provides a high-level interface over the configured storage
/// backend and is what the lifecycle controller talks to.
pub struct OrderStoreService {
	/// The underlying storage backend implementation.
	backend: Box<dyn OrderStore>,
}

impl OrderStoreService {
	/// Creates a new OrderStoreService with the specified backend.
	pub fn new(backend: Box<dyn OrderStore>) -> Self {
		Self { backend }
	}

	/// Persists a validated order and returns the stored record.
	pub async fn insert(&self, order: NewOrder) -> Result<Order, StorageError> {
		self.backend.insert(order).await
	}

	/// Point lookup by order id.
	pub async fn get_by_id(&self, id: &OrderId) -> Result<Order, StorageError> {
		self.backend.get_by_id(id).await
	}

	/// Returns all orders belonging to one owner, most recent first.
	pub async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Order>, StorageError> {
		self.backend.list_by_owner(owner).await
	}

	/// Returns all orders across every owner, most recent first.
	pub async fn list_all(&self) -> Result<Vec<Order>, StorageError> {
		self.backend.list_all().await
	}

	/// Rewrites only the status field of an existing record.
	pub async fn update_status(
		&self,
		id: &OrderId,
		status: OrderStatus,
	) -> Result<Order, StorageError> {
		self.backend.update_status(id, status).await
	}
}
