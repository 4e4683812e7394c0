//! In-memory order store implementation.
//!
//! This module provides a memory-based implementation of the OrderStore
//! trait, useful for testing and development scenarios where persistence
//! is not required.

use crate::{sort_newest_first, OrderStore, StorageError};
use async_trait::async_trait;
use ordering_types::{
	ConfigSchema, ImplementationRegistry, NewOrder, Order, OrderId, OrderStatus, Schema, UserId,
	ValidationError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory order store.
///
/// Orders live in a HashMap behind a read-write lock, providing fast
/// access but no persistence across restarts.
pub struct MemoryStore {
	/// The in-memory records keyed by order id.
	orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl MemoryStore {
	/// Creates a new MemoryStore instance.
	pub fn new() -> Self {
		Self {
			orders: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl OrderStore for MemoryStore {
	async fn insert(&self, order: NewOrder) -> Result<Order, StorageError> {
		let id = OrderId::new(Uuid::new_v4().to_string());
		let created_at = chrono::Utc::now().timestamp();
		let order = order.into_order(id.clone(), created_at);

		let mut orders = self.orders.write().await;
		orders.insert(id.0.clone(), order.clone());
		Ok(order)
	}

	async fn get_by_id(&self, id: &OrderId) -> Result<Order, StorageError> {
		let orders = self.orders.read().await;
		orders.get(id.as_str()).cloned().ok_or(StorageError::NotFound)
	}

	async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Order>, StorageError> {
		let orders = self.orders.read().await;
		let mut result: Vec<Order> = orders
			.values()
			.filter(|order| &order.owner_id == owner)
			.cloned()
			.collect();
		sort_newest_first(&mut result);
		Ok(result)
	}

	async fn list_all(&self) -> Result<Vec<Order>, StorageError> {
		let orders = self.orders.read().await;
		let mut result: Vec<Order> = orders.values().cloned().collect();
		sort_newest_first(&mut result);
		Ok(result)
	}

	async fn update_status(
		&self,
		id: &OrderId,
		status: OrderStatus,
	) -> Result<Order, StorageError> {
		let mut orders = self.orders.write().await;
		let order = orders.get_mut(id.as_str()).ok_or(StorageError::NotFound)?;
		order.status = status;
		Ok(order.clone())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStoreSchema)
	}
}

/// Configuration schema for MemoryStore.
pub struct MemoryStoreSchema;

impl ConfigSchema for MemoryStoreSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Memory storage has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry entry for the memory store.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_store
	}
}

impl crate::StorageRegistry for Registry {}

/// Factory function to create a memory store from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_store(_config: &toml::Value) -> Result<Box<dyn OrderStore>, StorageError> {
	Ok(Box::new(MemoryStore::new()))
}
