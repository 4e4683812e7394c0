//! File-based order store implementation.
//!
//! This module stores each order as one JSON document on the filesystem,
//! providing simple persistence without requiring external services.
//! Writes go through a temporary file and an atomic rename so a failed
//! write never corrupts an existing record.

use crate::{sort_newest_first, OrderStore, StorageError};
use async_trait::async_trait;
use ordering_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, NewOrder, Order, OrderId, OrderStatus,
	Schema, UserId, ValidationError,
};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// File-based order store.
///
/// Orders live under the configured base directory as `<id>.json`.
/// Listings scan the directory; records that cannot be read or parsed are
/// skipped with a warning rather than failing the whole listing.
pub struct FileStore {
	/// Base directory path for storing order documents.
	base_path: PathBuf,
}

impl FileStore {
	/// Creates a new FileStore rooted at the given directory.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts an order id to a filesystem-safe document path.
	fn document_path(&self, id: &OrderId) -> PathBuf {
		// Sanitize the id so caller-supplied lookups cannot escape the base directory
		let safe_id = id.as_str().replace(['/', '\\', ':'], "_");
		self.base_path.join(format!("{}.json", safe_id))
	}

	/// Reads and parses one order document.
	async fn read_order(&self, path: &Path) -> Result<Order, StorageError> {
		let data = match fs::read(path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StorageError::NotFound)
			},
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		serde_json::from_slice(&data).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Writes an order document atomically (temp file + rename).
	async fn write_order(&self, order: &Order) -> Result<(), StorageError> {
		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		let data =
			serde_json::to_vec(order).map_err(|e| StorageError::Serialization(e.to_string()))?;

		let path = self.document_path(&order.id);
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, data)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	/// Scans the base directory and collects every readable order.
	async fn scan_orders(&self) -> Result<Vec<Order>, StorageError> {
		let mut result = Vec::new();

		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			// An absent directory just means nothing has been stored yet
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(result),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("json")) {
				continue;
			}
			match self.read_order(&path).await {
				Ok(order) => result.push(order),
				Err(e) => {
					tracing::warn!("Skipping unreadable order document {:?}: {}", path, e);
				},
			}
		}

		Ok(result)
	}
}

#[async_trait]
impl OrderStore for FileStore {
	async fn insert(&self, order: NewOrder) -> Result<Order, StorageError> {
		let id = OrderId::new(Uuid::new_v4().to_string());
		let created_at = chrono::Utc::now().timestamp();
		let order = order.into_order(id, created_at);

		self.write_order(&order).await?;
		Ok(order)
	}

	async fn get_by_id(&self, id: &OrderId) -> Result<Order, StorageError> {
		self.read_order(&self.document_path(id)).await
	}

	async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Order>, StorageError> {
		let mut orders = self.scan_orders().await?;
		orders.retain(|order| &order.owner_id == owner);
		sort_newest_first(&mut orders);
		Ok(orders)
	}

	async fn list_all(&self) -> Result<Vec<Order>, StorageError> {
		let mut orders = self.scan_orders().await?;
		sort_newest_first(&mut orders);
		Ok(orders)
	}

	async fn update_status(
		&self,
		id: &OrderId,
		status: OrderStatus,
	) -> Result<Order, StorageError> {
		let mut order = self.read_order(&self.document_path(id)).await?;
		order.status = status;
		self.write_order(&order).await?;
		Ok(order)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStoreSchema)
	}
}

/// Configuration schema for FileStore.
pub struct FileStoreSchema;

impl ConfigSchema for FileStoreSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![], // No required fields
			vec![Field::new("storage_path", FieldType::String)],
		);
		schema.validate(config)
	}
}

/// Registry entry for the file store.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_store
	}
}

impl crate::StorageRegistry for Registry {}

/// Factory function to create a file store from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for order documents (default: "./data/orders")
pub fn create_store(config: &toml::Value) -> Result<Box<dyn OrderStore>, StorageError> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/orders")
		.to_string();

	Ok(Box::new(FileStore::new(PathBuf::from(storage_path))))
}
