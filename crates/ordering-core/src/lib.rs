//! Order lifecycle controller for the ordering system.
//!
//! This module enforces the business rules around the order store: create
//! validation, ownership of reads and writes, the status-range contract,
//! and the administrative listing gate. It is the only component with
//! authorization logic.

use ordering_identity::IdentityService;
use ordering_storage::{OrderStoreService, StorageError};
use ordering_types::{
	AdminOrder, ApiError, CallerIdentity, LineItem, NewOrder, Order, OrderId, OrderStatus,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while applying lifecycle rules.
#[derive(Debug, Error)]
pub enum LifecycleError {
	/// Error that occurs when create-order input is malformed or missing.
	#[error("Validation failed: {0}")]
	Validation(String),
	/// Error that occurs when the requested order does not exist.
	#[error("Order not found: {0}")]
	NotFound(OrderId),
	/// Error that occurs when the caller is not allowed to act on the order.
	#[error("Forbidden: {0}")]
	Forbidden(String),
	/// Error propagated from the storage backend.
	#[error("Storage error: {0}")]
	Storage(StorageError),
}

impl From<LifecycleError> for ApiError {
	fn from(err: LifecycleError) -> Self {
		match err {
			LifecycleError::Validation(message) => ApiError::BadRequest {
				error_type: "VALIDATION_ERROR".to_string(),
				message,
			},
			LifecycleError::NotFound(id) => ApiError::NotFound {
				error_type: "ORDER_NOT_FOUND".to_string(),
				message: format!("Order not found: {}", id),
			},
			LifecycleError::Forbidden(message) => ApiError::Forbidden {
				error_type: "FORBIDDEN".to_string(),
				message,
			},
			LifecycleError::Storage(StorageError::Backend(message)) => {
				ApiError::ServiceUnavailable {
					error_type: "STORAGE_UNAVAILABLE".to_string(),
					message,
				}
			},
			LifecycleError::Storage(e) => ApiError::InternalServerError {
				error_type: "INTERNAL_ERROR".to_string(),
				message: e.to_string(),
			},
		}
	}
}

/// The order lifecycle controller.
///
/// Every operation takes the verified caller identity explicitly; no
/// request-independent mutable state lives here. The store is the single
/// source of truth for order data.
pub struct OrderLifecycle {
	store: Arc<OrderStoreService>,
	identity: Arc<IdentityService>,
}

impl OrderLifecycle {
	/// Creates a controller over the given store and identity provider.
	pub fn new(store: Arc<OrderStoreService>, identity: Arc<IdentityService>) -> Self {
		Self { store, identity }
	}

	/// Creates a new order owned by the caller.
	///
	/// The cart snapshot must contain at least one item and a total that
	/// is a positive finite number; anything else is a validation failure
	/// and nothing is persisted. New orders always start at
	/// [`OrderStatus::Confirmed`].
	pub async fn create_order(
		&self,
		caller: &CallerIdentity,
		items: Vec<LineItem>,
		total: Option<f64>,
	) -> Result<Order, LifecycleError> {
		if items.is_empty() {
			return Err(LifecycleError::Validation(
				"Order must contain at least one item".into(),
			));
		}
		let total = total
			.ok_or_else(|| LifecycleError::Validation("Order total is required".into()))?;
		if !total.is_finite() || total <= 0.0 {
			return Err(LifecycleError::Validation(
				"Order total must be a positive number".into(),
			));
		}

		let order = self
			.store
			.insert(NewOrder {
				owner_id: caller.user_id.clone(),
				items,
				total,
				status: OrderStatus::Confirmed,
			})
			.await
			.map_err(LifecycleError::Storage)?;

		tracing::info!("Created order {} for user {}", order.id, caller.user_id);
		Ok(order)
	}

	/// Retrieves one order, enforcing ownership.
	pub async fn get_order(
		&self,
		caller: &CallerIdentity,
		order_id: &OrderId,
	) -> Result<Order, LifecycleError> {
		self.fetch_owned(caller, order_id).await
	}

	/// Lists the caller's orders, most recent first.
	///
	/// A caller with no orders gets an empty sequence, never an error.
	pub async fn list_my_orders(
		&self,
		caller: &CallerIdentity,
	) -> Result<Vec<Order>, LifecycleError> {
		self.store
			.list_by_owner(&caller.user_id)
			.await
			.map_err(LifecycleError::Storage)
	}

	/// Applies a requested status to an order the caller owns.
	///
	/// Any requested value inside the valid range is applied exactly,
	/// regardless of the current status. An absent or out-of-range value
	/// leaves the order untouched and still succeeds, returning the
	/// current record; clients relying on this lenient contract exist.
	pub async fn update_status(
		&self,
		caller: &CallerIdentity,
		order_id: &OrderId,
		requested: Option<i64>,
	) -> Result<Order, LifecycleError> {
		let order = self.fetch_owned(caller, order_id).await?;

		match requested.and_then(OrderStatus::from_code) {
			Some(status) => {
				let updated = self
					.store
					.update_status(order_id, status)
					.await
					.map_err(|e| match e {
						StorageError::NotFound => LifecycleError::NotFound(order_id.clone()),
						other => LifecycleError::Storage(other),
					})?;
				tracing::info!(
					"Order {} status {} -> {}",
					order_id,
					order.status.code(),
					status.code()
				);
				Ok(updated)
			},
			None => {
				tracing::debug!(
					"Ignoring status value {:?} for order {}",
					requested,
					order_id
				);
				Ok(order)
			},
		}
	}

	/// Administrative listing of every order, enriched with owner display
	/// fields where the identity provider knows the owner.
	///
	/// Gated behind the administrator role. The observed source accepted
	/// any authenticated caller here; that gap is deliberately closed.
	pub async fn list_all_orders(
		&self,
		caller: &CallerIdentity,
	) -> Result<Vec<AdminOrder>, LifecycleError> {
		if !caller.is_admin() {
			return Err(LifecycleError::Forbidden(
				"Listing all orders requires the administrator role".into(),
			));
		}

		let orders = self
			.store
			.list_all()
			.await
			.map_err(LifecycleError::Storage)?;

		let mut result = Vec::with_capacity(orders.len());
		for order in orders {
			// Enrichment is best-effort: a provider failure degrades to
			// an unenriched record instead of failing the listing.
			let profile = match self.identity.profile(&order.owner_id).await {
				Ok(profile) => profile,
				Err(e) => {
					tracing::warn!("Owner profile lookup failed for {}: {}", order.owner_id, e);
					None
				},
			};
			let (owner_email, owner_name) = match profile {
				Some(profile) => (Some(profile.email), profile.display_name),
				None => (None, None),
			};
			result.push(AdminOrder {
				order,
				owner_email,
				owner_name,
			});
		}
		Ok(result)
	}

	/// Looks up an order and checks it belongs to the caller.
	async fn fetch_owned(
		&self,
		caller: &CallerIdentity,
		order_id: &OrderId,
	) -> Result<Order, LifecycleError> {
		let order = self
			.store
			.get_by_id(order_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => LifecycleError::NotFound(order_id.clone()),
				other => LifecycleError::Storage(other),
			})?;

		if order.owner_id != caller.user_id {
			return Err(LifecycleError::Forbidden(format!(
				"Order {} belongs to another user",
				order_id
			)));
		}

		Ok(order)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use ordering_identity::{IdentityError, IdentityInterface};
	use ordering_storage::implementations::memory::MemoryStore;
	use ordering_types::{ConfigSchema, OwnerProfile, Role, Schema, UserId, ValidationError};
	use std::collections::HashMap;

	/// Identity provider stub backed by a fixed profile map.
	struct DirectoryStub {
		profiles: HashMap<String, OwnerProfile>,
	}

	#[async_trait]
	impl IdentityInterface for DirectoryStub {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			struct Empty;
			impl ConfigSchema for Empty {
				fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
					Schema::new(vec![], vec![]).validate(config)
				}
			}
			Box::new(Empty)
		}

		async fn authenticate(&self, _credential: &str) -> Result<CallerIdentity, IdentityError> {
			Err(IdentityError::MissingCredential)
		}

		async fn profile(&self, user: &UserId) -> Result<Option<OwnerProfile>, IdentityError> {
			Ok(self.profiles.get(user.as_str()).cloned())
		}
	}

	fn lifecycle() -> OrderLifecycle {
		let mut profiles = HashMap::new();
		profiles.insert(
			"user-a".to_string(),
			OwnerProfile {
				email: "john@example.com".to_string(),
				display_name: Some("John Doe".to_string()),
			},
		);
		let store = Arc::new(OrderStoreService::new(Box::new(MemoryStore::new())));
		let identity = Arc::new(IdentityService::new(Box::new(DirectoryStub { profiles })));
		OrderLifecycle::new(store, identity)
	}

	fn customer(id: &str) -> CallerIdentity {
		CallerIdentity {
			user_id: UserId::new(id),
			email: format!("{}@example.com", id),
			display_name: None,
			role: Role::Customer,
		}
	}

	fn admin() -> CallerIdentity {
		CallerIdentity {
			user_id: UserId::new("admin-1"),
			email: "admin@example.com".to_string(),
			display_name: Some("Admin".to_string()),
			role: Role::Administrator,
		}
	}

	fn margherita() -> Vec<LineItem> {
		vec![LineItem {
			name: "Margherita".to_string(),
			price: 10.0,
			photo_name: "pizzas/margherita.jpg".to_string(),
		}]
	}

	#[tokio::test]
	async fn create_rejects_empty_items() {
		let lifecycle = lifecycle();
		let result = lifecycle
			.create_order(&customer("user-a"), vec![], Some(10.0))
			.await;
		assert!(matches!(result, Err(LifecycleError::Validation(_))));
	}

	#[tokio::test]
	async fn create_rejects_missing_or_invalid_total() {
		let lifecycle = lifecycle();
		let caller = customer("user-a");

		for total in [None, Some(0.0), Some(-5.0), Some(f64::NAN), Some(f64::INFINITY)] {
			let result = lifecycle.create_order(&caller, margherita(), total).await;
			assert!(
				matches!(result, Err(LifecycleError::Validation(_))),
				"total {:?} should be rejected",
				total
			);
		}
	}

	#[tokio::test]
	async fn create_starts_at_confirmed() {
		let lifecycle = lifecycle();
		let order = lifecycle
			.create_order(&customer("user-a"), margherita(), Some(10.0))
			.await
			.unwrap();

		assert_eq!(order.status, OrderStatus::Confirmed);
		assert_eq!(order.total, 10.0);
		assert_eq!(order.items.len(), 1);
		assert_eq!(order.owner_id, UserId::from("user-a"));
	}

	#[tokio::test]
	async fn get_enforces_ownership() {
		let lifecycle = lifecycle();
		let order = lifecycle
			.create_order(&customer("user-a"), margherita(), Some(10.0))
			.await
			.unwrap();

		let mine = lifecycle.get_order(&customer("user-a"), &order.id).await.unwrap();
		assert_eq!(mine.id, order.id);

		let theirs = lifecycle.get_order(&customer("user-b"), &order.id).await;
		assert!(matches!(theirs, Err(LifecycleError::Forbidden(_))));

		let missing = lifecycle
			.get_order(&customer("user-a"), &OrderId::from("missing"))
			.await;
		assert!(matches!(missing, Err(LifecycleError::NotFound(_))));
	}

	#[tokio::test]
	async fn list_my_orders_is_empty_for_new_callers() {
		let lifecycle = lifecycle();
		let orders = lifecycle.list_my_orders(&customer("user-z")).await.unwrap();
		assert!(orders.is_empty());
	}

	#[tokio::test]
	async fn update_applies_any_in_range_value() {
		let lifecycle = lifecycle();
		let caller = customer("user-a");
		let order = lifecycle
			.create_order(&caller, margherita(), Some(10.0))
			.await
			.unwrap();

		let updated = lifecycle
			.update_status(&caller, &order.id, Some(4))
			.await
			.unwrap();
		assert_eq!(updated.status, OrderStatus::OutForDelivery);

		// Backwards movement is allowed; the store only checks range
		let updated = lifecycle
			.update_status(&caller, &order.id, Some(1))
			.await
			.unwrap();
		assert_eq!(updated.status, OrderStatus::Preparing);
	}

	#[tokio::test]
	async fn update_ignores_absent_and_out_of_range_values() {
		let lifecycle = lifecycle();
		let caller = customer("user-a");
		let order = lifecycle
			.create_order(&caller, margherita(), Some(10.0))
			.await
			.unwrap();
		lifecycle
			.update_status(&caller, &order.id, Some(3))
			.await
			.unwrap();

		for requested in [None, Some(-1), Some(6), Some(9), Some(i64::MAX)] {
			let result = lifecycle
				.update_status(&caller, &order.id, requested)
				.await
				.unwrap();
			assert_eq!(
				result.status,
				OrderStatus::QualityCheck,
				"requested {:?} must leave the status unchanged",
				requested
			);
		}
	}

	#[tokio::test]
	async fn update_enforces_ownership_and_existence() {
		let lifecycle = lifecycle();
		let order = lifecycle
			.create_order(&customer("user-a"), margherita(), Some(10.0))
			.await
			.unwrap();

		let theirs = lifecycle
			.update_status(&customer("user-b"), &order.id, Some(1))
			.await;
		assert!(matches!(theirs, Err(LifecycleError::Forbidden(_))));

		let missing = lifecycle
			.update_status(&customer("user-a"), &OrderId::from("missing"), Some(1))
			.await;
		assert!(matches!(missing, Err(LifecycleError::NotFound(_))));
	}

	#[tokio::test]
	async fn admin_listing_requires_the_role() {
		let lifecycle = lifecycle();
		lifecycle
			.create_order(&customer("user-a"), margherita(), Some(10.0))
			.await
			.unwrap();

		// The observed source let any authenticated caller through here;
		// the role gate is a deliberate strengthening.
		let denied = lifecycle.list_all_orders(&customer("user-b")).await;
		assert!(matches!(denied, Err(LifecycleError::Forbidden(_))));

		let listed = lifecycle.list_all_orders(&admin()).await.unwrap();
		assert_eq!(listed.len(), 1);
	}

	#[tokio::test]
	async fn admin_listing_enriches_known_owners() {
		let lifecycle = lifecycle();
		lifecycle
			.create_order(&customer("user-a"), margherita(), Some(10.0))
			.await
			.unwrap();
		lifecycle
			.create_order(&customer("user-b"), margherita(), Some(12.0))
			.await
			.unwrap();

		let listed = lifecycle.list_all_orders(&admin()).await.unwrap();
		assert_eq!(listed.len(), 2);

		let known = listed
			.iter()
			.find(|o| o.order.owner_id == UserId::from("user-a"))
			.unwrap();
		assert_eq!(known.owner_email.as_deref(), Some("john@example.com"));
		assert_eq!(known.owner_name.as_deref(), Some("John Doe"));

		let unknown = listed
			.iter()
			.find(|o| o.order.owner_id == UserId::from("user-b"))
			.unwrap();
		assert!(unknown.owner_email.is_none());
	}

	#[tokio::test]
	async fn end_to_end_lifecycle_scenario() {
		let lifecycle = lifecycle();
		let caller_a = customer("user-a");
		let caller_b = customer("user-b");

		let order = lifecycle
			.create_order(&caller_a, margherita(), Some(10.0))
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::Confirmed);
		assert_eq!(order.total, 10.0);
		assert_eq!(order.items.len(), 1);

		let denied = lifecycle.get_order(&caller_b, &order.id).await;
		assert!(matches!(denied, Err(LifecycleError::Forbidden(_))));

		let updated = lifecycle
			.update_status(&caller_a, &order.id, Some(3))
			.await
			.unwrap();
		assert_eq!(updated.status, OrderStatus::QualityCheck);

		let unchanged = lifecycle
			.update_status(&caller_a, &order.id, Some(9))
			.await
			.unwrap();
		assert_eq!(unchanged.status, OrderStatus::QualityCheck);

		let listed = lifecycle.list_all_orders(&admin()).await.unwrap();
		let found = listed
			.iter()
			.find(|o| o.order.id == order.id)
			.expect("admin listing must include the order");
		assert_eq!(found.order.items[0].name, "Margherita");
		assert_eq!(found.order.total, 10.0);
	}
}
