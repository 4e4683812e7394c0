//! Caller identity types for the ordering system.
//!
//! Registration and credential issuance are handled by an external identity
//! provider; the service only verifies presented credentials. These types
//! describe what a verified credential resolves to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a user, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
	/// Creates a user id from any string-like value.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Returns the id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for UserId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

/// Authorization role carried by a verified identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// Regular user: may only access their own orders.
	Customer,
	/// Administrator: may additionally list all orders.
	Administrator,
}

impl Role {
	/// Maps a role claim string to a role. Unknown values are customers.
	pub fn from_claim(claim: &str) -> Self {
		match claim {
			"admin" | "administrator" => Self::Administrator,
			_ => Self::Customer,
		}
	}
}

/// A verified caller identity, resolved from a presented credential.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerIdentity {
	/// The user's unique identifier.
	pub user_id: UserId,
	/// The user's email address.
	pub email: String,
	/// Optional display name.
	pub display_name: Option<String>,
	/// Authorization role.
	pub role: Role,
}

impl CallerIdentity {
	/// True when the caller may use administrative operations.
	pub fn is_admin(&self) -> bool {
		self.role == Role::Administrator
	}
}

/// Denormalized owner display fields for administrative listings.
///
/// A read-only subset of identity data; never written back to orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerProfile {
	/// The owner's email address.
	pub email: String,
	/// Optional display name.
	#[serde(default)]
	pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn role_claim_mapping_defaults_to_customer() {
		assert_eq!(Role::from_claim("admin"), Role::Administrator);
		assert_eq!(Role::from_claim("administrator"), Role::Administrator);
		assert_eq!(Role::from_claim("customer"), Role::Customer);
		assert_eq!(Role::from_claim(""), Role::Customer);
		assert_eq!(Role::from_claim("root"), Role::Customer);
	}

	#[test]
	fn admin_check_follows_role() {
		let caller = CallerIdentity {
			user_id: UserId::new("u1"),
			email: "john@example.com".to_string(),
			display_name: Some("John Doe".to_string()),
			role: Role::Customer,
		};
		assert!(!caller.is_admin());

		let admin = CallerIdentity {
			role: Role::Administrator,
			..caller
		};
		assert!(admin.is_admin());
	}
}
