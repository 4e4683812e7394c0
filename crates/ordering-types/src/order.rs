//! Order domain types for the ordering system.
//!
//! This module defines the order record, its line items, and the fulfillment
//! status progression used throughout the order lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::UserId;

/// Unique identifier for an order, assigned by the store at insertion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
	/// Creates an order id from any string-like value.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Returns the id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for OrderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for OrderId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

/// A single line of an order: one catalog item with the price charged.
///
/// Line items are captured as an immutable snapshot when the order is
/// created. Later catalog changes never alter a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
	/// Display name of the item.
	pub name: String,
	/// Price charged for this item at order time.
	pub price: f64,
	/// Reference to the catalog photo for presentation.
	pub photo_name: String,
}

/// Fulfillment status of an order.
///
/// Six ordered states mirroring the presentation timeline. The wire
/// representation is the small integer code 0..=5; any integer outside
/// that range is rejected during deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OrderStatus {
	/// Order has been accepted and recorded.
	Confirmed = 0,
	/// Kitchen is preparing the order.
	Preparing = 1,
	/// Order is in the oven.
	Baking = 2,
	/// Final quality check before dispatch.
	QualityCheck = 3,
	/// Courier is on the way.
	OutForDelivery = 4,
	/// Order has reached the customer. Terminal state.
	Delivered = 5,
}

impl OrderStatus {
	/// Returns the integer wire code for this status.
	pub fn code(&self) -> u8 {
		*self as u8
	}

	/// Maps an integer code to a status, if it falls in the valid range.
	///
	/// Takes an `i64` so that raw caller-supplied values (which may be
	/// negative or large) can be checked without prior narrowing.
	pub fn from_code(code: i64) -> Option<Self> {
		match code {
			0 => Some(Self::Confirmed),
			1 => Some(Self::Preparing),
			2 => Some(Self::Baking),
			3 => Some(Self::QualityCheck),
			4 => Some(Self::OutForDelivery),
			5 => Some(Self::Delivered),
			_ => None,
		}
	}

	/// Human-readable label as shown in the order timeline.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Confirmed => "Order Confirmed",
			Self::Preparing => "Preparing",
			Self::Baking => "Baking",
			Self::QualityCheck => "Quality Check",
			Self::OutForDelivery => "Out for Delivery",
			Self::Delivered => "Delivered",
		}
	}

	/// True once the order has reached its final state.
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Delivered)
	}

	/// Returns an iterator over all statuses in progression order.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Confirmed,
			Self::Preparing,
			Self::Baking,
			Self::QualityCheck,
			Self::OutForDelivery,
			Self::Delivered,
		]
		.into_iter()
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.label())
	}
}

impl TryFrom<u8> for OrderStatus {
	type Error = String;

	fn try_from(code: u8) -> Result<Self, Self::Error> {
		Self::from_code(code as i64).ok_or_else(|| format!("status code {} out of range 0..=5", code))
	}
}

impl From<OrderStatus> for u8 {
	fn from(status: OrderStatus) -> Self {
		status.code()
	}
}

/// A persisted order record.
///
/// Only `status` is mutable after creation; every other field is an
/// immutable snapshot from order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier assigned at insertion.
	pub id: OrderId,
	/// Identity of the creating user. Never reassigned.
	pub owner_id: UserId,
	/// Line item snapshot captured at creation.
	pub items: Vec<LineItem>,
	/// Order total as submitted at creation.
	pub total: f64,
	/// Current fulfillment status.
	pub status: OrderStatus,
	/// Creation timestamp in Unix seconds, assigned at insertion.
	pub created_at: i64,
}

/// An order that has been validated but not yet persisted.
///
/// The store assigns the id and creation timestamp when this is inserted.
#[derive(Debug, Clone)]
pub struct NewOrder {
	pub owner_id: UserId,
	pub items: Vec<LineItem>,
	pub total: f64,
	pub status: OrderStatus,
}

impl NewOrder {
	/// Completes the record with the store-assigned id and timestamp.
	pub fn into_order(self, id: OrderId, created_at: i64) -> Order {
		Order {
			id,
			owner_id: self.owner_id,
			items: self.items,
			total: self.total,
			status: self.status,
			created_at,
		}
	}
}

/// An order enriched with owner display fields for administrative listings.
///
/// The enrichment is a read-only join against the identity provider's
/// profile directory; the underlying order record is never mutated by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
	#[serde(flatten)]
	pub order: Order,
	/// Owner's email, when the identity provider knows the owner.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub owner_email: Option<String>,
	/// Owner's display name, when known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub owner_name: Option<String>,
}
