//! API types for the ordering HTTP API.
//!
//! This module defines the request and response types for the order
//! endpoints, plus the structured error type every handler maps failures
//! into before they reach the client.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::order::LineItem;

/// Request body for creating an order.
///
/// Both fields are optional at the wire level so that missing input is
/// reported as a validation failure rather than a deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
	/// Cart snapshot to capture on the new order.
	#[serde(default)]
	pub items: Vec<LineItem>,
	/// Order total as computed by the client.
	#[serde(default)]
	pub total: Option<f64>,
}

/// Request body for the status update endpoint.
///
/// `status` is deliberately a raw integer: absent or out-of-range values
/// are accepted and ignored by the lifecycle rules rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
	/// Requested status code.
	#[serde(default)]
	pub status: Option<i64>,
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code.
	pub error: String,
	/// Human-readable description.
	pub message: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Bad request with validation errors (400)
	BadRequest { error_type: String, message: String },
	/// Missing or invalid credential (401)
	Unauthorized { error_type: String, message: String },
	/// Caller is authenticated but not allowed (403)
	Forbidden { error_type: String, message: String },
	/// Requested record does not exist (404)
	NotFound { error_type: String, message: String },
	/// Storage backend unreachable (503)
	ServiceUnavailable { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::Unauthorized { .. } => 401,
			ApiError::Forbidden { .. } => 403,
			ApiError::NotFound { .. } => 404,
			ApiError::ServiceUnavailable { .. } => 503,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error_type, message) = match self {
			ApiError::BadRequest {
				error_type,
				message,
			}
			| ApiError::Unauthorized {
				error_type,
				message,
			}
			| ApiError::Forbidden {
				error_type,
				message,
			}
			| ApiError::NotFound {
				error_type,
				message,
			}
			| ApiError::ServiceUnavailable {
				error_type,
				message,
			}
			| ApiError::InternalServerError {
				error_type,
				message,
			} => (error_type, message),
		};
		ErrorResponse {
			error: error_type.clone(),
			message: message.clone(),
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			ApiError::Unauthorized { message, .. } => write!(f, "Unauthorized: {}", message),
			ApiError::Forbidden { message, .. } => write!(f, "Forbidden: {}", message),
			ApiError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			ApiError::ServiceUnavailable { message, .. } => {
				write!(f, "Service Unavailable: {}", message)
			},
			ApiError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn create_request_tolerates_missing_fields() {
		let request: CreateOrderRequest = serde_json::from_str("{}").unwrap();
		assert!(request.items.is_empty());
		assert!(request.total.is_none());
	}

	#[test]
	fn update_request_tolerates_missing_status() {
		let request: UpdateStatusRequest = serde_json::from_str("{}").unwrap();
		assert!(request.status.is_none());

		let request: UpdateStatusRequest = serde_json::from_str(r#"{"status": 9}"#).unwrap();
		assert_eq!(request.status, Some(9));
	}

	#[test]
	fn error_maps_to_expected_status_codes() {
		let not_found = ApiError::NotFound {
			error_type: "ORDER_NOT_FOUND".to_string(),
			message: "no such order".to_string(),
		};
		assert_eq!(not_found.status_code(), 404);

		let body = not_found.to_error_response();
		assert_eq!(body.error, "ORDER_NOT_FOUND");
		assert_eq!(body.message, "no such order");
	}
}
