//! Order API implementation.
//!
//! This module implements the order endpoints: creation, owner reads,
//! status updates, and the administrative listing. Every handler resolves
//! the caller identity from the Authorization header before touching the
//! lifecycle controller; failures are mapped to structured error
//! responses without leaking internal detail.

use axum::{
	extract::{Path, State},
	http::{header, HeaderMap, StatusCode},
	response::Json,
};
use ordering_types::{
	AdminOrder, ApiError, CallerIdentity, CreateOrderRequest, Order, OrderId, UpdateStatusRequest,
};
use tracing::warn;

use crate::server::AppState;

/// Resolves the caller identity from the Authorization header.
///
/// Expects `Authorization: Bearer <credential>`; a missing header, a
/// malformed value, or a credential that fails verification all map to a
/// 401 response.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CallerIdentity, ApiError> {
	let value = headers
		.get(header::AUTHORIZATION)
		.and_then(|v| v.to_str().ok())
		.ok_or_else(|| ApiError::Unauthorized {
			error_type: "UNAUTHENTICATED".to_string(),
			message: "Missing Authorization header".to_string(),
		})?;

	let credential = value
		.strip_prefix("Bearer ")
		.ok_or_else(|| ApiError::Unauthorized {
			error_type: "UNAUTHENTICATED".to_string(),
			message: "Authorization header must be a Bearer credential".to_string(),
		})?;

	state
		.identity
		.authenticate(credential)
		.await
		.map_err(|e| ApiError::Unauthorized {
			error_type: "UNAUTHENTICATED".to_string(),
			message: e.to_string(),
		})
}

/// Handles POST /api/orders requests.
///
/// Persists a new order owned by the caller from the submitted cart
/// snapshot. Returns 201 with the created order.
pub async fn create_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
	let caller = authenticate(&state, &headers).await?;

	match state
		.lifecycle
		.create_order(&caller, request.items, request.total)
		.await
	{
		Ok(order) => Ok((StatusCode::CREATED, Json(order))),
		Err(e) => {
			warn!("Order creation failed for {}: {}", caller.user_id, e);
			Err(e.into())
		},
	}
}

/// Handles GET /api/orders requests.
///
/// Lists the caller's orders, most recent first.
pub async fn list_my_orders(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Vec<Order>>, ApiError> {
	let caller = authenticate(&state, &headers).await?;

	match state.lifecycle.list_my_orders(&caller).await {
		Ok(orders) => Ok(Json(orders)),
		Err(e) => {
			warn!("Order listing failed for {}: {}", caller.user_id, e);
			Err(e.into())
		},
	}
}

/// Handles GET /api/orders/{id} requests.
///
/// Returns one order; only its owner may read it.
pub async fn get_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
	headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
	let caller = authenticate(&state, &headers).await?;

	match state
		.lifecycle
		.get_order(&caller, &OrderId::new(id))
		.await
	{
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			warn!("Order retrieval failed: {}", e);
			Err(e.into())
		},
	}
}

/// Handles PATCH /api/orders/{id}/status requests.
///
/// Applies the requested status when it is inside the valid range; an
/// absent or out-of-range value leaves the order untouched and the
/// request still succeeds with the current record.
pub async fn update_order_status(
	State(state): State<AppState>,
	Path(id): Path<String>,
	headers: HeaderMap,
	Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
	let caller = authenticate(&state, &headers).await?;

	match state
		.lifecycle
		.update_status(&caller, &OrderId::new(id), request.status)
		.await
	{
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			warn!("Status update failed: {}", e);
			Err(e.into())
		},
	}
}

/// Handles GET /api/orders/admin/all requests.
///
/// Administrative listing of every order, enriched with owner display
/// fields. Requires the administrator role.
pub async fn list_all_orders(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Vec<AdminOrder>>, ApiError> {
	let caller = authenticate(&state, &headers).await?;

	match state.lifecycle.list_all_orders(&caller).await {
		Ok(orders) => Ok(Json(orders)),
		Err(e) => {
			warn!("Administrative listing failed for {}: {}", caller.user_id, e);
			Err(e.into())
		},
	}
}
