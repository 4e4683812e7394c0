//! HTTP server for the ordering API.
//!
//! This module assembles the router, shared state, and middleware for the
//! order endpoints and runs the server until shutdown.

use axum::{
	extract::DefaultBodyLimit,
	http::StatusCode,
	response::Json,
	routing::{get, patch, post},
	Router,
};
use ordering_config::ApiConfig;
use ordering_core::OrderLifecycle;
use ordering_identity::IdentityService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::apis::orders;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Lifecycle controller processing order operations.
	pub lifecycle: Arc<OrderLifecycle>,
	/// Identity service verifying bearer credentials.
	pub identity: Arc<IdentityService>,
}

impl std::fmt::Debug for AppState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppState").finish_non_exhaustive()
	}
}

/// Builds the API router over the given state.
///
/// Split out from [`start_server`] so tests can drive the router without
/// binding a socket.
pub fn router(state: AppState, max_request_size: usize) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route(
					"/orders",
					post(orders::create_order).get(orders::list_my_orders),
				)
				.route("/orders/{id}", get(orders::get_order))
				.route("/orders/{id}/status", patch(orders::update_order_status))
				.route("/orders/admin/all", get(orders::list_all_orders))
				.route("/health", get(health)),
		)
		.fallback(not_found)
		.layer(
			ServiceBuilder::new()
				.layer(CorsLayer::permissive())
				.layer(DefaultBodyLimit::max(max_request_size)),
		)
		.with_state(state)
}

/// Starts the HTTP server for the API.
pub async fn start_server(
	api_config: ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(state, api_config.max_request_size);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Ordering API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles GET /api/health requests.
async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "API is running" }))
}

/// Fallback for unknown routes.
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
	(
		StatusCode::NOT_FOUND,
		Json(serde_json::json!({ "error": "Route not found" })),
	)
}
