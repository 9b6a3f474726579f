//! HTTP server for the café API.
//!
//! All routes live under `/api` and exchange JSON. Kitchen routes require a
//! staff caller, see [`crate::auth`].

use crate::apis::{analytics, menu, notifications, orders, payments, users};
use axum::{
	extract::DefaultBodyLimit,
	http::HeaderValue,
	routing::{get, patch, post},
	Router,
};
use cafe_config::ApiConfig;
use cafe_core::CafeEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the engine serving every request.
	pub engine: Arc<CafeEngine>,
}

/// Builds the API router, applying the limits from `[api]` when present.
pub fn build_router(engine: Arc<CafeEngine>) -> Router {
	let api_config = engine.config().api.clone();
	let state = AppState { engine };

	let routes = Router::new()
		.route("/users", post(users::create_user))
		.route("/users/{id}", get(users::get_user))
		.route("/menu", get(menu::list_menu))
		.route("/menu/{id}", get(menu::get_menu_item))
		.route("/menu/{id}/availability", patch(menu::set_availability))
		.route("/orders", post(orders::create_order).get(orders::list_orders))
		.route("/orders/{id}", get(orders::get_order))
		.route("/orders/{id}/status", patch(orders::update_status))
		.route("/orders/{id}/advance", post(orders::advance))
		.route("/orders/{id}/cancel", post(orders::cancel))
		.route("/orders/{id}/payment", post(payments::record_payment))
		.route("/analytics/popular-items", get(analytics::popular_items))
		.route("/analytics/time-slots", get(analytics::time_slots))
		.route("/notifications/{id}", get(notifications::list_for_user))
		.route("/notifications/{id}/read", patch(notifications::mark_read));

	let app = Router::new().nest("/api", routes).with_state(state);

	match api_config {
		Some(api) => app.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(cors_layer(&api))
				.layer(TimeoutLayer::new(Duration::from_secs(api.timeout_seconds)))
				.layer(DefaultBodyLimit::max(api.max_request_size)),
		),
		None => app.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		),
	}
}

fn cors_layer(api: &ApiConfig) -> CorsLayer {
	let Some(cors) = &api.cors else {
		return CorsLayer::permissive();
	};

	let origins: Vec<HeaderValue> = cors
		.allowed_origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
				None
			},
		})
		.collect();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods(Any)
		.allow_headers(Any)
}

/// Starts the HTTP server and runs it until Ctrl+C.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<CafeEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = build_router(engine);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Cafe API server starting on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!("Failed to listen for shutdown signal: {}", e);
		return;
	}
	tracing::info!("Shutdown signal received");
}
