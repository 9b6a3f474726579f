//! Order placement and the kitchen workflow.
//!
//! Placing and reading orders is open to everyone. Status changes are
//! restricted to staff.

use super::{api_error, ApiJson, ApiPath, ApiQuery};
use crate::auth::StaffUser;
use crate::server::AppState;
use axum::{extract::State, http::StatusCode, Json};
use cafe_types::{
	APIError, CreateOrderRequest, EntityId, Order, OrderFilter, SuccessResponse,
	UpdateStatusRequest,
};
use tracing::{info, warn};

/// Handles POST /api/orders.
pub async fn create_order(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), APIError> {
	match state.engine.create_order(request).await {
		Ok(order) => Ok((StatusCode::CREATED, Json(order))),
		Err(e) => {
			warn!("Order placement failed: {}", e);
			Err(api_error(e))
		},
	}
}

/// Handles GET /api/orders?status=&active=.
pub async fn list_orders(
	State(state): State<AppState>,
	ApiQuery(filter): ApiQuery<OrderFilter>,
) -> Result<Json<Vec<Order>>, APIError> {
	let orders = state.engine.list_orders(filter).await.map_err(api_error)?;
	Ok(Json(orders))
}

/// Handles GET /api/orders/{id}.
pub async fn get_order(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<EntityId>,
) -> Result<Json<Order>, APIError> {
	let order = state.engine.get_order(id).await.map_err(api_error)?;
	Ok(Json(order))
}

/// Handles PATCH /api/orders/{id}/status.
pub async fn update_status(
	State(state): State<AppState>,
	StaffUser(staff): StaffUser,
	ApiPath(id): ApiPath<EntityId>,
	ApiJson(request): ApiJson<UpdateStatusRequest>,
) -> Result<Json<SuccessResponse>, APIError> {
	info!(staff_id = staff.id, order_id = id, target = %request.status, "Changing order status");
	state
		.engine
		.transition_order_status(id, request.status)
		.await
		.map_err(api_error)?;
	Ok(Json(SuccessResponse::ok()))
}

/// Handles POST /api/orders/{id}/advance. Terminal orders stay as they are.
pub async fn advance(
	State(state): State<AppState>,
	StaffUser(staff): StaffUser,
	ApiPath(id): ApiPath<EntityId>,
) -> Result<Json<Order>, APIError> {
	let order = state
		.engine
		.advance_order_status(id)
		.await
		.map_err(api_error)?;
	info!(staff_id = staff.id, order_id = id, status = %order.status, "Order advanced");
	Ok(Json(order))
}

/// Handles POST /api/orders/{id}/cancel. Terminal orders stay as they are.
pub async fn cancel(
	State(state): State<AppState>,
	StaffUser(staff): StaffUser,
	ApiPath(id): ApiPath<EntityId>,
) -> Result<Json<Order>, APIError> {
	let order = state.engine.cancel_order(id).await.map_err(api_error)?;
	info!(staff_id = staff.id, order_id = id, status = %order.status, "Order cancel requested");
	Ok(Json(order))
}
