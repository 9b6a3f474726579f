//! Menu catalogue endpoints.

use super::{api_error, ApiJson, ApiPath};
use crate::auth::StaffUser;
use crate::server::AppState;
use axum::{extract::State, Json};
use cafe_types::{APIError, EntityId, MenuItem, SuccessResponse, UpdateAvailabilityRequest};

/// Handles GET /api/menu.
pub async fn list_menu(State(state): State<AppState>) -> Result<Json<Vec<MenuItem>>, APIError> {
	let items = state.engine.list_menu_items().await.map_err(api_error)?;
	Ok(Json(items))
}

/// Handles GET /api/menu/{id}.
pub async fn get_menu_item(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<EntityId>,
) -> Result<Json<MenuItem>, APIError> {
	let item = state.engine.get_menu_item(id).await.map_err(api_error)?;
	Ok(Json(item))
}

/// Handles PATCH /api/menu/{id}/availability. Unknown items are ignored.
pub async fn set_availability(
	State(state): State<AppState>,
	StaffUser(staff): StaffUser,
	ApiPath(id): ApiPath<EntityId>,
	ApiJson(request): ApiJson<UpdateAvailabilityRequest>,
) -> Result<Json<SuccessResponse>, APIError> {
	tracing::info!(
		staff_id = staff.id,
		menu_item_id = id,
		available = request.available,
		"Updating menu item availability"
	);
	state
		.engine
		.set_menu_item_availability(id, request.available)
		.await
		.map_err(api_error)?;
	Ok(Json(SuccessResponse::ok()))
}
