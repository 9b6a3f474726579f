//! Staff dashboard aggregations.

use super::api_error;
use crate::auth::StaffUser;
use crate::server::AppState;
use axum::{extract::State, Json};
use cafe_types::{APIError, PopularItem, TimeSlotCount};

/// Handles GET /api/analytics/popular-items.
pub async fn popular_items(
	State(state): State<AppState>,
	_staff: StaffUser,
) -> Result<Json<Vec<PopularItem>>, APIError> {
	let items = state.engine.popular_items().await.map_err(api_error)?;
	Ok(Json(items))
}

/// Handles GET /api/analytics/time-slots.
pub async fn time_slots(
	State(state): State<AppState>,
	_staff: StaffUser,
) -> Result<Json<Vec<TimeSlotCount>>, APIError> {
	let slots = state.engine.orders_by_time_slot().await.map_err(api_error)?;
	Ok(Json(slots))
}
