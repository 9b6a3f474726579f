//! Customer notification inbox.

use super::{api_error, ApiPath};
use crate::server::AppState;
use axum::{extract::State, Json};
use cafe_types::{APIError, EntityId, Notification, SuccessResponse};

/// Handles GET /api/notifications/{userId}. Newest first.
pub async fn list_for_user(
	State(state): State<AppState>,
	ApiPath(user_id): ApiPath<EntityId>,
) -> Result<Json<Vec<Notification>>, APIError> {
	let notifications = state
		.engine
		.list_notifications(user_id)
		.await
		.map_err(api_error)?;
	Ok(Json(notifications))
}

/// Handles PATCH /api/notifications/{id}/read. Unknown IDs are ignored.
pub async fn mark_read(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<EntityId>,
) -> Result<Json<SuccessResponse>, APIError> {
	state
		.engine
		.mark_notification_read(id)
		.await
		.map_err(api_error)?;
	Ok(Json(SuccessResponse::ok()))
}
