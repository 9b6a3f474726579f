//! Customer registration and lookup.

use super::{api_error, ApiJson, ApiPath};
use crate::server::AppState;
use axum::{extract::State, http::StatusCode, Json};
use cafe_types::{APIError, CreateUserRequest, EntityId, UserResponse};

/// Handles POST /api/users.
///
/// Registering a phone number that is already known returns the existing
/// user with 200 instead of creating a second one.
pub async fn create_user(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), APIError> {
	let (user, created) = state.engine.create_user(request).await.map_err(api_error)?;
	let status = if created { StatusCode::CREATED } else { StatusCode::OK };
	Ok((status, Json(user.into())))
}

/// Handles GET /api/users/{id}.
pub async fn get_user(
	State(state): State<AppState>,
	ApiPath(id): ApiPath<EntityId>,
) -> Result<Json<UserResponse>, APIError> {
	let user = state.engine.get_user(id).await.map_err(api_error)?;
	Ok(Json(user.into()))
}
