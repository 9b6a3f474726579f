//! Route handlers for the café API.
//!
//! Each submodule serves one resource. Engine errors and request rejections
//! are turned into [`APIError`] here so every failure shares the same body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use cafe_core::CafeError;
use cafe_types::APIError;
use serde::de::DeserializeOwned;

pub mod analytics;
pub mod menu;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod users;

/// Maps an engine error onto its HTTP representation.
pub fn api_error(err: CafeError) -> APIError {
	match err {
		CafeError::Validation(message) => APIError::BadRequest {
			error_type: "VALIDATION_ERROR".to_string(),
			message,
			details: None,
		},
		CafeError::ItemUnavailable(id) => APIError::BadRequest {
			error_type: "ITEM_UNAVAILABLE".to_string(),
			message: format!("Menu item {} is unavailable", id),
			details: Some(serde_json::json!({ "menuItemId": id })),
		},
		CafeError::NotFound { entity, id } => APIError::NotFound {
			error_type: format!("{}_NOT_FOUND", entity.to_uppercase().replace(' ', "_")),
			message: format!("{} {} not found", entity, id),
		},
		CafeError::InvalidTransition { .. } => APIError::Conflict {
			error_type: "INVALID_TRANSITION".to_string(),
			message: err.to_string(),
		},
		CafeError::Storage(_) | CafeError::Internal(_) => {
			tracing::error!(error = %err, "Request failed");
			APIError::InternalServerError {
				error_type: "INTERNAL_ERROR".to_string(),
				message: "Internal server error".to_string(),
			}
		},
	}
}

fn invalid_input(reason: String) -> APIError {
	APIError::BadRequest {
		error_type: "INVALID_INPUT".to_string(),
		message: "invalid input".to_string(),
		details: Some(serde_json::json!({ "reason": reason })),
	}
}

/// JSON body extractor that rejects with an [`APIError`].
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
	T: DeserializeOwned,
	S: Send + Sync,
{
	type Rejection = APIError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let Json(value) = Json::<T>::from_request(req, state)
			.await
			.map_err(|e: JsonRejection| invalid_input(e.body_text()))?;
		Ok(Self(value))
	}
}

/// Path parameter extractor that rejects with an [`APIError`].
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
	T: DeserializeOwned + Send,
	S: Send + Sync,
{
	type Rejection = APIError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let Path(value) = Path::<T>::from_request_parts(parts, state)
			.await
			.map_err(|e: PathRejection| invalid_input(e.body_text()))?;
		Ok(Self(value))
	}
}

/// Query string extractor that rejects with an [`APIError`].
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
	T: DeserializeOwned,
	S: Send + Sync,
{
	type Rejection = APIError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let Query(value) = Query::<T>::from_request_parts(parts, state)
			.await
			.map_err(|e: QueryRejection| invalid_input(e.body_text()))?;
		Ok(Self(value))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use cafe_types::OrderStatus;

	#[test]
	fn test_engine_errors_map_to_status_codes() {
		let cases = vec![
			(CafeError::Validation("items must not be empty".into()), 400),
			(CafeError::ItemUnavailable(2), 400),
			(
				CafeError::NotFound {
					entity: "Order",
					id: 9,
				},
				404,
			),
			(
				CafeError::InvalidTransition {
					from: OrderStatus::Completed,
					to: OrderStatus::Pending,
				},
				409,
			),
			(CafeError::Storage("disk full".into()), 500),
			(CafeError::Internal("hashing failed".into()), 500),
		];

		for (err, status) in cases {
			assert_eq!(api_error(err).status_code(), status);
		}
	}

	#[test]
	fn test_not_found_error_type_names_entity() {
		let err = api_error(CafeError::NotFound {
			entity: "Menu item",
			id: 4,
		});
		let body = err.to_error_response();
		assert_eq!(body.error, "MENU_ITEM_NOT_FOUND");
		assert_eq!(body.message, "Menu item 4 not found");
	}

	#[test]
	fn test_storage_error_detail_is_not_exposed() {
		let body = api_error(CafeError::Storage("/var/lib/cafe: permission denied".into()))
			.to_error_response();
		assert!(!body.message.contains("/var/lib/cafe"));
	}
}
