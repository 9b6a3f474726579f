//! Role check for kitchen-only routes.
//!
//! The caller names itself through the `x-user-id` header. There is no
//! credential check; the header only selects whose role applies.

use crate::apis::api_error;
use crate::server::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cafe_core::CafeError;
use cafe_types::{APIError, EntityId, User};

pub const USER_ID_HEADER: &str = "x-user-id";

/// A caller whose role is `staff` or `admin`.
#[derive(Debug, Clone)]
pub struct StaffUser(pub User);

impl FromRequestParts<AppState> for StaffUser {
	type Rejection = APIError;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let header = parts
			.headers
			.get(USER_ID_HEADER)
			.ok_or_else(|| APIError::Unauthorized {
				message: format!("Missing {} header", USER_ID_HEADER),
			})?;
		let user_id = header
			.to_str()
			.ok()
			.and_then(|value| value.trim().parse::<EntityId>().ok())
			.ok_or_else(|| APIError::Unauthorized {
				message: format!("Invalid {} header", USER_ID_HEADER),
			})?;

		let user = match state.engine.get_user(user_id).await {
			Ok(user) => user,
			Err(CafeError::NotFound { .. }) => {
				return Err(APIError::Unauthorized {
					message: format!("Unknown user {}", user_id),
				});
			},
			Err(e) => return Err(api_error(e)),
		};

		if !user.role.is_staff() {
			tracing::debug!(user_id, role = %user.role, "Rejected non-staff caller");
			return Err(APIError::Forbidden {
				message: "Staff role required".to_string(),
			});
		}

		Ok(StaffUser(user))
	}
}
