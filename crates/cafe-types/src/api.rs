//! API types for the café HTTP API.
//!
//! This module defines the request and response bodies exchanged with the
//! ordering and kitchen front-ends, together with the structured error type
//! the HTTP layer returns.

use crate::{EntityId, OrderItem, OrderStatus, PaymentMethod, Role, User};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for registering (or re-identifying) a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
	pub name: String,
	pub phone: String,
	#[serde(default)]
	pub email: Option<String>,
	/// Optional password; only its hash is kept.
	#[serde(default)]
	pub password: Option<String>,
}

/// Public view of a user. Omits the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
	pub id: EntityId,
	pub name: String,
	pub phone: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	pub role: Role,
}

impl From<User> for UserResponse {
	fn from(user: User) -> Self {
		Self {
			id: user.id,
			name: user.name,
			phone: user.phone,
			email: user.email,
			role: user.role,
		}
	}
}

/// Request body for placing a pickup order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
	#[serde(default)]
	pub user_id: Option<EntityId>,
	pub items: Vec<OrderItem>,
	/// Client-computed total; checked against the menu prices.
	pub total: u64,
	pub pickup_time: String,
	#[serde(default)]
	pub special_instructions: Option<String>,
}

/// Request body for toggling a menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
	pub available: bool,
}

/// Request body for an explicit status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
	pub status: OrderStatus,
}

/// Request body for recording a prepayment.
///
/// Card details are optional; when present they are format-checked and then
/// discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
	pub payment_method: PaymentMethod,
	#[serde(default)]
	pub card_number: Option<String>,
	#[serde(default)]
	pub expiry_date: Option<String>,
	#[serde(default)]
	pub cvv: Option<String>,
}

impl PaymentRequest {
	/// Convenience constructor for a payment without card details.
	pub fn with_method(payment_method: PaymentMethod) -> Self {
		Self {
			payment_method,
			card_number: None,
			expiry_date: None,
			cvv: None,
		}
	}
}

/// Filter applied when listing orders.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderFilter {
	/// Only orders in this status.
	#[serde(default)]
	pub status: Option<OrderStatus>,
	/// `true` keeps non-terminal orders, `false` keeps terminal ones.
	#[serde(default)]
	pub active: Option<bool>,
}

/// Total ordered quantity of one menu item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
	pub menu_item_id: EntityId,
	pub total_quantity: u64,
}

/// Number of orders due in one pickup slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlotCount {
	/// Slot start, `HH:00`.
	pub slot: String,
	pub count: u64,
}

/// Body returned by mutations that have nothing else to report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessResponse {
	pub success: bool,
}

impl SuccessResponse {
	pub fn ok() -> Self {
		Self { success: true }
	}
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Malformed input or unavailable items (400)
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Missing or unknown caller identity (401)
	Unauthorized { message: String },
	/// Caller lacks the required role (403)
	Forbidden { message: String },
	/// Referenced entity does not exist (404)
	NotFound { error_type: String, message: String },
	/// Request conflicts with the current state (409)
	Conflict { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::Unauthorized { .. } => 401,
			APIError::Forbidden { .. } => 403,
			APIError::NotFound { .. } => 404,
			APIError::Conflict { .. } => 409,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			APIError::BadRequest {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
			},
			APIError::Unauthorized { message } => ErrorResponse {
				error: "UNAUTHORIZED".to_string(),
				message: message.clone(),
				details: None,
			},
			APIError::Forbidden { message } => ErrorResponse {
				error: "FORBIDDEN".to_string(),
				message: message.clone(),
				details: None,
			},
			APIError::NotFound {
				error_type,
				message,
			}
			| APIError::Conflict {
				error_type,
				message,
			}
			| APIError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
			},
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
			APIError::Forbidden { message } => write!(f, "Forbidden: {}", message),
			APIError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			APIError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self.to_error_response())).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_create_order_request_accepts_camel_case() {
		let body = r#"{
			"userId": 4,
			"items": [{"menuItemId": 1, "quantity": 2, "notes": "no sugar"}],
			"total": 700,
			"pickupTime": "12:30"
		}"#;
		let request: CreateOrderRequest = serde_json::from_str(body).unwrap();
		assert_eq!(request.user_id, Some(4));
		assert_eq!(request.items[0].notes, "no sugar");
		assert_eq!(request.special_instructions, None);
	}

	#[test]
	fn test_order_item_requires_notes() {
		let body = r#"{
			"items": [{"menuItemId": 1, "quantity": 2}],
			"total": 700,
			"pickupTime": "12:30"
		}"#;
		let err = serde_json::from_str::<CreateOrderRequest>(body).unwrap_err();
		assert!(err.to_string().contains("notes"));
	}

	#[test]
	fn test_payment_request_rejects_unknown_method() {
		let body = r#"{"paymentMethod": "crypto"}"#;
		assert!(serde_json::from_str::<PaymentRequest>(body).is_err());
	}

	#[test]
	fn test_user_response_hides_password_hash() {
		let user = User {
			id: 1,
			name: "Anna".to_string(),
			phone: "555-0100".to_string(),
			email: None,
			role: Role::Customer,
			password_hash: Some("$argon2id$...".to_string()),
		};
		let value = serde_json::to_value(UserResponse::from(user)).unwrap();
		assert!(value.get("passwordHash").is_none());
		assert_eq!(value["role"], "customer");
	}

	#[test]
	fn test_error_response_shape() {
		let err = APIError::NotFound {
			error_type: "ORDER_NOT_FOUND".to_string(),
			message: "Order 9 not found".to_string(),
		};
		assert_eq!(err.status_code(), 404);
		let body = serde_json::to_value(err.to_error_response()).unwrap();
		assert_eq!(body["error"], "ORDER_NOT_FOUND");
		assert!(body.get("details").is_none());
	}
}
