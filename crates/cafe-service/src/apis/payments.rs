//! Prepayment recording.

use super::{api_error, ApiJson, ApiPath};
use crate::server::AppState;
use axum::{extract::State, Json};
use cafe_types::{APIError, EntityId, PaymentRequest, SuccessResponse};

/// Handles POST /api/orders/{id}/payment.
///
/// Paying an order that is already paid succeeds without recording a second
/// payment.
pub async fn record_payment(
	State(state): State<AppState>,
	ApiPath(order_id): ApiPath<EntityId>,
	ApiJson(request): ApiJson<PaymentRequest>,
) -> Result<Json<SuccessResponse>, APIError> {
	state
		.engine
		.record_payment(order_id, request)
		.await
		.map_err(api_error)?;
	Ok(Json(SuccessResponse::ok()))
}
