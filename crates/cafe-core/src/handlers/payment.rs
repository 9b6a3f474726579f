//! Prepayment recording.

use crate::clock::Clock;
use crate::handlers::NotificationHandler;
use crate::state::OrderStateMachine;
use crate::validation::PaymentValidator;
use crate::CafeError;
use cafe_storage::StorageService;
use cafe_types::{EntityId, Payment, PaymentRequest, PaymentStatus};
use std::sync::Arc;

/// Handler for payments.
pub struct PaymentHandler {
	storage: Arc<StorageService>,
	state_machine: Arc<OrderStateMachine>,
	notifications: Arc<NotificationHandler>,
	clock: Arc<dyn Clock>,
	/// Share of the order total charged up front, 1..=100.
	prepayment_percent: u8,
}

impl PaymentHandler {
	pub fn new(
		storage: Arc<StorageService>,
		state_machine: Arc<OrderStateMachine>,
		notifications: Arc<NotificationHandler>,
		clock: Arc<dyn Clock>,
		prepayment_percent: u8,
	) -> Self {
		Self {
			storage,
			state_machine,
			notifications,
			clock,
			prepayment_percent,
		}
	}

	/// Prepayment owed for an order total, rounded up to the minor unit.
	pub fn prepayment_amount(&self, total: u64) -> u64 {
		total
			.saturating_mul(u64::from(self.prepayment_percent))
			.div_ceil(100)
	}

	/// Marks the order paid and records the prepayment.
	///
	/// Returns `None` without writing anything when the order was already
	/// paid. If the payment record cannot be stored the order is put back to
	/// unpaid before the error is returned.
	pub async fn record(
		&self,
		order_id: EntityId,
		request: PaymentRequest,
	) -> Result<Option<Payment>, CafeError> {
		PaymentValidator::validate(&request)?;

		let Some(order) = self.state_machine.mark_paid(order_id).await? else {
			tracing::debug!(order_id, "Order already paid");
			return Ok(None);
		};

		let amount = self.prepayment_amount(order.total);
		let created_at = self.clock.now();
		let inserted = self
			.storage
			.insert(|id| Payment {
				id,
				order_id,
				amount,
				payment_method: request.payment_method,
				created_at,
			})
			.await;
		let payment = match inserted {
			Ok(payment) => payment,
			Err(e) => {
				if let Err(rollback) = self
					.state_machine
					.update_order_with(order_id, |o| o.payment_status = PaymentStatus::Pending)
					.await
				{
					tracing::error!(
						order_id,
						error = %rollback,
						"Failed to reset payment status after failed payment write"
					);
				}
				return Err(e.into());
			},
		};

		let message = format!("Payment of {} received for order #{}", amount, order.id);
		if let Err(e) = self.notifications.notify(&order, message).await {
			tracing::warn!(order_id, error = %e, "Failed to store payment notification");
		}

		tracing::info!(
			order_id,
			payment_id = payment.id,
			amount,
			method = %payment.payment_method,
			"Payment recorded"
		);
		Ok(Some(payment))
	}
}
