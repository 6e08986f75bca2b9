use std::sync::Arc;
use tracing::{info, warn};
use travelease_cart::CartStore;
use travelease_core::{PaymentAdapter, PaymentStatus};
use travelease_session::SessionStore;
use travelease_store::CheckoutConfig;
use uuid::Uuid;

use crate::form;
use crate::models::{BookingConfirmation, OrderSummary, PaymentDetails};

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Please sign in to complete your booking")]
    SignInRequired,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Invalid payment details: {0}")]
    InvalidPayment(String),

    #[error("Payment was not approved ({0:?})")]
    PaymentDeclined(PaymentStatus),

    #[error("Payment failed: {0}")]
    PaymentFailed(String),
}

/// Turns the cart into a confirmed booking.
///
/// Only a successful payment touches the cart (it is cleared); every error
/// leaves it exactly as it was.
pub struct CheckoutService {
    payments: Arc<dyn PaymentAdapter>,
    tax_rate: f64,
    currency: String,
}

impl CheckoutService {
    pub fn new(payments: Arc<dyn PaymentAdapter>, tax_rate: f64, currency: impl Into<String>) -> Self {
        Self {
            payments,
            tax_rate,
            currency: currency.into(),
        }
    }

    pub fn from_config(payments: Arc<dyn PaymentAdapter>, config: &CheckoutConfig) -> Self {
        Self::new(payments, config.tax_rate, config.currency.clone())
    }

    pub fn summarize(&self, cart: &CartStore) -> OrderSummary {
        OrderSummary::from_lines(cart.lines(), self.tax_rate, &self.currency)
    }

    pub async fn checkout(
        &self,
        session: &SessionStore,
        cart: &mut CartStore,
        payment: &PaymentDetails,
    ) -> Result<BookingConfirmation, CheckoutError> {
        let customer = session.current().ok_or(CheckoutError::SignInRequired)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        form::validate(payment).map_err(CheckoutError::InvalidPayment)?;

        let summary = self.summarize(cart);
        let booking_id = Uuid::new_v4();
        info!(
            "Checking out {} item(s) for {}: {} {}",
            summary.item_count, customer.email, summary.total, summary.currency
        );

        let intent = self
            .payments
            .create_intent(booking_id, summary.total, &summary.currency)
            .await
            .map_err(|e| CheckoutError::PaymentFailed(e.to_string()))?;

        let status = self
            .payments
            .process_payment(&intent)
            .await
            .map_err(|e| {
                warn!("Payment {} errored: {}", intent.id, e);
                CheckoutError::PaymentFailed(e.to_string())
            })?;

        if status != PaymentStatus::Succeeded {
            warn!("Payment {} ended as {:?}; cart kept", intent.id, status);
            return Err(CheckoutError::PaymentDeclined(status));
        }

        cart.clear();
        let confirmation =
            BookingConfirmation::new(booking_id, intent.id, customer.email.clone(), summary);
        info!("Booking {} confirmed", confirmation.reference);

        Ok(confirmation)
    }
}
