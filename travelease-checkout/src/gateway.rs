use async_trait::async_trait;
use std::time::Duration;
use travelease_core::{PaymentAdapter, PaymentIntent, PaymentStatus};
use uuid::Uuid;

/// Stand-in for a card processor: waits, then approves (or declines).
pub struct SimulatedPaymentGateway {
    delay: Duration,
    approve: bool,
}

impl SimulatedPaymentGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay, approve: true }
    }

    /// Always declines; for exercising the failure path
    pub fn declining(delay: Duration) -> Self {
        Self { delay, approve: false }
    }
}

#[async_trait]
impl PaymentAdapter for SimulatedPaymentGateway {
    async fn create_intent(
        &self,
        booking_id: Uuid,
        amount: u64,
        currency: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        Ok(PaymentIntent {
            id: format!("sim_pi_{}", booking_id.simple()),
            booking_id,
            amount,
            currency: currency.to_string(),
            status: PaymentStatus::RequiresPaymentMethod,
            created_at: chrono::Utc::now(),
        })
    }

    async fn process_payment(
        &self,
        intent: &PaymentIntent,
    ) -> Result<PaymentStatus, Box<dyn std::error::Error + Send + Sync>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        tracing::debug!("Simulated charge of {} {} for {}", intent.amount, intent.currency, intent.id);

        if self.approve {
            Ok(PaymentStatus::Succeeded)
        } else {
            Ok(PaymentStatus::Declined)
        }
    }
}
