use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use explore_core::payment::{
    CardDetails, PaymentConfirmation, PaymentError, PaymentGateway, PaymentIntent, PaymentStatus,
    MIN_CARD_DIGITS,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

/// Front door to the payment provider used by checkout.
pub struct PaymentOrchestrator {
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl PaymentOrchestrator {
    pub fn new(gateway: Arc<dyn PaymentGateway>, currency: impl Into<String>) -> Self {
        Self {
            gateway,
            currency: currency.into(),
        }
    }

    /// Create an intent for the order total in the configured currency
    pub async fn initialize_payment(&self, amount: f64) -> Result<PaymentIntent, PaymentError> {
        let intent = self.gateway.create_intent(amount, &self.currency).await?;
        info!(intent_id = %intent.id, amount, currency = %intent.currency, "payment intent created");
        Ok(intent)
    }

    pub async fn confirm_payment(
        &self,
        client_secret: &str,
        card: &CardDetails,
    ) -> Result<PaymentConfirmation, PaymentError> {
        match self.gateway.confirm_payment(client_secret, card).await {
            Ok(confirmation) => {
                info!(transaction_id = %confirmation.transaction_id, "payment confirmed");
                Ok(confirmation)
            }
            Err(e) => {
                warn!(card = ?card, "payment rejected: {}", e);
                Err(e)
            }
        }
    }
}

/// Stand-in for a card processor. Waits a configurable amount of time to
/// mimic network latency and approves every well-formed card.
pub struct MockPaymentGateway {
    intent_delay: Duration,
    confirm_delay: Duration,
}

impl MockPaymentGateway {
    pub fn new(intent_delay: Duration, confirm_delay: Duration) -> Self {
        Self {
            intent_delay,
            confirm_delay,
        }
    }

    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_millis(2000))
    }
}

fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_intent(&self, amount: f64, currency: &str) -> Result<PaymentIntent, PaymentError> {
        tokio::time::sleep(self.intent_delay).await;

        let id = format!("pi_{}", random_token());
        Ok(PaymentIntent {
            client_secret: format!("{}_secret_{}", id, random_token()),
            id,
            amount,
            currency: currency.to_string(),
            created_at: chrono::Utc::now(),
        })
    }

    async fn confirm_payment(
        &self,
        client_secret: &str,
        card: &CardDetails,
    ) -> Result<PaymentConfirmation, PaymentError> {
        tokio::time::sleep(self.confirm_delay).await;

        if !client_secret.starts_with("pi_") || !client_secret.contains("_secret_") {
            return Err(PaymentError::UnknownIntent(client_secret.to_string()));
        }
        match card.digits() {
            Some(digits) if digits.len() >= MIN_CARD_DIGITS => {}
            _ => return Err(PaymentError::InvalidCard),
        }

        Ok(PaymentConfirmation {
            status: PaymentStatus::Succeeded,
            transaction_id: format!("tx_{}", random_token()),
        })
    }
}
