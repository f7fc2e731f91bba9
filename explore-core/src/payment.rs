use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_CARD_DIGITS: usize = 16;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    RequiresPaymentMethod,
    Succeeded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentIntent {
    pub id: String, // e.g. pi_k3j9x
    pub client_secret: String,
    pub amount: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentConfirmation {
    pub status: PaymentStatus,
    pub transaction_id: String,
}

/// Card form input. Only the last four digits ever reach `Debug` output.
#[derive(Clone, Default, Deserialize)]
pub struct CardDetails {
    pub card_number: String,
    pub expiry: String,
    pub cvc: String,
    pub name: String,
}

impl CardDetails {
    /// Card number with grouping spaces and dashes removed. `None` when
    /// anything other than those and ASCII digits appears.
    pub fn digits(&self) -> Option<String> {
        let mut digits = String::with_capacity(self.card_number.len());
        for c in self.card_number.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' => {}
                _ => return None,
            }
        }
        Some(digits)
    }

    pub fn last_four(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().filter(char::is_ascii_digit).collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_number", &format!("**** {}", self.last_four()))
            .field("expiry", &self.expiry)
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PaymentError {
    #[error("Invalid card number.")]
    InvalidCard,
    #[error("Card declined.")]
    Declined,
    #[error("Unknown payment intent: {0}")]
    UnknownIntent(String),
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Payment provider contract used by checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for the order total
    async fn create_intent(&self, amount: f64, currency: &str) -> Result<PaymentIntent, PaymentError>;

    /// Confirm the intent identified by `client_secret` with card details
    async fn confirm_payment(
        &self,
        client_secret: &str,
        card: &CardDetails,
    ) -> Result<PaymentConfirmation, PaymentError>;
}
