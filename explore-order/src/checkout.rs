use explore_catalog::{quote, Booking, NewBooking, Quote, Tour};
use explore_core::payment::{CardDetails, PaymentConfirmation, PaymentError, PaymentIntent, PaymentStatus};
use explore_core::{AuthGate, CoreError};
use explore_store::Store;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::orchestrator::PaymentOrchestrator;

pub const INTENT_FAILURE: &str = "Failed to initialize payment system. Please try refreshing.";
pub const PAYMENT_FAILURE: &str = "Payment failed. Please check your details.";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutState {
    Selecting,
    ReviewingOrder { total: f64 },
    AwaitingPaymentIntent { total: f64 },
    AwaitingCardConfirmation { intent: PaymentIntent },
    Booked { booking: Booking, reference: String },
    /// Terminal. A new session is needed to try again.
    Failed { message: String },
}

impl CheckoutState {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::Selecting => "selecting",
            CheckoutState::ReviewingOrder { .. } => "reviewing_order",
            CheckoutState::AwaitingPaymentIntent { .. } => "awaiting_payment_intent",
            CheckoutState::AwaitingCardConfirmation { .. } => "awaiting_card_confirmation",
            CheckoutState::Booked { .. } => "booked",
            CheckoutState::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// One visitor's path from picking seats to a confirmed booking.
///
/// `Selecting -> ReviewingOrder -> AwaitingPaymentIntent -> AwaitingCardConfirmation -> Booked`,
/// with any payment error ending in `Failed`. A call made from the wrong
/// state returns `InvalidTransition` and leaves the session untouched.
///
/// The payment steps come in `begin_*`/`finish_*` pairs so a caller sharing
/// the session can release its lock while the gateway works.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub id: Uuid,
    pub tour: Tour,
    pub seats: u32,
    pub customer: Option<String>,
    pub state: CheckoutState,
}

/// Waits for the visitor to sign in, then opens a checkout for `tour`.
pub async fn start_checkout(gate: &AuthGate, tour: Tour) -> CheckoutResult<CheckoutSession> {
    let session = gate.require_login().await?;
    let mut checkout = CheckoutSession::select(tour);
    checkout.customer = Some(session.name);
    Ok(checkout)
}

impl CheckoutSession {
    pub fn select(tour: Tour) -> Self {
        Self {
            id: Uuid::new_v4(),
            tour,
            seats: 1,
            customer: None,
            state: CheckoutState::Selecting,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, CheckoutState::Booked { .. } | CheckoutState::Failed { .. })
    }

    fn invalid(&self, to: &'static str) -> CheckoutError {
        CheckoutError::InvalidTransition {
            from: self.state.name(),
            to,
        }
    }

    /// Clamped to at least one seat. Availability is not checked.
    pub fn set_seats(&mut self, seats: u32) -> CheckoutResult<u32> {
        if self.state != CheckoutState::Selecting {
            return Err(self.invalid("selecting"));
        }
        self.seats = seats.max(1);
        Ok(self.seats)
    }

    pub fn quote(&self) -> CheckoutResult<Quote> {
        Ok(quote(&self.tour, self.seats)?)
    }

    pub fn review(&mut self) -> CheckoutResult<f64> {
        if self.state != CheckoutState::Selecting {
            return Err(self.invalid("reviewing_order"));
        }
        let total = self.quote()?.total;
        self.state = CheckoutState::ReviewingOrder { total };
        Ok(total)
    }

    /// Moves to `AwaitingPaymentIntent` and returns the amount to charge.
    pub fn begin_intent(&mut self) -> CheckoutResult<f64> {
        let total = match self.state {
            CheckoutState::ReviewingOrder { total } => total,
            _ => return Err(self.invalid("awaiting_payment_intent")),
        };
        self.state = CheckoutState::AwaitingPaymentIntent { total };
        Ok(total)
    }

    pub fn finish_intent(
        &mut self,
        outcome: Result<PaymentIntent, PaymentError>,
    ) -> CheckoutResult<PaymentIntent> {
        if !matches!(self.state, CheckoutState::AwaitingPaymentIntent { .. }) {
            return Err(self.invalid("awaiting_card_confirmation"));
        }
        match outcome {
            Ok(intent) => {
                info!(checkout_id = %self.id, intent_id = %intent.id, "awaiting card confirmation");
                self.state = CheckoutState::AwaitingCardConfirmation { intent: intent.clone() };
                Ok(intent)
            }
            Err(e) => {
                warn!(checkout_id = %self.id, "payment intent failed: {}", e);
                self.state = CheckoutState::Failed { message: INTENT_FAILURE.to_string() };
                Err(e.into())
            }
        }
    }

    pub async fn request_intent(&mut self, payments: &PaymentOrchestrator) -> CheckoutResult<PaymentIntent> {
        let total = self.begin_intent()?;
        let outcome = payments.initialize_payment(total).await;
        self.finish_intent(outcome)
    }

    /// Client secret of the pending intent.
    pub fn begin_confirm(&self) -> CheckoutResult<String> {
        match &self.state {
            CheckoutState::AwaitingCardConfirmation { intent } => Ok(intent.client_secret.clone()),
            _ => Err(self.invalid("booked")),
        }
    }

    /// Records the booking on success. The total is recomputed from the
    /// session's tour snapshot; seats are not re-checked against the store.
    pub async fn finish_confirm(
        &mut self,
        outcome: Result<PaymentConfirmation, PaymentError>,
        store: &Store,
    ) -> CheckoutResult<Booking> {
        self.begin_confirm()?;

        let confirmation = match outcome {
            Ok(c) if c.status == PaymentStatus::Succeeded => c,
            Ok(c) => {
                warn!(checkout_id = %self.id, status = ?c.status, "payment not completed");
                self.state = CheckoutState::Failed { message: PAYMENT_FAILURE.to_string() };
                return Err(CheckoutError::Payment(PaymentError::Declined));
            }
            Err(e) => {
                self.state = CheckoutState::Failed { message: e.to_string() };
                return Err(e.into());
            }
        };

        let total = self.quote()?.total;
        let booking = store
            .add_booking(NewBooking {
                tour_id: self.tour.id,
                tour_title: self.tour.title.clone(),
                seats: self.seats,
                total_amount: total,
                transaction_id: confirmation.transaction_id.clone(),
            })
            .await;

        let reference = confirmation.transaction_id.to_uppercase();
        info!(checkout_id = %self.id, booking_id = booking.id, reference = %reference, "checkout booked");
        self.state = CheckoutState::Booked {
            booking: booking.clone(),
            reference,
        };
        Ok(booking)
    }

    pub async fn confirm(
        &mut self,
        payments: &PaymentOrchestrator,
        card: &CardDetails,
        store: &Store,
    ) -> CheckoutResult<Booking> {
        let client_secret = self.begin_confirm()?;
        let outcome = payments.confirm_payment(&client_secret, card).await;
        self.finish_confirm(outcome, store).await
    }
}
