use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use explore_catalog::SeatAvailability;
use explore_core::payment::CardDetails;
use explore_core::AuthGate;
use explore_order::{start_checkout, CheckoutError, CheckoutResult, CheckoutSession};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CustomerClaims;
use crate::sessions::Owned;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartCheckoutRequest {
    pub tour_id: u64,
    #[serde(default = "one_seat")]
    pub seats: u32,
}

fn one_seat() -> u32 {
    1
}

/// All checkout routes need a customer token; layered by the caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/checkout", post(create_checkout))
        .route("/v1/checkout/{id}", get(get_checkout))
        .route("/v1/checkout/{id}/intent", post(request_intent))
        .route("/v1/checkout/{id}/confirm", post(confirm_payment))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFoundError(format!("Checkout not found: {}", id))
}

/// A payment failure leaves the session in `failed`; the caller reads that
/// from the returned session rather than from an error status.
fn settle<T>(result: CheckoutResult<T>) -> Result<(), AppError> {
    match result {
        Ok(_) | Err(CheckoutError::Payment(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// POST /v1/checkout. Opens a session for the signed-in customer and moves
/// it straight to order review.
async fn create_checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<StartCheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutSession>), AppError> {
    let tour = state
        .store
        .tour(req.tour_id)
        .await
        .ok_or_else(|| AppError::NotFoundError(format!("Tour not found: {}", req.tour_id)))?;

    // Seats are not held; the booking goes through even when oversold.
    if !SeatAvailability::of(&tour).can_seat(req.seats) {
        warn!(tour_id = tour.id, seats = req.seats, available = tour.available_seats, "checkout exceeds available seats");
    }

    let gate = AuthGate::new();
    gate.login(claims.session());
    let mut session = start_checkout(&gate, tour).await?;
    session.set_seats(req.seats)?;
    session.review()?;

    info!(checkout_id = %session.id, tour_id = session.tour.id, seats = session.seats, "checkout opened");
    state.checkouts.insert(session.id, &claims.sub, session.clone()).await;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn find_checkout(state: &AppState, id: Uuid, owner: &str) -> Result<Arc<Owned<CheckoutSession>>, AppError> {
    state.checkouts.get(id, owner).await.ok_or_else(|| not_found(id))
}

async fn get_checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<CheckoutSession>, AppError> {
    let entry = find_checkout(&state, id, &claims.sub).await?;
    let session = entry.lock().await;
    Ok(Json(session.clone()))
}

/// POST /v1/checkout/{id}/intent
async fn request_intent(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<CheckoutSession>, AppError> {
    let entry = find_checkout(&state, id, &claims.sub).await?;
    let amount = entry.lock().await.begin_intent()?;

    let outcome = state.payments.initialize_payment(amount).await;

    let mut session = entry.lock().await;
    settle(session.finish_intent(outcome))?;
    if session.is_terminal() {
        entry.mark_settled();
    }
    Ok(Json(session.clone()))
}

/// POST /v1/checkout/{id}/confirm
async fn confirm_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(id): Path<Uuid>,
    Json(card): Json<CardDetails>,
) -> Result<Json<CheckoutSession>, AppError> {
    let entry = find_checkout(&state, id, &claims.sub).await?;
    let client_secret = entry.lock().await.begin_confirm()?;

    let outcome = state.payments.confirm_payment(&client_secret, &card).await;

    let mut session = entry.lock().await;
    settle(session.finish_confirm(outcome, &state.store).await)?;
    if session.is_terminal() {
        entry.mark_settled();
    }
    Ok(Json(session.clone()))
}
