use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use explore_catalog::{
    Booking, Destination, DestinationPatch, HeroMedia, Inquiry, InquiryStatus, NewDestination,
    NewTour, SeatAvailability, Tour, TourPatch,
};
use explore_core::User;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::middleware::AdminClaims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// One line of the admin plan table.
#[derive(Debug, Serialize)]
pub struct TourRow {
    #[serde(flatten)]
    pub tour: Tour,
    pub availability: SeatAvailability,
    pub seats_taken: u32,
    pub sold_out: bool,
    /// Share of capacity already sold, 0.0 to 1.0.
    pub utilization: f64,
}

impl From<Tour> for TourRow {
    fn from(tour: Tour) -> Self {
        let availability = SeatAvailability::of(&tour);
        Self {
            seats_taken: availability.taken(),
            sold_out: availability.is_sold_out(),
            utilization: availability.utilization(),
            availability,
            tour,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InquiryStatusRequest {
    pub status: InquiryStatus,
}

/// Every route here sits behind the admin middleware; layered by the caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/tours", get(list_tours).post(create_tour))
        .route("/v1/admin/tours/{id}", put(update_tour).delete(delete_tour))
        .route("/v1/admin/destinations", post(create_destination))
        .route("/v1/admin/destinations/{id}", patch(update_destination))
        .route("/v1/admin/hero-media", get(list_hero_media).put(replace_hero_media))
        .route("/v1/admin/hero-media/{id}", delete(delete_hero_media))
        .route("/v1/admin/inquiries", get(list_inquiries))
        .route("/v1/admin/inquiries/{id}", patch(update_inquiry))
        .route("/v1/admin/users", get(list_users))
        .route("/v1/admin/bookings", get(list_bookings))
}

// ============================================================================
// Tour Plans
// ============================================================================

/// GET /v1/admin/tours
async fn list_tours(State(state): State<AppState>) -> Json<Vec<TourRow>> {
    let rows = state
        .store
        .tours()
        .await
        .into_iter()
        .map(TourRow::from)
        .collect();
    Json(rows)
}

/// POST /v1/admin/tours
async fn create_tour(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminClaims>,
    Json(req): Json<NewTour>,
) -> Result<(StatusCode, Json<Tour>), AppError> {
    let tour = state.store.add_tour(req).await?;
    info!(admin = %admin.sub, tour_id = tour.id, "tour plan published");
    Ok((StatusCode::CREATED, Json(tour)))
}

/// PUT /v1/admin/tours/{id}
async fn update_tour(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<TourPatch>,
) -> Result<Json<Tour>, AppError> {
    Ok(Json(state.store.update_tour(id, req).await?))
}

/// DELETE /v1/admin/tours/{id}
async fn delete_tour(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_tour(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFoundError(format!("Tour not found: {}", id)))
    }
}

// ============================================================================
// Destinations
// ============================================================================

async fn create_destination(
    State(state): State<AppState>,
    Json(req): Json<NewDestination>,
) -> Result<(StatusCode, Json<Destination>), AppError> {
    let destination = state.store.add_destination(req).await?;
    Ok((StatusCode::CREATED, Json(destination)))
}

/// PATCH /v1/admin/destinations/{id}. Used for gallery edits.
async fn update_destination(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<DestinationPatch>,
) -> Result<Json<Destination>, AppError> {
    Ok(Json(state.store.update_destination(id, req).await?))
}

// ============================================================================
// Hero Media
// ============================================================================

async fn list_hero_media(State(state): State<AppState>) -> Json<Vec<HeroMedia>> {
    Json(state.store.hero_media(None).await)
}

/// PUT /v1/admin/hero-media. Replaces the whole list.
async fn replace_hero_media(
    State(state): State<AppState>,
    Json(req): Json<Vec<HeroMedia>>,
) -> Result<Json<Vec<HeroMedia>>, AppError> {
    Ok(Json(state.store.replace_hero_media(req).await?))
}

async fn delete_hero_media(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    if state.store.remove_hero_media(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFoundError(format!("Hero media not found: {}", id)))
    }
}

// ============================================================================
// Inquiries, Users, Bookings
// ============================================================================

async fn list_inquiries(State(state): State<AppState>) -> Json<Vec<Inquiry>> {
    Json(state.store.inquiries().await)
}

/// PATCH /v1/admin/inquiries/{id}
async fn update_inquiry(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<InquiryStatusRequest>,
) -> Result<Json<Inquiry>, AppError> {
    Ok(Json(state.store.set_inquiry_status(id, req.status).await?))
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.store.users().await)
}

async fn list_bookings(State(state): State<AppState>) -> Json<Vec<Booking>> {
    Json(state.store.bookings().await)
}
