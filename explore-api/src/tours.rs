use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use explore_catalog::{
    quote, Destination, HeroMedia, Inquiry, MediaSection, NewInquiry, NewReview, Quote, Review,
    Tour, TourCategory,
};
use explore_store::FEATURED_LIMIT;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::CustomerClaims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TourFilter {
    /// Comma separated, e.g. `Luxury,Premium`
    pub categories: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TourDetail {
    pub tour: Tour,
    pub destination: Option<Destination>,
    pub related: Vec<Tour>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct DestinationDetail {
    pub destination: Destination,
    pub tours: Vec<Tour>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub seats: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub section: Option<MediaSection>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/tours", get(list_tours))
        .route("/v1/tours/featured", get(featured_tours))
        .route("/v1/tours/{slug}", get(tour_detail))
        .route("/v1/tours/{slug}/quote", get(tour_quote))
        .route("/v1/destinations", get(list_destinations))
        .route("/v1/destinations/{id}", get(destination_detail))
        .route("/v1/hero-media", get(hero_media))
        .route("/v1/inquiries", post(create_inquiry))
}

/// Routes that need a customer token; layered by the caller.
pub fn customer_routes() -> Router<AppState> {
    Router::new().route("/v1/tours/{slug}/reviews", post(post_review))
}

fn parse_categories(raw: Option<&str>) -> Result<Vec<TourCategory>, AppError> {
    raw.unwrap_or_default()
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.parse::<TourCategory>().map_err(AppError::from))
        .collect()
}

async fn find_tour(state: &AppState, slug: &str) -> Result<Tour, AppError> {
    state
        .store
        .tour_by_slug(slug)
        .await
        .ok_or_else(|| AppError::NotFoundError(format!("Tour not found: {}", slug)))
}

/// GET /v1/tours?categories=
async fn list_tours(
    State(state): State<AppState>,
    Query(filter): Query<TourFilter>,
) -> Result<Json<Vec<Tour>>, AppError> {
    let categories = parse_categories(filter.categories.as_deref())?;
    Ok(Json(state.store.tours_in_categories(&categories).await))
}

async fn featured_tours(State(state): State<AppState>) -> Json<Vec<Tour>> {
    Json(state.store.featured_tours(FEATURED_LIMIT).await)
}

/// GET /v1/tours/{slug}
async fn tour_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TourDetail>, AppError> {
    let tour = find_tour(&state, &slug).await?;
    let destination = state.store.destination(tour.destination_id).await;
    let related = state.store.related_tours(&tour).await;
    let reviews = state.store.reviews_for_tour(tour.id).await;

    Ok(Json(TourDetail { tour, destination, related, reviews }))
}

/// GET /v1/tours/{slug}/quote?seats=
async fn tour_quote(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<Quote>, AppError> {
    let tour = find_tour(&state, &slug).await?;
    Ok(Json(quote(&tour, query.seats.unwrap_or(1))?))
}

async fn list_destinations(State(state): State<AppState>) -> Json<Vec<Destination>> {
    Json(state.store.destinations().await)
}

async fn destination_detail(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DestinationDetail>, AppError> {
    let destination = state
        .store
        .destination(id)
        .await
        .ok_or_else(|| AppError::NotFoundError(format!("Destination not found: {}", id)))?;
    let tours = state
        .store
        .tours()
        .await
        .into_iter()
        .filter(|t| t.destination_id == id)
        .collect();
    Ok(Json(DestinationDetail { destination, tours }))
}

/// GET /v1/hero-media?section=hero
async fn hero_media(
    State(state): State<AppState>,
    Query(query): Query<MediaQuery>,
) -> Json<Vec<HeroMedia>> {
    Json(state.store.hero_media(query.section).await)
}

async fn create_inquiry(
    State(state): State<AppState>,
    Json(req): Json<NewInquiry>,
) -> Result<(StatusCode, Json<Inquiry>), AppError> {
    let inquiry = state.store.add_inquiry(req).await?;
    Ok((StatusCode::CREATED, Json(inquiry)))
}

/// POST /v1/tours/{slug}/reviews. The reviewer name comes from the token.
async fn post_review(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(slug): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let tour = find_tour(&state, &slug).await?;
    let review = state
        .store
        .add_review(
            tour.id,
            NewReview {
                user_name: claims.name,
                rating: req.rating,
                comment: req.comment,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_list_parsing() {
        assert!(parse_categories(None).unwrap().is_empty());
        assert_eq!(
            parse_categories(Some("Luxury, premium")).unwrap(),
            vec![TourCategory::Luxury, TourCategory::Premium]
        );
        assert!(parse_categories(Some("Budget")).is_err());
    }
}
