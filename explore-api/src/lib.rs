use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod assistant;
pub mod auth;
pub mod checkout;
pub mod error;
pub mod events;
pub mod middleware;
pub mod sessions;
pub mod state;
pub mod tours;

pub use state::AppState;

use crate::middleware::{admin_auth_middleware, customer_auth_middleware};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::USER_AGENT]);

    // Signed-in visitors only.
    let customer = Router::new()
        .merge(tours::customer_routes())
        .merge(checkout::routes())
        .merge(assistant::routes())
        .route_layer(from_fn_with_state(state.clone(), customer_auth_middleware));

    let admin = Router::new()
        .merge(admin::routes())
        .merge(events::routes())
        .route_layer(from_fn_with_state(state.clone(), admin_auth_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(tours::routes())
        .merge(customer)
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
