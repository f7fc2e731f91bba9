use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::{Duration, Utc};
use explore_core::identity::{validate_display_name, validate_password, Identifier};
use explore_shared::pii::Masked;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppError;
use crate::middleware::auth::{AdminClaims, CustomerClaims, ADMIN_ROLE, CUSTOMER_ROLE};
use crate::state::{AppState, AuthConfig};

pub const UNKNOWN_ACCOUNT: &str =
    "No account found with this identifier. Would you like to create one?";

/// Display name for a returning visitor whose record has no name.
const DEFAULT_NAME: &str = "Traveler";

#[derive(Debug, Deserialize)]
pub struct IdentifyRequest {
    pub identifier: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    Password,
    Signup,
}

#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
    pub exists: bool,
    pub next: NextStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub identifier: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub name: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/identify", post(identify))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/signup", post(signup))
        .route("/v1/admin/login", post(admin_login))
}

fn expiry(auth: &AuthConfig) -> usize {
    (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize
}

pub fn issue_customer_token(auth: &AuthConfig, identifier: &str, name: &str) -> Result<String, AppError> {
    let claims = CustomerClaims {
        sub: identifier.to_string(),
        name: name.to_string(),
        role: CUSTOMER_ROLE.to_owned(),
        exp: expiry(auth),
    };
    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))?)
}

pub fn issue_admin_token(auth: &AuthConfig, email: &str) -> Result<String, AppError> {
    let claims = AdminClaims {
        sub: email.to_string(),
        role: ADMIN_ROLE.to_owned(),
        exp: expiry(auth),
    };
    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))?)
}

/// First sign-in step: is this a known email or phone?
async fn identify(
    State(state): State<AppState>,
    Json(req): Json<IdentifyRequest>,
) -> Result<Json<IdentifyResponse>, AppError> {
    let identifier = Identifier::parse(&req.identifier)?;
    let exists = state.store.check_user_exists(identifier.as_str()).await;

    Ok(Json(if exists {
        IdentifyResponse { exists, next: NextStep::Password, message: None }
    } else {
        IdentifyResponse {
            exists,
            next: NextStep::Signup,
            message: Some(UNKNOWN_ACCOUNT.to_string()),
        }
    }))
}

/// Only the password length is checked; there is no credential store.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let identifier = Identifier::parse(&req.identifier)?;
    validate_password(&req.password)?;

    let Some(user) = state.store.find_user(identifier.as_str()).await else {
        warn!(identifier = %Masked(identifier.as_str()), "login for unknown account");
        return Err(AppError::NotFoundError(UNKNOWN_ACCOUNT.to_string()));
    };
    let name = if user.name.trim().is_empty() { DEFAULT_NAME.to_string() } else { user.name };

    let token = issue_customer_token(&state.auth, identifier.as_str(), &name)?;
    info!(identifier = %Masked(identifier.as_str()), "customer signed in");
    Ok(Json(AuthResponse { token, name }))
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let identifier = Identifier::parse(&req.identifier)?;
    validate_display_name(&req.name)?;
    validate_password(&req.password)?;

    let user = state.store.register_user(identifier.as_str(), req.name.trim()).await;
    let token = issue_customer_token(&state.auth, identifier.as_str(), &user.name)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, name: user.name })))
}

async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if req.email != state.admin.email || req.password != state.admin.password {
        warn!(email = %Masked(req.email.as_str()), "admin login rejected");
        return Err(AppError::AuthenticationError("Invalid admin credentials".to_string()));
    }
    let token = issue_admin_token(&state.auth, &req.email)?;
    info!("admin signed in");
    Ok(Json(AuthResponse { token, name: "Admin".to_string() }))
}
