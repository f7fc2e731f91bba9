use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use explore_core::{Role, Session};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

pub const CUSTOMER_ROLE: &str = "CUSTOMER";
pub const ADMIN_ROLE: &str = "ADMIN";

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomerClaims {
    /// Email or phone number the visitor signed in with.
    pub sub: String,
    #[serde(default)]
    pub name: String,
    pub role: String,
    pub exp: usize,
}

impl CustomerClaims {
    pub fn session(&self) -> Session {
        Session {
            name: self.name.clone(),
            identifier: self.sub.clone(),
            role: Role::User,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

trait RoleClaim {
    fn role(&self) -> &str;
}

impl RoleClaim for CustomerClaims {
    fn role(&self) -> &str {
        &self.role
    }
}

impl RoleClaim for AdminClaims {
    fn role(&self) -> &str {
        &self.role
    }
}

fn verify<C: DeserializeOwned + RoleClaim>(
    state: &AppState,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    role: &str,
) -> Result<C, AppError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| AppError::AuthenticationError("Missing bearer token".to_string()))?;

    let token_data = decode::<C>(
        bearer.token(),
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthenticationError("Invalid or expired token".to_string()))?;

    if token_data.claims.role() != role {
        return Err(AppError::AuthorizationError(format!("{} access required", role)));
    }
    Ok(token_data.claims)
}

// ============================================================================
// Customer Authentication Middleware
// ============================================================================

pub async fn customer_auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims: CustomerClaims = verify(&state, bearer, CUSTOMER_ROLE)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// ============================================================================
// Admin Authentication Middleware
// ============================================================================

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims: AdminClaims = verify(&state, bearer, ADMIN_ROLE)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
