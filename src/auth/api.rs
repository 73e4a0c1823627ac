//! Authentication API Endpoints
//! Mission: Provide registration, login and identity endpoints

use crate::auth::{
    error::AuthError,
    jwt::JwtHandler,
    models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User},
    user_store::UserStore,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }

    /// Resolve a bearer token to the user it was issued for
    pub fn authenticate(&self, token: Option<&str>) -> Result<User, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let claims = self.jwt_handler.validate_token(token)?;

        self.user_store
            .get_user_by_email(&claims.email)?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Registration endpoint - POST /api/auth/register
pub async fn register(
    State(state): State<AuthState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    let Json(payload) = payload?;
    let user = state.user_store.register(payload)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let Json(payload) = payload?;
    let (Some(email), Some(password)) = (
        payload.email.filter(|e| !e.is_empty()),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AuthError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    info!("🔐 Login attempt: {}", email);

    let user = state
        .user_store
        .verify_password(&email, &password)
        .map_err(|err| {
            warn!("❌ Failed login attempt: {} ({})", email, err);
            err
        })?;

    let token = state.jwt_handler.generate_token(&user)?;

    info!("✅ Login successful: {} ({})", user.email, user.role);

    Ok(Json(LoginResponse { token, user }))
}

/// Current user - GET /api/auth/me
pub async fn get_current_user(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

/// Greeting for an authenticated user - GET /api/protected
pub async fn protected(Extension(user): Extension<User>) -> Json<Value> {
    Json(json!({
        "message": format!("Hello {}", user.display_name()),
        "user": user,
    }))
}
