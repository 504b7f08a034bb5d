//! Authentication API endpoints
//!
//! Registration, login, password setup for invited accounts, and the
//! current-account endpoint.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireAccount;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::account::Account;
use crate::infrastructure::account::RegisterOwnerRequest;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/set-password", post(set_password))
        .route("/me", get(get_current_account))
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub plan_lookup_key: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password setup request for invite-provisioned accounts
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub email: String,
    pub password: String,
}

/// Session response with a fresh token
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub account: AccountResponse,
    pub expires_at: String,
}

/// Account response (safe to expose)
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_account_id: Option<String>,
    pub subscription_plan: String,
    pub subscription_status: String,
    pub needs_password_setup: bool,
    pub created_at: String,
}

impl AccountResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id().as_str().to_string(),
            email: account.email().to_string(),
            role: account.role().to_string(),
            owner_account_id: account.owner_account_id().map(|id| id.as_str().to_string()),
            subscription_plan: account.subscription_plan().to_string(),
            subscription_status: account.subscription_status().to_string(),
            needs_password_setup: account.needs_password_setup(),
            created_at: account.created_at().to_rfc3339(),
        }
    }
}

fn session_response(state: &AppState, account: &Account) -> Result<SessionResponse, ApiError> {
    let token = state.jwt_service.generate(account).map_err(ApiError::from)?;
    let expires_at = Utc::now() + Duration::hours(state.jwt_service.expiration_hours() as i64);

    Ok(SessionResponse {
        token,
        account: AccountResponse::from_account(account),
        expires_at: expires_at.to_rfc3339(),
    })
}

/// Register a new owner account
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let account = state
        .account_service
        .register_owner(RegisterOwnerRequest {
            email: request.email,
            password: request.password,
            plan_lookup_key: request.plan_lookup_key,
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
        })
        .await?;

    Ok(Json(session_response(&state, &account)?))
}

/// Login with email and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let account = state
        .account_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(session_response(&state, &account)?))
}

/// Complete password setup for an invite-provisioned account
///
/// POST /auth/set-password
///
/// Returns a session so the invitee lands logged in.
pub async fn set_password(
    State(state): State<AppState>,
    Json(request): Json<SetPasswordRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let account = state
        .account_service
        .set_password(&request.email, &request.password)
        .await?;

    Ok(Json(session_response(&state, &account)?))
}

/// Get the current authenticated account
///
/// GET /auth/me
pub async fn get_current_account(
    RequireAccount(account): RequireAccount,
) -> Result<Json<AccountResponse>, ApiError> {
    Ok(Json(AccountResponse::from_account(&account)))
}
