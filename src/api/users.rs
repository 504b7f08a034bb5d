//! Account management API endpoints
//!
//! Cohort-wide account listing, platform role changes, and account
//! deletion. All routes require authentication; authorization is
//! enforced in the account service.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
};
use serde::{Deserialize, Serialize};

use crate::api::auth::AccountResponse;
use crate::api::middleware::RequireAccount;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::account::{AccountId, AccountRole};

/// Create the account management router
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts))
        .route("/{account_id}/role", put(change_account_role))
        .route("/{account_id}", delete(delete_account))
}

#[derive(Debug, Deserialize)]
pub struct ChangeAccountRoleRequest {
    pub role: AccountRole,
}

#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountResponse>,
}

fn parse_account_id(raw: &str) -> Result<AccountId, ApiError> {
    AccountId::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// List the accounts in the caller's cohort
///
/// GET /users
pub async fn list_accounts(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
) -> Result<Json<AccountListResponse>, ApiError> {
    let accounts = state.account_service.list_cohort(&actor).await?;

    Ok(Json(AccountListResponse {
        accounts: accounts.iter().map(AccountResponse::from_account).collect(),
    }))
}

/// Change an account's platform role
///
/// PUT /users/{account_id}/role
pub async fn change_account_role(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path(account_id): Path<String>,
    Json(request): Json<ChangeAccountRoleRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = parse_account_id(&account_id)?;

    let account = state
        .account_service
        .change_role(&actor, &account_id, request.role)
        .await?;

    Ok(Json(AccountResponse::from_account(&account)))
}

/// Delete a seat-holder account, freeing its seat
///
/// DELETE /users/{account_id}
pub async fn delete_account(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path(account_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let account_id = parse_account_id(&account_id)?;
    state
        .account_service
        .delete_account(&actor, &account_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
