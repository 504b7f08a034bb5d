use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use super::auth;
use super::billing;
use super::health;
use super::state::AppState;
use super::teams;
use super::users;

/// Create a minimal router without state (for testing/backward compatibility)
/// Note: /ready endpoint is not available without state
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .layer(TraceLayer::new_for_http())
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Authentication endpoints (registration and login are public)
        .nest("/auth", auth::create_auth_router())
        // Team and membership management
        .nest("/teams", teams::create_team_router())
        // Token-addressed invite routes; acceptance is public
        .nest("/invites", teams::create_invite_router())
        // Cohort-wide account management
        .nest("/users", users::create_users_router())
        // Billing provider webhooks
        .nest("/billing", billing::create_billing_router())
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
