//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::error;

use crate::api::state::AppState;
use crate::api::types::Json;

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// A single dependency check
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
}

/// Basic health check
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Vec::new(),
    })
}

/// Liveness probe
///
/// GET /live
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe - verifies the account store is reachable
///
/// GET /ready
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage_check = match state.accounts.list().await {
        Ok(_) => HealthCheck {
            name: "account_storage".to_string(),
            status: HealthStatus::Healthy,
            message: None,
        },
        Err(e) => {
            error!(error = %e, "Readiness check failed");
            HealthCheck {
                name: "account_storage".to_string(),
                status: HealthStatus::Unhealthy,
                message: Some(e.to_string()),
            }
        }
    };

    let overall = storage_check.status;
    let status_code = match overall {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status_code,
        Json(HealthResponse {
            status: overall,
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: vec![storage_check],
        }),
    )
}
