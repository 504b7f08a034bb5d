//! Billing webhook endpoint
//!
//! Receives subscription lifecycle events from the billing provider and
//! feeds them to the billing synchronizer. The endpoint always answers
//! 200 for well-formed events it does not act on, so the provider stops
//! retrying them.

use axum::{Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::billing::{SubscriptionEvent, SubscriptionEventKind};

/// Create the billing router
pub fn create_billing_router() -> Router<AppState> {
    Router::new().route("/webhook", post(handle_webhook))
}

/// Webhook envelope in the provider's shape
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: WebhookObject,
}

/// The subscription object carried by the event
#[derive(Debug, Deserialize)]
pub struct WebhookObject {
    #[serde(default)]
    pub id: Option<String>,
    pub customer: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Option<WebhookItems>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookItems {
    #[serde(default)]
    pub data: Vec<WebhookItem>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookItem {
    #[serde(default)]
    pub price: Option<WebhookPrice>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPrice {
    #[serde(default)]
    pub lookup_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    /// True when the event changed an account's subscription state
    pub applied: bool,
}

impl WebhookPayload {
    fn into_event(self) -> SubscriptionEvent {
        let plan_lookup_key = self
            .data
            .object
            .items
            .and_then(|items| items.data.into_iter().next())
            .and_then(|item| item.price)
            .and_then(|price| price.lookup_key);

        SubscriptionEvent {
            kind: SubscriptionEventKind::parse(&self.event_type),
            customer_id: self.data.object.customer,
            subscription_id: self.data.object.id,
            status: self.data.object.status,
            plan_lookup_key,
        }
    }
}

/// Handle a billing provider webhook
///
/// POST /billing/webhook
pub async fn handle_webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let event = payload.into_event();
    debug!(kind = %event.kind, customer_id = %event.customer_id, "Received billing webhook");

    let updated = state.billing_synchronizer.apply_event(event).await?;

    Ok(Json(WebhookResponse {
        received: true,
        applied: updated.is_some(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_maps_to_event() {
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "type": "customer.subscription.updated",
            "data": {
                "object": {
                    "id": "sub_123",
                    "customer": "cus_456",
                    "status": "active",
                    "items": {
                        "data": [
                            { "price": { "lookup_key": "pro_monthly" } }
                        ]
                    }
                }
            }
        }))
        .unwrap();

        let event = payload.into_event();
        assert_eq!(event.kind, SubscriptionEventKind::Updated);
        assert_eq!(event.customer_id, "cus_456");
        assert_eq!(event.subscription_id.as_deref(), Some("sub_123"));
        assert_eq!(event.status.as_deref(), Some("active"));
        assert_eq!(event.plan_lookup_key.as_deref(), Some("pro_monthly"));
    }

    #[test]
    fn test_payload_without_items() {
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "type": "customer.subscription.deleted",
            "data": {
                "object": {
                    "id": "sub_123",
                    "customer": "cus_456"
                }
            }
        }))
        .unwrap();

        let event = payload.into_event();
        assert_eq!(event.kind, SubscriptionEventKind::Deleted);
        assert!(event.plan_lookup_key.is_none());
        assert!(event.status.is_none());
    }

    #[test]
    fn test_unhandled_event_type_parses() {
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "type": "invoice.paid",
            "data": {
                "object": {
                    "customer": "cus_456"
                }
            }
        }))
        .unwrap();

        let event = payload.into_event();
        assert!(matches!(event.kind, SubscriptionEventKind::Other(_)));
    }
}
