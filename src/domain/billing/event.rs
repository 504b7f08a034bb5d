//! Subscription lifecycle events

use serde::{Deserialize, Serialize};

/// Kind of a subscription lifecycle event, parsed from the provider's
/// dotted event type string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionEventKind {
    Created,
    Updated,
    Deleted,
    /// Any event type this service does not act on
    Other(String),
}

impl SubscriptionEventKind {
    pub fn parse(event_type: &str) -> Self {
        match event_type {
            "customer.subscription.created" => Self::Created,
            "customer.subscription.updated" => Self::Updated,
            "customer.subscription.deleted" => Self::Deleted,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for SubscriptionEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "customer.subscription.created"),
            Self::Updated => write!(f, "customer.subscription.updated"),
            Self::Deleted => write!(f, "customer.subscription.deleted"),
            Self::Other(t) => write!(f, "{t}"),
        }
    }
}

/// Normalized subscription event as consumed by the billing synchronizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEvent {
    pub kind: SubscriptionEventKind,
    /// Provider-side customer identifier
    pub customer_id: String,
    /// Provider-side subscription identifier
    pub subscription_id: Option<String>,
    /// Provider-reported subscription status, e.g. "active" or "past_due"
    pub status: Option<String>,
    /// Lookup key of the priced plan, e.g. "hobby_monthly"
    pub plan_lookup_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_parsing() {
        assert_eq!(
            SubscriptionEventKind::parse("customer.subscription.created"),
            SubscriptionEventKind::Created
        );
        assert_eq!(
            SubscriptionEventKind::parse("customer.subscription.updated"),
            SubscriptionEventKind::Updated
        );
        assert_eq!(
            SubscriptionEventKind::parse("customer.subscription.deleted"),
            SubscriptionEventKind::Deleted
        );
        assert_eq!(
            SubscriptionEventKind::parse("invoice.paid"),
            SubscriptionEventKind::Other("invoice.paid".to_string())
        );
    }

    #[test]
    fn test_event_kind_display_roundtrip() {
        for raw in [
            "customer.subscription.created",
            "customer.subscription.deleted",
            "invoice.paid",
        ] {
            assert_eq!(SubscriptionEventKind::parse(raw).to_string(), raw);
        }
    }
}
