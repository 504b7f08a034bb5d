//! Billing provider client

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;
use crate::domain::plan::SubscriptionPlan;

/// Trait for the billing provider operations this service performs.
///
/// The provider pushes subscription state back through webhooks; this
/// client only covers the calls made during registration.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BillingClient: Send + Sync + Debug {
    /// Register a customer with the provider and return its customer id
    async fn create_customer(
        &self,
        email: &str,
        plan: SubscriptionPlan,
    ) -> Result<String, DomainError>;
}

/// Billing client that mints local placeholder customer ids.
///
/// Used in development and tests, and when no provider is configured.
/// Ids follow the provider's "cus_" convention so downstream code and
/// webhook fixtures behave identically.
#[derive(Debug, Clone, Default)]
pub struct LocalBillingClient;

impl LocalBillingClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BillingClient for LocalBillingClient {
    async fn create_customer(
        &self,
        email: &str,
        plan: SubscriptionPlan,
    ) -> Result<String, DomainError> {
        let customer_id = format!("cus_{}", uuid::Uuid::new_v4().simple());
        debug!(email, %plan, customer_id, "Created local billing customer");
        Ok(customer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_customer_ids_are_unique() {
        let client = LocalBillingClient::new();

        let a = client
            .create_customer("a@example.com", SubscriptionPlan::Free)
            .await
            .unwrap();
        let b = client
            .create_customer("b@example.com", SubscriptionPlan::Free)
            .await
            .unwrap();

        assert!(a.starts_with("cus_"));
        assert_ne!(a, b);
    }
}
