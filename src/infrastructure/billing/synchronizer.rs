//! Billing state synchronizer - applies provider webhook events to accounts

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::DomainError;
use crate::domain::account::{Account, AccountRepository};
use crate::domain::billing::{SubscriptionEvent, SubscriptionEventKind};
use crate::domain::plan::{SubscriptionPlan, SubscriptionStatus};

/// Applies subscription lifecycle events to the owning account.
///
/// Events are idempotent: replaying one converges on the same account
/// state. Events for unknown customers or unhandled kinds are ignored,
/// since the provider retries on non-2xx responses.
#[derive(Debug)]
pub struct BillingSynchronizer {
    accounts: Arc<dyn AccountRepository>,
}

impl BillingSynchronizer {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Apply a subscription event. Returns the updated account, or None
    /// when the event was ignored.
    pub async fn apply_event(
        &self,
        event: SubscriptionEvent,
    ) -> Result<Option<Account>, DomainError> {
        if let SubscriptionEventKind::Other(kind) = &event.kind {
            debug!(kind, "Ignoring unhandled billing event");
            return Ok(None);
        }

        let Some(mut account) = self
            .accounts
            .get_by_billing_customer_id(&event.customer_id)
            .await?
        else {
            warn!(
                customer_id = %event.customer_id,
                kind = %event.kind,
                "Billing event for unknown customer"
            );
            return Ok(None);
        };

        match event.kind {
            SubscriptionEventKind::Created | SubscriptionEventKind::Updated => {
                let subscription_id = event.subscription_id.ok_or_else(|| {
                    DomainError::validation("Subscription event is missing a subscription id")
                })?;

                // Unknown plans and statuses resolve to the most
                // restrictive values; seat accounting fails closed.
                let plan = event
                    .plan_lookup_key
                    .as_deref()
                    .map(SubscriptionPlan::from_lookup_key)
                    .unwrap_or_default();
                let status = event
                    .status
                    .as_deref()
                    .map(SubscriptionStatus::from_provider)
                    .unwrap_or(SubscriptionStatus::Inactive);

                account.apply_subscription(plan, status, subscription_id);
            }
            SubscriptionEventKind::Deleted => {
                account.downgrade_to_free();
            }
            SubscriptionEventKind::Other(_) => unreachable!(),
        }

        let account = self.accounts.update(&account).await?;

        info!(
            account_id = %account.id(),
            plan = %account.subscription_plan(),
            status = %account.subscription_status(),
            "Applied billing event"
        );

        Ok(Some(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::account::InMemoryAccountRepository;

    async fn setup() -> (Arc<InMemoryAccountRepository>, BillingSynchronizer, Account) {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let synchronizer = BillingSynchronizer::new(repo.clone());

        let owner = Account::new_owner(
            "owner@example.com",
            "hash",
            SubscriptionPlan::Free,
            Some("cus_123".to_string()),
        )
        .unwrap();
        repo.create(owner.clone()).await.unwrap();

        (repo, synchronizer, owner)
    }

    fn created_event(plan_key: &str, status: &str) -> SubscriptionEvent {
        SubscriptionEvent {
            kind: SubscriptionEventKind::Created,
            customer_id: "cus_123".to_string(),
            subscription_id: Some("sub_1".to_string()),
            status: Some(status.to_string()),
            plan_lookup_key: Some(plan_key.to_string()),
        }
    }

    #[tokio::test]
    async fn test_created_event_activates_plan() {
        let (_, synchronizer, _) = setup().await;

        let account = synchronizer
            .apply_event(created_event("hobby_monthly", "active"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(account.subscription_plan(), SubscriptionPlan::Hobby);
        assert_eq!(account.subscription_status(), SubscriptionStatus::Active);
        assert_eq!(account.billing_subscription_id(), Some("sub_1"));
    }

    #[tokio::test]
    async fn test_deleted_event_downgrades_to_free() {
        let (_, synchronizer, _) = setup().await;

        synchronizer
            .apply_event(created_event("pro_monthly", "active"))
            .await
            .unwrap();

        let account = synchronizer
            .apply_event(SubscriptionEvent {
                kind: SubscriptionEventKind::Deleted,
                customer_id: "cus_123".to_string(),
                subscription_id: Some("sub_1".to_string()),
                status: Some("canceled".to_string()),
                plan_lookup_key: None,
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(account.subscription_plan(), SubscriptionPlan::Free);
        assert_eq!(account.subscription_status(), SubscriptionStatus::Inactive);
        assert!(account.billing_subscription_id().is_none());
        assert_eq!(account.billing_customer_id(), Some("cus_123"));
    }

    #[tokio::test]
    async fn test_unknown_plan_fails_closed() {
        let (_, synchronizer, _) = setup().await;

        let account = synchronizer
            .apply_event(created_event("enterprise_yearly", "active"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(account.subscription_plan(), SubscriptionPlan::Free);
    }

    #[tokio::test]
    async fn test_unknown_customer_is_ignored() {
        let (_, synchronizer, _) = setup().await;

        let result = synchronizer
            .apply_event(SubscriptionEvent {
                kind: SubscriptionEventKind::Updated,
                customer_id: "cus_nobody".to_string(),
                subscription_id: Some("sub_1".to_string()),
                status: Some("active".to_string()),
                plan_lookup_key: Some("pro_monthly".to_string()),
            })
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unhandled_kind_is_ignored() {
        let (repo, synchronizer, owner) = setup().await;

        let result = synchronizer
            .apply_event(SubscriptionEvent {
                kind: SubscriptionEventKind::Other("invoice.paid".to_string()),
                customer_id: "cus_123".to_string(),
                subscription_id: None,
                status: None,
                plan_lookup_key: None,
            })
            .await
            .unwrap();

        assert!(result.is_none());
        let unchanged = repo.get(owner.id()).await.unwrap().unwrap();
        assert_eq!(unchanged.subscription_plan(), SubscriptionPlan::Free);
    }

    #[tokio::test]
    async fn test_replayed_event_is_idempotent() {
        let (_, synchronizer, _) = setup().await;
        let event = created_event("hobby_monthly", "active");

        let first = synchronizer
            .apply_event(event.clone())
            .await
            .unwrap()
            .unwrap();
        let second = synchronizer.apply_event(event).await.unwrap().unwrap();

        assert_eq!(first.subscription_plan(), second.subscription_plan());
        assert_eq!(first.subscription_status(), second.subscription_status());
        assert_eq!(
            first.billing_subscription_id(),
            second.billing_subscription_id()
        );
    }
}
