//! Seat governor - plan-based seat accounting for owner accounts.
//!
//! Seat checks and the writes they guard must not interleave for the same
//! owner, or two concurrent invite acceptances could both pass the check
//! and overshoot the plan limit. The governor hands out one async mutex
//! per owner; callers hold the guard across check and write.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::DomainError;
use crate::domain::account::{Account, AccountId, AccountRepository};

#[derive(Debug)]
pub struct SeatGovernor {
    accounts: Arc<dyn AccountRepository>,
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SeatGovernor {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self {
            accounts,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Acquire the per-owner seat lock.
    ///
    /// The guard must be held until every write that depends on the
    /// capacity check has completed.
    pub async fn lock_owner(
        &self,
        owner_id: &AccountId,
    ) -> Result<OwnedMutexGuard<()>, DomainError> {
        let lock = {
            let mut locks = self.locks.lock().map_err(|e| {
                DomainError::internal(format!("Seat lock registry poisoned: {}", e))
            })?;

            locks
                .entry(owner_id.as_str().to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        Ok(lock.lock_owned().await)
    }

    /// Check that the owner's plan has room for one more seat-holder.
    ///
    /// Callers must hold the owner's seat lock.
    pub async fn ensure_capacity(&self, owner: &Account) -> Result<(), DomainError> {
        let limit = owner.subscription_plan().max_seats();
        let occupied = self.accounts.count_seat_holders(owner.id()).await?;

        if occupied >= limit {
            return Err(DomainError::seat_limit_exceeded(format!(
                "Plan '{}' allows {} seats and all are taken",
                owner.subscription_plan(),
                limit
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountRole;
    use crate::domain::plan::SubscriptionPlan;
    use crate::infrastructure::account::InMemoryAccountRepository;

    async fn owner_with_members(
        repo: &Arc<InMemoryAccountRepository>,
        plan: SubscriptionPlan,
        members: usize,
    ) -> Account {
        let owner = Account::new_owner("owner@example.com", "hash", plan, None).unwrap();
        repo.create(owner.clone()).await.unwrap();

        for i in 0..members {
            let mut member =
                Account::new_invited(format!("m{i}@example.com"), AccountRole::Viewer).unwrap();
            member.link_to_owner(owner.id().clone(), None);
            repo.create(member).await.unwrap();
        }

        owner
    }

    #[tokio::test]
    async fn test_capacity_available() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let governor = SeatGovernor::new(repo.clone());
        let owner = owner_with_members(&repo, SubscriptionPlan::Free, 1).await;

        let _guard = governor.lock_owner(owner.id()).await.unwrap();
        assert!(governor.ensure_capacity(&owner).await.is_ok());
    }

    #[tokio::test]
    async fn test_capacity_exhausted() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let governor = SeatGovernor::new(repo.clone());
        let owner = owner_with_members(&repo, SubscriptionPlan::Free, 2).await;

        let _guard = governor.lock_owner(owner.id()).await.unwrap();
        let result = governor.ensure_capacity(&owner).await;

        assert!(matches!(
            result.unwrap_err(),
            DomainError::SeatLimitExceeded { .. }
        ));
    }

    #[tokio::test]
    async fn test_lock_serializes_same_owner() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let governor = Arc::new(SeatGovernor::new(repo.clone()));
        let owner = owner_with_members(&repo, SubscriptionPlan::Free, 0).await;

        let guard = governor.lock_owner(owner.id()).await.unwrap();

        let contender = {
            let governor = governor.clone();
            let owner_id = owner.id().clone();
            tokio::spawn(async move { governor.lock_owner(&owner_id).await.map(|_| ()) })
        };

        // The second acquisition cannot complete while the guard is held
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_locks_for_different_owners_are_independent() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let governor = SeatGovernor::new(repo.clone());

        let a = AccountId::generate();
        let b = AccountId::generate();

        let _guard_a = governor.lock_owner(&a).await.unwrap();
        let _guard_b = governor.lock_owner(&b).await.unwrap();
    }
}
