//! Query layers over the generic storage for teams, memberships, and invites

use std::sync::Arc;

use crate::domain::DomainError;
use crate::domain::account::AccountId;
use crate::domain::invite::{InviteToken, TeamInvite};
use crate::domain::membership::{MembershipId, TeamMembership};
use crate::domain::storage::Storage;
use crate::domain::team::{Team, TeamId};

/// Team store with owner-scoped queries
#[derive(Debug)]
pub struct TeamStore {
    storage: Arc<dyn Storage<Team>>,
}

impl TeamStore {
    pub fn new(storage: Arc<dyn Storage<Team>>) -> Self {
        Self { storage }
    }

    pub async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        self.storage.get(id).await
    }

    pub async fn create(&self, team: Team) -> Result<Team, DomainError> {
        self.storage.create(team).await
    }

    pub async fn update(&self, team: Team) -> Result<Team, DomainError> {
        self.storage.update(team).await
    }

    pub async fn delete(&self, id: &TeamId) -> Result<bool, DomainError> {
        self.storage.delete(id).await
    }

    pub async fn list_owned_by(&self, owner_id: &AccountId) -> Result<Vec<Team>, DomainError> {
        let teams = self.storage.list().await?;
        Ok(teams
            .into_iter()
            .filter(|t| t.is_owned_by(owner_id))
            .collect())
    }
}

/// Membership store enforcing one membership per (team, account) pair
#[derive(Debug)]
pub struct MembershipStore {
    storage: Arc<dyn Storage<TeamMembership>>,
}

impl MembershipStore {
    pub fn new(storage: Arc<dyn Storage<TeamMembership>>) -> Self {
        Self { storage }
    }

    pub async fn get(&self, id: &MembershipId) -> Result<Option<TeamMembership>, DomainError> {
        self.storage.get(id).await
    }

    /// Find the membership linking an account to a team, if any
    pub async fn find(
        &self,
        team_id: &TeamId,
        account_id: &AccountId,
    ) -> Result<Option<TeamMembership>, DomainError> {
        let memberships = self.storage.list().await?;
        Ok(memberships
            .into_iter()
            .find(|m| m.team_id() == team_id && m.account_id() == account_id))
    }

    pub async fn create(&self, membership: TeamMembership) -> Result<TeamMembership, DomainError> {
        if self
            .find(membership.team_id(), membership.account_id())
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                "Account is already a member of this team",
            ));
        }

        self.storage.create(membership).await
    }

    pub async fn update(&self, membership: TeamMembership) -> Result<TeamMembership, DomainError> {
        self.storage.update(membership).await
    }

    pub async fn delete(&self, id: &MembershipId) -> Result<bool, DomainError> {
        self.storage.delete(id).await
    }

    pub async fn list_for_team(
        &self,
        team_id: &TeamId,
    ) -> Result<Vec<TeamMembership>, DomainError> {
        let memberships = self.storage.list().await?;
        Ok(memberships
            .into_iter()
            .filter(|m| m.team_id() == team_id)
            .collect())
    }

    pub async fn list_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<TeamMembership>, DomainError> {
        let memberships = self.storage.list().await?;
        Ok(memberships
            .into_iter()
            .filter(|m| m.account_id() == account_id)
            .collect())
    }

    /// Remove every membership of a team. Used when deleting the team.
    pub async fn delete_for_team(&self, team_id: &TeamId) -> Result<usize, DomainError> {
        let memberships = self.list_for_team(team_id).await?;
        let mut removed = 0;

        for membership in &memberships {
            if self.storage.delete(membership.id()).await? {
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Remove every membership of an account. Used when deleting the account.
    pub async fn delete_for_account(&self, account_id: &AccountId) -> Result<usize, DomainError> {
        let memberships = self.list_for_account(account_id).await?;
        let mut removed = 0;

        for membership in &memberships {
            if self.storage.delete(membership.id()).await? {
                removed += 1;
            }
        }

        Ok(removed)
    }
}

/// Invite store keyed by token
#[derive(Debug)]
pub struct InviteStore {
    storage: Arc<dyn Storage<TeamInvite>>,
}

impl InviteStore {
    pub fn new(storage: Arc<dyn Storage<TeamInvite>>) -> Self {
        Self { storage }
    }

    pub async fn get(&self, token: &InviteToken) -> Result<Option<TeamInvite>, DomainError> {
        self.storage.get(token).await
    }

    pub async fn create(&self, invite: TeamInvite) -> Result<TeamInvite, DomainError> {
        self.storage.create(invite).await
    }

    pub async fn delete(&self, token: &InviteToken) -> Result<bool, DomainError> {
        self.storage.delete(token).await
    }

    pub async fn list_for_team(&self, team_id: &TeamId) -> Result<Vec<TeamInvite>, DomainError> {
        let invites = self.storage.list().await?;
        Ok(invites
            .into_iter()
            .filter(|i| i.team_id() == team_id)
            .collect())
    }

    /// Remove every pending invite of a team. Used when deleting the team.
    pub async fn delete_for_team(&self, team_id: &TeamId) -> Result<usize, DomainError> {
        let invites = self.list_for_team(team_id).await?;
        let mut removed = 0;

        for invite in &invites {
            if self.storage.delete(invite.token()).await? {
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountRole;
    use crate::infrastructure::storage::InMemoryStorage;

    fn membership_store() -> MembershipStore {
        MembershipStore::new(Arc::new(InMemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_membership_uniqueness() {
        let store = membership_store();
        let team_id = TeamId::generate();
        let account_id = AccountId::generate();

        store
            .create(TeamMembership::new(
                team_id.clone(),
                account_id.clone(),
                AccountRole::Viewer,
            ))
            .await
            .unwrap();

        let result = store
            .create(TeamMembership::new(
                team_id,
                account_id,
                AccountRole::Admin,
            ))
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_membership_scoped_queries() {
        let store = membership_store();
        let team_a = TeamId::generate();
        let team_b = TeamId::generate();
        let account = AccountId::generate();

        store
            .create(TeamMembership::new(
                team_a.clone(),
                account.clone(),
                AccountRole::Viewer,
            ))
            .await
            .unwrap();
        store
            .create(TeamMembership::new(
                team_b.clone(),
                account.clone(),
                AccountRole::Viewer,
            ))
            .await
            .unwrap();
        store
            .create(TeamMembership::new(
                team_a.clone(),
                AccountId::generate(),
                AccountRole::Admin,
            ))
            .await
            .unwrap();

        assert_eq!(store.list_for_team(&team_a).await.unwrap().len(), 2);
        assert_eq!(store.list_for_account(&account).await.unwrap().len(), 2);
        assert!(store.find(&team_b, &account).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_membership_cascade_for_team() {
        let store = membership_store();
        let team_id = TeamId::generate();

        for _ in 0..3 {
            store
                .create(TeamMembership::new(
                    team_id.clone(),
                    AccountId::generate(),
                    AccountRole::Viewer,
                ))
                .await
                .unwrap();
        }

        assert_eq!(store.delete_for_team(&team_id).await.unwrap(), 3);
        assert!(store.list_for_team(&team_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_team_owner_scoped_listing() {
        let store = TeamStore::new(Arc::new(InMemoryStorage::new()));
        let owner = AccountId::generate();

        store
            .create(Team::new("Mine", owner.clone()).unwrap())
            .await
            .unwrap();
        store
            .create(Team::new("Theirs", AccountId::generate()).unwrap())
            .await
            .unwrap();

        let owned = store.list_owned_by(&owner).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name(), "Mine");
    }

    #[tokio::test]
    async fn test_invite_store_by_token() {
        let store = InviteStore::new(Arc::new(InMemoryStorage::new()));
        let team_id = TeamId::generate();

        let invite = store
            .create(TeamInvite::new(
                team_id.clone(),
                "invitee@example.com",
                AccountRole::Researcher,
            ))
            .await
            .unwrap();

        let fetched = store.get(invite.token()).await.unwrap().unwrap();
        assert_eq!(fetched.email(), "invitee@example.com");

        assert_eq!(store.list_for_team(&team_id).await.unwrap().len(), 1);
        assert!(store.delete(invite.token()).await.unwrap());
        assert!(store.get(invite.token()).await.unwrap().is_none());
    }
}
