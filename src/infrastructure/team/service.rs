//! Team service - team CRUD and membership management

use std::sync::Arc;

use tracing::info;

use crate::domain::DomainError;
use crate::domain::account::{Account, AccountId, AccountRepository, AccountRole};
use crate::domain::authorization;
use crate::domain::membership::TeamMembership;
use crate::domain::team::{Team, TeamId};

use super::repository::{InviteStore, MembershipStore, TeamStore};

/// A team member: the membership plus the account behind it
#[derive(Debug)]
pub struct TeamMemberRecord {
    pub membership: TeamMembership,
    pub account: Account,
}

/// Team service
#[derive(Debug)]
pub struct TeamService {
    accounts: Arc<dyn AccountRepository>,
    teams: Arc<TeamStore>,
    memberships: Arc<MembershipStore>,
    invites: Arc<InviteStore>,
}

impl TeamService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        teams: Arc<TeamStore>,
        memberships: Arc<MembershipStore>,
        invites: Arc<InviteStore>,
    ) -> Self {
        Self {
            accounts,
            teams,
            memberships,
            invites,
        }
    }

    /// Create a team owned by the actor. Only owner accounts create
    /// teams; the owner gets an implicit membership in it.
    pub async fn create(&self, actor: &Account, name: &str) -> Result<Team, DomainError> {
        if !actor.is_owner() {
            return Err(DomainError::forbidden("Only owner accounts create teams"));
        }

        let team = Team::new(name, actor.id().clone())?;
        let team = self.teams.create(team).await?;

        self.memberships
            .create(TeamMembership::new(
                team.id().clone(),
                actor.id().clone(),
                AccountRole::Owner,
            ))
            .await?;

        info!(team_id = %team.id(), "Created team");
        Ok(team)
    }

    /// Get a team the actor can see (owner or member)
    pub async fn get_for(&self, actor: &Account, team_id: &TeamId) -> Result<Team, DomainError> {
        let team = self.get_team(team_id).await?;
        self.require_visible(actor, &team).await?;
        Ok(team)
    }

    /// List the teams the actor owns or is a member of
    pub async fn list_for(&self, actor: &Account) -> Result<Vec<Team>, DomainError> {
        let mut teams = self.teams.list_owned_by(actor.id()).await?;

        for membership in self.memberships.list_for_account(actor.id()).await? {
            if teams.iter().any(|t| t.id() == membership.team_id()) {
                continue;
            }
            if let Some(team) = self.teams.get(membership.team_id()).await? {
                teams.push(team);
            }
        }

        Ok(teams)
    }

    /// Rename a team. Restricted to the team owner.
    pub async fn rename(
        &self,
        actor: &Account,
        team_id: &TeamId,
        name: &str,
    ) -> Result<Team, DomainError> {
        let mut team = self.get_team(team_id).await?;

        if !team.is_owned_by(actor.id()) {
            return Err(DomainError::forbidden("Only the team owner may rename it"));
        }

        team.set_name(name)?;
        self.teams.update(team).await
    }

    /// List a team's members with their accounts
    pub async fn members(
        &self,
        actor: &Account,
        team_id: &TeamId,
    ) -> Result<Vec<TeamMemberRecord>, DomainError> {
        let team = self.get_team(team_id).await?;
        self.require_visible(actor, &team).await?;

        let memberships = self.memberships.list_for_team(team_id).await?;
        let mut records = Vec::with_capacity(memberships.len());

        for membership in memberships {
            let Some(account) = self.accounts.get(membership.account_id()).await? else {
                // Dangling membership; skip rather than fail the listing
                continue;
            };
            records.push(TeamMemberRecord {
                membership,
                account,
            });
        }

        Ok(records)
    }

    /// Assign an existing cohort account to a team.
    ///
    /// No seat check: the target already holds a seat on the team
    /// owner's plan. Seats are paid per account, not per team
    /// membership.
    pub async fn assign_to_team(
        &self,
        actor: &Account,
        team_id: &TeamId,
        account_id: &AccountId,
        role: AccountRole,
    ) -> Result<TeamMembership, DomainError> {
        let team = self.get_team(team_id).await?;
        let actor_membership = self.memberships.find(team_id, actor.id()).await?;

        if !authorization::can_manage_membership(actor, actor_membership.as_ref(), &team) {
            return Err(DomainError::forbidden(
                "Only the team owner or an admin member may assign members",
            ));
        }

        if !role.is_assignable() {
            return Err(DomainError::validation(format!(
                "Role '{}' cannot be assigned",
                role
            )));
        }

        let target = self
            .accounts
            .get(account_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Account '{}' not found", account_id)))?;

        if !target.is_seat_holder_of(team.owner_account_id()) {
            return Err(DomainError::forbidden(
                "Account does not hold a seat on this plan",
            ));
        }

        let membership = self
            .memberships
            .create(TeamMembership::new(
                team.id().clone(),
                target.id().clone(),
                role,
            ))
            .await?;

        info!(team_id = %team.id(), account_id = %target.id(), "Assigned account to team");
        Ok(membership)
    }

    /// Change a member's role within a team. Allowed for the team owner
    /// and admin members; the owner's own role is fixed.
    pub async fn change_member_role(
        &self,
        actor: &Account,
        team_id: &TeamId,
        account_id: &AccountId,
        new_role: AccountRole,
    ) -> Result<TeamMembership, DomainError> {
        let team = self.get_team(team_id).await?;
        let actor_membership = self.memberships.find(team_id, actor.id()).await?;
        let target = self
            .accounts
            .get(account_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Account '{}' not found", account_id)))?;

        if !authorization::can_change_member_role(
            actor,
            actor_membership.as_ref(),
            &team,
            &target,
            new_role,
        ) {
            return Err(DomainError::forbidden(
                "Not allowed to change this member's role",
            ));
        }

        let mut membership = self
            .memberships
            .find(team_id, account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Account is not a member of this team"))?;

        membership.set_role(new_role);
        let membership = self.memberships.update(membership).await?;

        info!(team_id = %team_id, account_id = %account_id, role = %new_role, "Changed member role");
        Ok(membership)
    }

    /// Remove a member from a team. Allowed for the team owner and admin
    /// members; the owner cannot be removed from its own team. The
    /// member's account and seat are untouched.
    pub async fn remove_member(
        &self,
        actor: &Account,
        team_id: &TeamId,
        account_id: &AccountId,
    ) -> Result<(), DomainError> {
        let team = self.get_team(team_id).await?;
        let actor_membership = self.memberships.find(team_id, actor.id()).await?;
        let target = self
            .accounts
            .get(account_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Account '{}' not found", account_id)))?;

        if !authorization::can_remove_member(actor, actor_membership.as_ref(), &team, &target) {
            return Err(DomainError::forbidden("Not allowed to remove this member"));
        }

        let membership = self
            .memberships
            .find(team_id, account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Account is not a member of this team"))?;

        self.memberships.delete(membership.id()).await?;

        info!(team_id = %team_id, account_id = %account_id, "Removed team member");
        Ok(())
    }

    /// Delete a team along with its memberships and pending invites.
    /// Member accounts keep their seats.
    pub async fn delete(&self, actor: &Account, team_id: &TeamId) -> Result<(), DomainError> {
        let team = self.get_team(team_id).await?;

        if !team.is_owned_by(actor.id()) {
            return Err(DomainError::forbidden("Only the team owner may delete it"));
        }

        let memberships = self.memberships.delete_for_team(team_id).await?;
        let invites = self.invites.delete_for_team(team_id).await?;
        self.teams.delete(team_id).await?;

        info!(
            team_id = %team_id,
            memberships_removed = memberships,
            invites_removed = invites,
            "Deleted team"
        );

        Ok(())
    }

    async fn get_team(&self, team_id: &TeamId) -> Result<Team, DomainError> {
        self.teams
            .get(team_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", team_id)))
    }

    async fn require_visible(&self, actor: &Account, team: &Team) -> Result<(), DomainError> {
        if team.is_owned_by(actor.id()) {
            return Ok(());
        }

        if self
            .memberships
            .find(team.id(), actor.id())
            .await?
            .is_some()
        {
            return Ok(());
        }

        // Hide the team's existence from non-members
        Err(DomainError::not_found(format!(
            "Team '{}' not found",
            team.id()
        )))
    }
}
