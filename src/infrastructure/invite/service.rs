//! Invite lifecycle service - issuing, accepting, and revoking team invites

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::DomainError;
use crate::domain::account::{
    Account, AccountRepository, AccountRole, normalize_email, validate_email,
};
use crate::domain::authorization;
use crate::domain::invite::{InviteToken, TeamInvite};
use crate::domain::membership::TeamMembership;
use crate::domain::team::{Team, TeamId};
use crate::infrastructure::notifier::Notifier;
use crate::infrastructure::seats::SeatGovernor;
use crate::infrastructure::team::{InviteStore, MembershipStore, TeamStore};

/// Result of a successful invite acceptance
#[derive(Debug)]
pub struct InviteAcceptance {
    pub account: Account,
    pub membership: TeamMembership,
    pub team: Team,
    /// True when a fresh account was provisioned for the invitee
    pub account_created: bool,
}

/// Invite lifecycle service
#[derive(Debug)]
pub struct InviteService {
    accounts: Arc<dyn AccountRepository>,
    teams: Arc<TeamStore>,
    memberships: Arc<MembershipStore>,
    invites: Arc<InviteStore>,
    seats: Arc<SeatGovernor>,
    notifier: Arc<dyn Notifier>,
    /// Base URL the invite token is appended to in notifications
    accept_url_base: String,
}

impl InviteService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        teams: Arc<TeamStore>,
        memberships: Arc<MembershipStore>,
        invites: Arc<InviteStore>,
        seats: Arc<SeatGovernor>,
        notifier: Arc<dyn Notifier>,
        accept_url_base: impl Into<String>,
    ) -> Self {
        Self {
            accounts,
            teams,
            memberships,
            invites,
            seats,
            notifier,
            accept_url_base: accept_url_base.into(),
        }
    }

    /// Issue an invite to join a team.
    ///
    /// Notification delivery is fire-and-forget; a failed send leaves a
    /// valid invite the owner can re-send or revoke.
    pub async fn issue(
        &self,
        actor: &Account,
        team_id: &TeamId,
        email: &str,
        role: AccountRole,
    ) -> Result<TeamInvite, DomainError> {
        let team = self.get_team(team_id).await?;

        if !authorization::can_manage_invites(actor, &team) {
            return Err(DomainError::forbidden(
                "Only the team owner may issue invites",
            ));
        }

        if !role.is_assignable() {
            return Err(DomainError::validation(format!(
                "Role '{}' cannot be granted through an invite",
                role
            )));
        }

        let email = normalize_email(email);
        validate_email(&email).map_err(|e| DomainError::validation(e.to_string()))?;

        if let Some(existing) = self.accounts.get_by_email(&email).await?
            && self.memberships.find(team_id, existing.id()).await?.is_some()
        {
            return Err(DomainError::conflict(
                "Account is already a member of this team",
            ));
        }

        let invite = self
            .invites
            .create(TeamInvite::new(team_id.clone(), email, role))
            .await?;

        info!(team_id = %team_id, role = %role, "Issued team invite");

        let notifier = self.notifier.clone();
        let invitee = invite.email().to_string();
        let team_name = team.name().to_string();
        let accept_url = format!(
            "{}/{}",
            self.accept_url_base.trim_end_matches('/'),
            invite.token()
        );
        tokio::spawn(async move {
            if let Err(e) = notifier.send_invite(&invitee, &team_name, &accept_url).await {
                warn!(error = %e, "Failed to deliver invite notification");
            }
        });

        Ok(invite)
    }

    /// List a team's pending invites. Restricted to the team owner.
    pub async fn list_for_team(
        &self,
        actor: &Account,
        team_id: &TeamId,
    ) -> Result<Vec<TeamInvite>, DomainError> {
        let team = self.get_team(team_id).await?;

        if !authorization::can_manage_invites(actor, &team) {
            return Err(DomainError::forbidden(
                "Only the team owner may list invites",
            ));
        }

        self.invites.list_for_team(team_id).await
    }

    /// Revoke a pending invite. Restricted to the team owner.
    pub async fn revoke(&self, actor: &Account, token: &InviteToken) -> Result<(), DomainError> {
        let invite = self
            .invites
            .get(token)
            .await?
            .ok_or_else(|| DomainError::not_found("Invite not found"))?;

        let team = self.get_team(invite.team_id()).await?;

        if !authorization::can_manage_invites(actor, &team) {
            return Err(DomainError::forbidden(
                "Only the team owner may revoke invites",
            ));
        }

        self.invites.delete(token).await?;
        info!(team_id = %team.id(), "Revoked team invite");

        Ok(())
    }

    /// Accept an invite by token.
    ///
    /// Possession of the token is the only credential required. The
    /// owner's seat lock is held across the capacity check and every
    /// write it guards, so concurrent acceptances cannot overshoot the
    /// plan limit. Consumed invites are deleted; the token is single-use.
    pub async fn accept(&self, token: &InviteToken) -> Result<InviteAcceptance, DomainError> {
        let invite = self
            .invites
            .get(token)
            .await?
            .ok_or_else(|| DomainError::not_found("Invite not found"))?;

        let team = self.get_team(invite.team_id()).await?;

        let owner = self
            .accounts
            .get(team.owner_account_id())
            .await?
            .ok_or_else(|| {
                DomainError::internal(format!("Team '{}' has no owner account", team.id()))
            })?;

        let existing = self.accounts.get_by_email(invite.email()).await?;

        if let Some(account) = &existing
            && self
                .memberships
                .find(team.id(), account.id())
                .await?
                .is_some()
        {
            return Err(DomainError::conflict(
                "Account is already a member of this team",
            ));
        }

        // Held until the membership and account writes are done
        let _seat_guard = self.seats.lock_owner(owner.id()).await?;

        let needs_seat = match &existing {
            Some(account) => !account.is_seat_holder_of(owner.id()),
            None => true,
        };

        if needs_seat {
            self.seats.ensure_capacity(&owner).await?;
        }

        let account_created = existing.is_none();
        let mut account = match existing {
            Some(account) => account,
            // The invitee's role comes from the invite; pre-existing
            // accounts keep the role they already have.
            None => {
                let account = Account::new_invited(invite.email(), invite.role())?;
                self.accounts.create(account).await?
            }
        };

        let membership = match self
            .memberships
            .create(TeamMembership::new(
                team.id().clone(),
                account.id().clone(),
                invite.role(),
            ))
            .await
        {
            Ok(membership) => membership,
            Err(e) => {
                self.roll_back_account(&account, account_created).await;
                return Err(e);
            }
        };

        if needs_seat {
            account.link_to_owner(
                owner.id().clone(),
                owner.billing_subscription_id().map(String::from),
            );

            if let Err(e) = self.accounts.update(&account).await {
                let _ = self.memberships.delete(membership.id()).await;
                self.roll_back_account(&account, account_created).await;
                return Err(e);
            }
        }

        if !self.invites.delete(token).await? {
            // Lost a race with revocation; the membership stands
            warn!(team_id = %team.id(), "Accepted invite was concurrently removed");
        }

        info!(
            team_id = %team.id(),
            account_id = %account.id(),
            account_created,
            "Accepted team invite"
        );

        Ok(InviteAcceptance {
            account,
            membership,
            team,
            account_created,
        })
    }

    async fn roll_back_account(&self, account: &Account, created: bool) {
        if created
            && let Err(e) = self.accounts.delete(account.id()).await
        {
            warn!(account_id = %account.id(), error = %e, "Failed to roll back provisioned account");
        }
    }

    async fn get_team(&self, team_id: &TeamId) -> Result<Team, DomainError> {
        self.teams
            .get(team_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", team_id)))
    }
}
