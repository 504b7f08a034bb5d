//! Authorization rules for team and account management.
//!
//! These are pure predicates; callers load the relevant entities and pass
//! them in. Every rule fails closed: when in doubt, deny.

use crate::domain::account::{Account, AccountRole};
use crate::domain::membership::TeamMembership;
use crate::domain::team::Team;

/// Roles an invitee or member may be assigned. Ownership is never granted
/// through membership management.
pub const ASSIGNABLE_ROLES: [AccountRole; 3] = [
    AccountRole::Viewer,
    AccountRole::Researcher,
    AccountRole::Admin,
];

/// Only the team's owner may issue or revoke invites for it.
pub fn can_manage_invites(actor: &Account, team: &Team) -> bool {
    team.is_owned_by(actor.id())
}

/// The team's owner, or a member holding an admin membership on the team,
/// may add, remove, or re-role members.
pub fn can_manage_membership(
    actor: &Account,
    actor_membership: Option<&TeamMembership>,
    team: &Team,
) -> bool {
    team.is_owned_by(actor.id())
        || actor_membership
            .is_some_and(|m| m.team_id() == team.id() && m.role() == AccountRole::Admin)
}

/// Members may be removed by anyone who manages the team's membership,
/// except the owner: the owning account always retains access to its own
/// teams.
pub fn can_remove_member(
    actor: &Account,
    actor_membership: Option<&TeamMembership>,
    team: &Team,
    target: &Account,
) -> bool {
    can_manage_membership(actor, actor_membership, team) && !team.is_owned_by(target.id())
}

/// A member's role may be changed to any assignable role. The owner's own
/// role is fixed and Owner can never be granted.
pub fn can_change_member_role(
    actor: &Account,
    actor_membership: Option<&TeamMembership>,
    team: &Team,
    target: &Account,
    new_role: AccountRole,
) -> bool {
    can_manage_membership(actor, actor_membership, team)
        && !team.is_owned_by(target.id())
        && new_role.is_assignable()
}

/// Owners and admins may list the accounts under an owner.
pub fn can_list_accounts(actor: &Account) -> bool {
    actor.role().can_list_accounts()
}

/// Only an owner may delete accounts, only non-owner accounts linked to
/// them, and never themself.
pub fn can_delete_account(actor: &Account, target: &Account) -> bool {
    actor.is_owner() && actor.id() != target.id() && target.is_seat_holder_of(actor.id())
}

/// Only an owner may change the role of an account linked to them, and the
/// new role must be assignable.
pub fn can_change_account_role(actor: &Account, target: &Account, new_role: AccountRole) -> bool {
    actor.is_owner()
        && actor.id() != target.id()
        && target.is_seat_holder_of(actor.id())
        && new_role.is_assignable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::SubscriptionPlan;

    fn owner() -> Account {
        Account::new_owner(
            "owner@example.com",
            "hash".to_string(),
            SubscriptionPlan::Free,
            Some("cus_123".to_string()),
        )
        .unwrap()
    }

    fn seat_holder(owner: &Account) -> Account {
        let mut account = Account::new_invited("member@example.com", AccountRole::Viewer).unwrap();
        account.link_to_owner(owner.id().clone(), None);
        account
    }

    fn membership(team: &Team, account: &Account, role: AccountRole) -> TeamMembership {
        TeamMembership::new(team.id().clone(), account.id().clone(), role)
    }

    #[test]
    fn test_owner_and_admin_manage_membership() {
        let owner = owner();
        let admin = seat_holder(&owner);
        let viewer = seat_holder(&owner);
        let team = Team::new("Panel", owner.id().clone()).unwrap();

        let admin_membership = membership(&team, &admin, AccountRole::Admin);
        let viewer_membership = membership(&team, &viewer, AccountRole::Viewer);

        assert!(can_manage_membership(&owner, None, &team));
        assert!(can_manage_membership(&admin, Some(&admin_membership), &team));
        assert!(!can_manage_membership(
            &viewer,
            Some(&viewer_membership),
            &team
        ));
        assert!(!can_manage_membership(&viewer, None, &team));
    }

    #[test]
    fn test_admin_membership_on_other_team_grants_nothing() {
        let owner = owner();
        let admin = seat_holder(&owner);
        let team = Team::new("Panel", owner.id().clone()).unwrap();
        let other_team = Team::new("Other", owner.id().clone()).unwrap();

        let elsewhere = membership(&other_team, &admin, AccountRole::Admin);
        assert!(!can_manage_membership(&admin, Some(&elsewhere), &team));
    }

    #[test]
    fn test_only_owner_manages_invites() {
        let owner = owner();
        let member = seat_holder(&owner);
        let team = Team::new("Panel", owner.id().clone()).unwrap();

        assert!(can_manage_invites(&owner, &team));
        assert!(!can_manage_invites(&member, &team));
    }

    #[test]
    fn test_owner_cannot_be_removed_from_own_team() {
        let owner = owner();
        let admin = seat_holder(&owner);
        let member = seat_holder(&owner);
        let team = Team::new("Panel", owner.id().clone()).unwrap();

        let admin_membership = membership(&team, &admin, AccountRole::Admin);

        assert!(can_remove_member(&owner, None, &team, &member));
        assert!(can_remove_member(
            &admin,
            Some(&admin_membership),
            &team,
            &member
        ));
        assert!(!can_remove_member(&owner, None, &team, &owner));
        assert!(!can_remove_member(
            &admin,
            Some(&admin_membership),
            &team,
            &owner
        ));
    }

    #[test]
    fn test_role_change_rules() {
        let owner = owner();
        let member = seat_holder(&owner);
        let team = Team::new("Panel", owner.id().clone()).unwrap();

        assert!(can_change_member_role(
            &owner,
            None,
            &team,
            &member,
            AccountRole::Admin
        ));
        assert!(!can_change_member_role(
            &owner,
            None,
            &team,
            &member,
            AccountRole::Owner
        ));
        assert!(!can_change_member_role(
            &owner,
            None,
            &team,
            &owner,
            AccountRole::Viewer
        ));
    }

    #[test]
    fn test_account_deletion_rules() {
        let owner = owner();
        let member = seat_holder(&owner);
        let unrelated = Account::new_invited("other@example.com", AccountRole::Viewer).unwrap();

        assert!(can_delete_account(&owner, &member));
        assert!(!can_delete_account(&owner, &owner));
        assert!(!can_delete_account(&owner, &unrelated));
        assert!(!can_delete_account(&member, &owner));
    }

    #[test]
    fn test_account_role_change_rules() {
        let owner = owner();
        let member = seat_holder(&owner);

        assert!(can_change_account_role(
            &owner,
            &member,
            AccountRole::Researcher
        ));
        assert!(!can_change_account_role(
            &owner,
            &member,
            AccountRole::Owner
        ));
        assert!(!can_change_account_role(
            &member,
            &owner,
            AccountRole::Viewer
        ));
    }

    #[test]
    fn test_listing_rules() {
        let owner = owner();
        let mut admin = seat_holder(&owner);
        admin.set_role(AccountRole::Admin);
        let viewer = seat_holder(&owner);

        assert!(can_list_accounts(&owner));
        assert!(can_list_accounts(&admin));
        assert!(!can_list_accounts(&viewer));
    }
}
