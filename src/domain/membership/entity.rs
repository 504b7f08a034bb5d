//! Team membership entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::account::{AccountId, AccountRole};
use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::team::TeamId;

/// Membership identifier - UUID v4 in hyphenated string form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MembershipId(String);

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
#[error("Membership ID is not a valid UUID")]
pub struct InvalidMembershipId;

impl MembershipId {
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidMembershipId> {
        let id = id.into();
        uuid::Uuid::parse_str(&id).map_err(|_| InvalidMembershipId)?;
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MembershipId {
    type Error = InvalidMembershipId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MembershipId> for String {
    fn from(id: MembershipId) -> Self {
        id.0
    }
}

impl std::fmt::Display for MembershipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for MembershipId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Links an account to a team with a role scoped to that team.
///
/// At most one membership may exist per (team, account) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMembership {
    id: MembershipId,
    team_id: TeamId,
    account_id: AccountId,
    role: AccountRole,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TeamMembership {
    pub fn new(team_id: TeamId, account_id: AccountId, role: AccountRole) -> Self {
        let now = Utc::now();

        Self {
            id: MembershipId::generate(),
            team_id,
            account_id,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    // Getters

    pub fn id(&self) -> &MembershipId {
        &self.id
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn role(&self) -> AccountRole {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Change the role held within the team
    pub fn set_role(&mut self, role: AccountRole) {
        self.role = role;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for TeamMembership {
    type Key = MembershipId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
