//! Team entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{TeamValidationError, validate_team_id, validate_team_name};
use crate::domain::account::AccountId;
use crate::domain::storage::{StorageEntity, StorageKey};

/// Team identifier - UUID v4 in hyphenated string form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeamId(String);

impl TeamId {
    /// Create a TeamId from an existing string after validation
    pub fn new(id: impl Into<String>) -> Result<Self, TeamValidationError> {
        let id = id.into();
        validate_team_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random TeamId
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TeamId {
    type Error = TeamValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeamId> for String {
    fn from(id: TeamId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for TeamId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Team entity
///
/// Every team has exactly one owning account, fixed at creation. The owner
/// is never removable from its own team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier
    id: TeamId,
    /// Display name
    name: String,
    /// Owning account; immutable after creation
    owner_account_id: AccountId,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team owned by the given account
    pub fn new(
        name: impl Into<String>,
        owner_account_id: AccountId,
    ) -> Result<Self, TeamValidationError> {
        let name = name.into();
        validate_team_name(&name)?;
        let now = Utc::now();

        Ok(Self {
            id: TeamId::generate(),
            name,
            owner_account_id,
            created_at: now,
            updated_at: now,
        })
    }

    // Getters

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner_account_id(&self) -> &AccountId {
        &self.owner_account_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Check whether the given account owns this team
    pub fn is_owned_by(&self, account_id: &AccountId) -> bool {
        &self.owner_account_id == account_id
    }

    // Mutators

    /// Update the display name
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), TeamValidationError> {
        let name = name.into();
        validate_team_name(&name)?;
        self.name = name;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Team {
    type Key = TeamId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_creation() {
        let owner_id = AccountId::generate();
        let team = Team::new("Research Panel", owner_id.clone()).unwrap();

        assert_eq!(team.name(), "Research Panel");
        assert!(team.is_owned_by(&owner_id));
    }

    #[test]
    fn test_team_invalid_name() {
        let owner_id = AccountId::generate();
        assert!(Team::new("", owner_id).is_err());
    }

    #[test]
    fn test_team_not_owned_by_other() {
        let team = Team::new("Research Panel", AccountId::generate()).unwrap();
        assert!(!team.is_owned_by(&AccountId::generate()));
    }

    #[test]
    fn test_team_rename() {
        let mut team = Team::new("Old Name", AccountId::generate()).unwrap();

        team.set_name("New Name").unwrap();
        assert_eq!(team.name(), "New Name");
        assert!(team.set_name("").is_err());
    }
}
