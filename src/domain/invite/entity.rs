//! Team invite entity and token type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::account::AccountRole;
use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::team::TeamId;

/// Length of an invite token in hex characters (32 random bytes)
pub const INVITE_TOKEN_LENGTH: usize = 64;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
#[error("Invite token must be {INVITE_TOKEN_LENGTH} lowercase hex characters")]
pub struct InvalidInviteToken;

/// Opaque single-use invite token.
///
/// Tokens carry 256 bits of entropy and serve as the invite's primary key,
/// so possession of the token is the only credential needed to accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InviteToken(String);

impl InviteToken {
    /// Parse an existing token string
    pub fn new(token: impl Into<String>) -> Result<Self, InvalidInviteToken> {
        let token = token.into();

        if token.len() != INVITE_TOKEN_LENGTH
            || !token.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
        {
            return Err(InvalidInviteToken);
        }

        Ok(Self(token))
    }

    /// Generate a fresh token from 32 bytes of OS randomness
    pub fn generate() -> Self {
        use rand::RngCore;

        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);

        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InviteToken {
    type Error = InvalidInviteToken;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InviteToken> for String {
    fn from(token: InviteToken) -> Self {
        token.0
    }
}

impl std::fmt::Display for InviteToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for InviteToken {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Pending invitation to join a team.
///
/// Invites do not expire; they are deleted on acceptance or revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInvite {
    token: InviteToken,
    team_id: TeamId,
    /// Normalized (lowercased) email of the invitee
    email: String,
    /// Role granted on acceptance
    role: AccountRole,
    created_at: DateTime<Utc>,
}

impl TeamInvite {
    pub fn new(team_id: TeamId, email: impl Into<String>, role: AccountRole) -> Self {
        Self {
            token: InviteToken::generate(),
            team_id,
            email: email.into(),
            role,
            created_at: Utc::now(),
        }
    }

    // Getters

    pub fn token(&self) -> &InviteToken {
        &self.token
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> AccountRole {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl StorageEntity for TeamInvite {
    type Key = InviteToken;

    fn key(&self) -> &Self::Key {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation() {
        let token = InviteToken::generate();

        assert_eq!(token.as_str().len(), INVITE_TOKEN_LENGTH);
        assert!(token.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(token, InviteToken::generate());
    }

    #[test]
    fn test_token_parsing() {
        let token = InviteToken::generate();
        assert_eq!(InviteToken::new(token.as_str()).unwrap(), token);

        assert!(InviteToken::new("abc").is_err());
        assert!(InviteToken::new("g".repeat(INVITE_TOKEN_LENGTH)).is_err());
        assert!(InviteToken::new("A".repeat(INVITE_TOKEN_LENGTH)).is_err());
    }

    #[test]
    fn test_invite_creation() {
        let team_id = TeamId::generate();
        let invite = TeamInvite::new(team_id.clone(), "panelist@example.com", AccountRole::Viewer);

        assert_eq!(invite.team_id(), &team_id);
        assert_eq!(invite.email(), "panelist@example.com");
        assert_eq!(invite.role(), AccountRole::Viewer);
    }
}
