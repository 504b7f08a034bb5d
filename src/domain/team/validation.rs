//! Team validation utilities

use thiserror::Error;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("Team ID cannot be empty")]
    EmptyId,

    #[error("Team ID is not a valid UUID")]
    InvalidId,

    #[error("Team name cannot be empty")]
    EmptyName,

    #[error("Team name exceeds maximum length of {0} characters")]
    NameTooLong(usize),
}

const MAX_TEAM_NAME_LENGTH: usize = 100;

/// Validate a team ID (UUID v4 in hyphenated string form)
pub fn validate_team_id(id: &str) -> Result<(), TeamValidationError> {
    if id.is_empty() {
        return Err(TeamValidationError::EmptyId);
    }

    uuid::Uuid::parse_str(id).map_err(|_| TeamValidationError::InvalidId)?;

    Ok(())
}

/// Validate a team name
pub fn validate_team_name(name: &str) -> Result<(), TeamValidationError> {
    if name.trim().is_empty() {
        return Err(TeamValidationError::EmptyName);
    }

    if name.len() > MAX_TEAM_NAME_LENGTH {
        return Err(TeamValidationError::NameTooLong(MAX_TEAM_NAME_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_team_id() {
        let id = uuid::Uuid::new_v4().to_string();
        assert!(validate_team_id(&id).is_ok());
    }

    #[test]
    fn test_invalid_team_id() {
        assert_eq!(validate_team_id(""), Err(TeamValidationError::EmptyId));
        assert_eq!(
            validate_team_id("research"),
            Err(TeamValidationError::InvalidId)
        );
    }

    #[test]
    fn test_team_name() {
        assert!(validate_team_name("Research Panel").is_ok());
        assert_eq!(validate_team_name(""), Err(TeamValidationError::EmptyName));
        assert_eq!(
            validate_team_name("   "),
            Err(TeamValidationError::EmptyName)
        );
        assert_eq!(
            validate_team_name(&"x".repeat(101)),
            Err(TeamValidationError::NameTooLong(100))
        );
    }
}
