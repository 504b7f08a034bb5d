//! Account validation utilities

use thiserror::Error;
use validator::ValidateEmail;

/// Errors that can occur during account validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccountValidationError {
    #[error("Account ID cannot be empty")]
    EmptyId,

    #[error("Account ID is not a valid UUID")]
    InvalidId,

    #[error("Email address cannot be empty")]
    EmptyEmail,

    #[error("Email address '{0}' is not valid")]
    InvalidEmail(String),

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate an account ID (UUID v4 in hyphenated string form)
pub fn validate_account_id(id: &str) -> Result<(), AccountValidationError> {
    if id.is_empty() {
        return Err(AccountValidationError::EmptyId);
    }

    uuid::Uuid::parse_str(id).map_err(|_| AccountValidationError::InvalidId)?;

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), AccountValidationError> {
    if email.is_empty() {
        return Err(AccountValidationError::EmptyEmail);
    }

    if !email.validate_email() {
        return Err(AccountValidationError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), AccountValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AccountValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AccountValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Normalize an email for storage and lookup - uniqueness is case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
