//! Account domain - identity store for owners and seat-holders

mod entity;
mod repository;
mod validation;

pub use entity::{Account, AccountId, AccountProfile, AccountRole};
pub use repository::AccountRepository;
pub use validation::{
    AccountValidationError, normalize_email, validate_account_id, validate_email,
    validate_password,
};
