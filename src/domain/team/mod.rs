//! Team domain - named groupings of accounts under a single owner

mod entity;
mod validation;

pub use entity::{Team, TeamId};
pub use validation::{TeamValidationError, validate_team_id, validate_team_name};
