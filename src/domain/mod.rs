//! Domain layer - entities, validation, authorization rules, and the
//! repository/storage abstractions the infrastructure layer implements.

pub mod account;
pub mod authorization;
pub mod billing;
pub mod error;
pub mod invite;
pub mod membership;
pub mod plan;
pub mod storage;
pub mod team;

pub use error::DomainError;
