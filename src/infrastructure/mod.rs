//! Infrastructure layer - storage backends, services, and external adapters

pub mod account;
pub mod auth;
pub mod billing;
pub mod invite;
pub mod logging;
pub mod notifier;
pub mod seats;
pub mod storage;
pub mod team;
