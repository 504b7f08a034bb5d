//! Team infrastructure - stores and service

mod repository;
mod service;

pub use repository::{InviteStore, MembershipStore, TeamStore};
pub use service::{TeamMemberRecord, TeamService};
