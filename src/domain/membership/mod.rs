//! Membership domain - account-to-team links with per-team roles

mod entity;

pub use entity::{InvalidMembershipId, MembershipId, TeamMembership};
