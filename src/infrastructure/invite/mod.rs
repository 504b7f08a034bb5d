//! Invite infrastructure - the invite lifecycle service

mod service;

pub use service::{InviteAcceptance, InviteService};
