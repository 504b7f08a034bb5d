//! Invite domain - token-addressed pending team invitations

mod entity;

pub use entity::{INVITE_TOKEN_LENGTH, InvalidInviteToken, InviteToken, TeamInvite};
