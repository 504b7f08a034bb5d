//! Outbound notifications for invite delivery.
//!
//! Delivery is best-effort and never blocks or fails the operation that
//! triggered it.

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::info;

use crate::domain::DomainError;

/// Trait for delivering invite notifications to invitees
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Notify an invitee that they have been invited to a team
    async fn send_invite(
        &self,
        email: &str,
        team_name: &str,
        accept_url: &str,
    ) -> Result<(), DomainError>;
}

/// Notifier that writes invites to the structured log.
///
/// Stands in for an email provider in development and tests.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_invite(
        &self,
        email: &str,
        team_name: &str,
        accept_url: &str,
    ) -> Result<(), DomainError> {
        info!(email, team_name, accept_url, "Invite notification");
        Ok(())
    }
}
