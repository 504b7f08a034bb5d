//! Application state shared across request handlers

use std::sync::Arc;

use crate::domain::account::AccountRepository;
use crate::infrastructure::account::AccountService;
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::billing::BillingSynchronizer;
use crate::infrastructure::invite::InviteService;
use crate::infrastructure::team::TeamService;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService>,
    pub team_service: Arc<TeamService>,
    pub invite_service: Arc<InviteService>,
    pub billing_synchronizer: Arc<BillingSynchronizer>,
    pub jwt_service: Arc<JwtService>,
    /// Direct repository handle for readiness probes
    pub accounts: Arc<dyn AccountRepository>,
}
