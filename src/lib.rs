//! Survur API
//!
//! Multi-tenant survey platform backend: team membership and
//! subscription authorization core. Accounts register as plan-paying
//! owners, invite collaborators into teams, and the seat governor keeps
//! acceptance within the plan's paid seat limit. Subscription state is
//! kept in sync with the billing provider through webhooks.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{info, warn};

use api::state::AppState;
use domain::account::AccountRepository;
use domain::invite::TeamInvite;
use domain::membership::TeamMembership;
use domain::storage::Storage;
use domain::team::Team;
use infrastructure::account::{
    AccountService, Argon2Hasher, InMemoryAccountRepository, PostgresAccountRepository,
};
use infrastructure::auth::{JwtConfig, JwtService};
use infrastructure::billing::{BillingSynchronizer, LocalBillingClient};
use infrastructure::notifier::LogNotifier;
use infrastructure::seats::SeatGovernor;
use infrastructure::storage::{InMemoryStorage, PostgresConfig, PostgresStorage, connect_pool};
use infrastructure::team::{InviteStore, MembershipStore, TeamStore, TeamService};
use infrastructure::invite::InviteService;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let use_postgres = config.storage.backend.eq_ignore_ascii_case("postgres");

    info!(backend = %config.storage.backend, "Initializing storage");

    let (accounts, team_storage, membership_storage, invite_storage): (
        Arc<dyn AccountRepository>,
        Arc<dyn Storage<Team>>,
        Arc<dyn Storage<TeamMembership>>,
        Arc<dyn Storage<TeamInvite>>,
    ) = if use_postgres {
        let url = config
            .storage
            .postgres_url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Postgres backend selected but no storage.postgres_url or DATABASE_URL set"
                )
            })?;

        info!("Connecting to PostgreSQL...");
        let pool = connect_pool(&PostgresConfig::new(url)).await?;
        info!("PostgreSQL connection established");

        let accounts = PostgresAccountRepository::new(pool.clone());
        accounts.ensure_table().await?;

        let teams = PostgresStorage::<Team>::new(pool.clone(), "teams");
        teams.ensure_table().await?;
        let memberships = PostgresStorage::<TeamMembership>::new(pool.clone(), "team_memberships");
        memberships.ensure_table().await?;
        let invites = PostgresStorage::<TeamInvite>::new(pool, "team_invites");
        invites.ensure_table().await?;

        (
            Arc::new(accounts),
            Arc::new(teams),
            Arc::new(memberships),
            Arc::new(invites),
        )
    } else {
        (
            Arc::new(InMemoryAccountRepository::new()),
            Arc::new(InMemoryStorage::new()),
            Arc::new(InMemoryStorage::new()),
            Arc::new(InMemoryStorage::new()),
        )
    };

    let teams = Arc::new(TeamStore::new(team_storage));
    let memberships = Arc::new(MembershipStore::new(membership_storage));
    let invites = Arc::new(InviteStore::new(invite_storage));
    let seats = Arc::new(SeatGovernor::new(accounts.clone()));

    let account_service = Arc::new(AccountService::new(
        accounts.clone(),
        memberships.clone(),
        Arc::new(Argon2Hasher::new()),
        Arc::new(LocalBillingClient::new()),
    ));
    let team_service = Arc::new(TeamService::new(
        accounts.clone(),
        teams.clone(),
        memberships.clone(),
        invites.clone(),
    ));
    let invite_service = Arc::new(InviteService::new(
        accounts.clone(),
        teams,
        memberships,
        invites,
        seats,
        Arc::new(LogNotifier::new()),
        config.invite.accept_url_base.clone(),
    ));
    let billing_synchronizer = Arc::new(BillingSynchronizer::new(accounts.clone()));
    let jwt_service = create_jwt_service(config);

    Ok(AppState {
        account_service,
        team_service,
        invite_service,
        billing_synchronizer,
        jwt_service,
        accounts,
    })
}

fn create_jwt_service(config: &AppConfig) -> Arc<JwtService> {
    let secret = if config.auth.jwt_secret.is_empty() {
        warn!(
            "No JWT secret configured. Generating a random secret; \
            sessions will NOT persist across restarts. \
            Set auth.jwt_secret or APP__AUTH__JWT_SECRET for persistent sessions."
        );
        generate_random_secret()
    } else {
        config.auth.jwt_secret.clone()
    };

    Arc::new(JwtService::new(JwtConfig::new(
        secret,
        config.auth.jwt_expiration_hours,
    )))
}

fn generate_random_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
