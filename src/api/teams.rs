//! Team API endpoints
//!
//! Team CRUD, membership management, and invite lifecycle. Invite
//! acceptance lives here too but is unauthenticated - the token is the
//! credential.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};

use crate::api::auth::AccountResponse;
use crate::api::middleware::RequireAccount;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::account::{AccountId, AccountRole};
use crate::domain::invite::{InviteToken, TeamInvite};
use crate::domain::membership::TeamMembership;
use crate::domain::team::{Team, TeamId};
use crate::infrastructure::team::TeamMemberRecord;

/// Create the team router (authenticated routes)
pub fn create_team_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_team).get(list_teams))
        .route(
            "/{team_id}",
            get(get_team).put(rename_team).delete(delete_team),
        )
        .route("/{team_id}/members", get(list_members).post(assign_member))
        .route(
            "/{team_id}/members/{account_id}",
            put(change_member_role).delete(remove_member),
        )
        .route("/{team_id}/invites", post(issue_invite).get(list_invites))
}

/// Create the invite router (token-addressed routes)
pub fn create_invite_router() -> Router<AppState> {
    Router::new()
        .route("/{token}", delete(revoke_invite))
        .route("/{token}/accept", post(accept_invite))
}

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameTeamRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignMemberRequest {
    pub account_id: String,
    pub role: AccountRole,
}

#[derive(Debug, Deserialize)]
pub struct ChangeMemberRoleRequest {
    pub role: AccountRole,
}

#[derive(Debug, Deserialize)]
pub struct IssueInviteRequest {
    pub email: String,
    pub role: AccountRole,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: String,
    pub name: String,
    pub owner_account_id: String,
    pub created_at: String,
}

impl TeamResponse {
    fn from_team(team: &Team) -> Self {
        Self {
            id: team.id().as_str().to_string(),
            name: team.name().to_string(),
            owner_account_id: team.owner_account_id().as_str().to_string(),
            created_at: team.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamListResponse {
    pub teams: Vec<TeamResponse>,
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub id: String,
    pub team_id: String,
    pub account_id: String,
    pub role: AccountRole,
    pub created_at: String,
}

impl MembershipResponse {
    fn from_membership(membership: &TeamMembership) -> Self {
        Self {
            id: membership.id().as_str().to_string(),
            team_id: membership.team_id().as_str().to_string(),
            account_id: membership.account_id().as_str().to_string(),
            role: membership.role(),
            created_at: membership.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub account: AccountResponse,
    pub role: AccountRole,
    pub joined_at: String,
}

impl MemberResponse {
    fn from_record(record: &TeamMemberRecord) -> Self {
        Self {
            account: AccountResponse::from_account(&record.account),
            role: record.membership.role(),
            joined_at: record.membership.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberListResponse {
    pub members: Vec<MemberResponse>,
}

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub token: String,
    pub team_id: String,
    pub email: String,
    pub role: AccountRole,
    pub created_at: String,
}

impl InviteResponse {
    fn from_invite(invite: &TeamInvite) -> Self {
        Self {
            token: invite.token().as_str().to_string(),
            team_id: invite.team_id().as_str().to_string(),
            email: invite.email().to_string(),
            role: invite.role(),
            created_at: invite.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InviteListResponse {
    pub invites: Vec<InviteResponse>,
}

/// Response after accepting an invite
#[derive(Debug, Serialize)]
pub struct InviteAcceptanceResponse {
    pub account: AccountResponse,
    pub membership: MembershipResponse,
    pub team: TeamResponse,
    /// True when the invitee must complete password setup to log in
    pub account_created: bool,
}

fn parse_team_id(raw: &str) -> Result<TeamId, ApiError> {
    TeamId::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn parse_account_id(raw: &str) -> Result<AccountId, ApiError> {
    AccountId::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn parse_invite_token(raw: &str) -> Result<InviteToken, ApiError> {
    InviteToken::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Create a team
///
/// POST /teams
pub async fn create_team(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Json(request): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let team = state.team_service.create(&actor, &request.name).await?;
    Ok((StatusCode::CREATED, Json(TeamResponse::from_team(&team))))
}

/// List the teams visible to the caller
///
/// GET /teams
pub async fn list_teams(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
) -> Result<Json<TeamListResponse>, ApiError> {
    let teams = state.team_service.list_for(&actor).await?;

    Ok(Json(TeamListResponse {
        teams: teams.iter().map(TeamResponse::from_team).collect(),
    }))
}

/// Get a single team
///
/// GET /teams/{team_id}
pub async fn get_team(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path(team_id): Path<String>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team_id = parse_team_id(&team_id)?;
    let team = state.team_service.get_for(&actor, &team_id).await?;
    Ok(Json(TeamResponse::from_team(&team)))
}

/// Rename a team
///
/// PUT /teams/{team_id}
pub async fn rename_team(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path(team_id): Path<String>,
    Json(request): Json<RenameTeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team_id = parse_team_id(&team_id)?;
    let team = state
        .team_service
        .rename(&actor, &team_id, &request.name)
        .await?;
    Ok(Json(TeamResponse::from_team(&team)))
}

/// Delete a team
///
/// DELETE /teams/{team_id}
pub async fn delete_team(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path(team_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let team_id = parse_team_id(&team_id)?;
    state.team_service.delete(&actor, &team_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a team's members
///
/// GET /teams/{team_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path(team_id): Path<String>,
) -> Result<Json<MemberListResponse>, ApiError> {
    let team_id = parse_team_id(&team_id)?;
    let records = state.team_service.members(&actor, &team_id).await?;

    Ok(Json(MemberListResponse {
        members: records.iter().map(MemberResponse::from_record).collect(),
    }))
}

/// Assign an existing account to a team
///
/// POST /teams/{team_id}/members
pub async fn assign_member(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path(team_id): Path<String>,
    Json(request): Json<AssignMemberRequest>,
) -> Result<(StatusCode, Json<MembershipResponse>), ApiError> {
    let team_id = parse_team_id(&team_id)?;
    let account_id = parse_account_id(&request.account_id)?;

    let membership = state
        .team_service
        .assign_to_team(&actor, &team_id, &account_id, request.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MembershipResponse::from_membership(&membership)),
    ))
}

/// Change a member's role within a team
///
/// PUT /teams/{team_id}/members/{account_id}
pub async fn change_member_role(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path((team_id, account_id)): Path<(String, String)>,
    Json(request): Json<ChangeMemberRoleRequest>,
) -> Result<Json<MembershipResponse>, ApiError> {
    let team_id = parse_team_id(&team_id)?;
    let account_id = parse_account_id(&account_id)?;

    let membership = state
        .team_service
        .change_member_role(&actor, &team_id, &account_id, request.role)
        .await?;

    Ok(Json(MembershipResponse::from_membership(&membership)))
}

/// Remove a member from a team
///
/// DELETE /teams/{team_id}/members/{account_id}
pub async fn remove_member(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path((team_id, account_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let team_id = parse_team_id(&team_id)?;
    let account_id = parse_account_id(&account_id)?;

    state
        .team_service
        .remove_member(&actor, &team_id, &account_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Issue a team invite
///
/// POST /teams/{team_id}/invites
pub async fn issue_invite(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path(team_id): Path<String>,
    Json(request): Json<IssueInviteRequest>,
) -> Result<(StatusCode, Json<InviteResponse>), ApiError> {
    let team_id = parse_team_id(&team_id)?;

    let invite = state
        .invite_service
        .issue(&actor, &team_id, &request.email, request.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InviteResponse::from_invite(&invite)),
    ))
}

/// List a team's pending invites
///
/// GET /teams/{team_id}/invites
pub async fn list_invites(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path(team_id): Path<String>,
) -> Result<Json<InviteListResponse>, ApiError> {
    let team_id = parse_team_id(&team_id)?;
    let invites = state.invite_service.list_for_team(&actor, &team_id).await?;

    Ok(Json(InviteListResponse {
        invites: invites.iter().map(InviteResponse::from_invite).collect(),
    }))
}

/// Revoke a pending invite
///
/// DELETE /invites/{token}
pub async fn revoke_invite(
    State(state): State<AppState>,
    RequireAccount(actor): RequireAccount,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    let token = parse_invite_token(&token)?;
    state.invite_service.revoke(&actor, &token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Accept an invite. Unauthenticated - the token is the credential.
///
/// POST /invites/{token}/accept
pub async fn accept_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InviteAcceptanceResponse>, ApiError> {
    let token = parse_invite_token(&token)?;
    let acceptance = state.invite_service.accept(&token).await?;

    Ok(Json(InviteAcceptanceResponse {
        account: AccountResponse::from_account(&acceptance.account),
        membership: MembershipResponse::from_membership(&acceptance.membership),
        team: TeamResponse::from_team(&acceptance.team),
        account_created: acceptance.account_created,
    }))
}
