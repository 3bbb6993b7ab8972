// SPDX-License-Identifier: MIT

//! API routes for authenticated members.

use crate::error::{AppError, Result, ValidationFailure};
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityRule, Submission, Team, TeamTier};
use crate::services::NewSubmission;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Member routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/rules", get(get_active_rules))
        .route("/api/submissions", post(create_submission))
        .route("/api/teams", post(create_team))
        .route("/api/teams/join", post(join_team))
        .route("/api/teams/rename", post(rename_team))
        .route("/api/teams/leave", post(leave_team))
}

// ─── Current User ────────────────────────────────────────────

/// Current user response: profile info plus team membership.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub user_id: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
    pub team: Option<Team>,
}

/// Get current user profile and team.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user.user_id)))?;

    let team = state.db.find_team_for_member(&user.user_id).await?;

    Ok(Json(MeResponse {
        user_id: profile.id,
        display_name: profile.display_name,
        is_admin: profile.is_admin,
        team,
    }))
}

// ─── Rules (submit form) ─────────────────────────────────────

/// Get the active rules shown on the submit form.
async fn get_active_rules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ActivityRule>>> {
    let rules = state.rules.list(true).await?;
    Ok(Json(rules))
}

// ─── Submissions ─────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateSubmissionRequest {
    #[validate(length(min = 1))]
    pub team_id: String,
    #[validate(length(min = 1, max = 64))]
    pub activity_key: String,
    /// Calendar date the activity occurred (yyyy-mm-dd)
    pub activity_date: NaiveDate,
    #[serde(default)]
    pub did_with_teammate: bool,
    pub activity_value_number: Option<f64>,
    pub activity_value_text: Option<String>,
    pub activity_value_bool: Option<bool>,
}

/// Log an activity for the caller's team.
async fn create_submission(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateSubmissionRequest>,
) -> Result<Json<Submission>> {
    payload
        .validate()
        .map_err(|_| ValidationFailure::MissingActivityKey)?;

    tracing::debug!(
        user_id = %user.user_id,
        activity_key = %payload.activity_key,
        activity_date = %payload.activity_date,
        "Creating submission"
    );

    let today = chrono::Local::now().date_naive();
    let submission = state
        .submissions
        .create(
            &user.user_id,
            NewSubmission {
                team_id: payload.team_id,
                activity_key: payload.activity_key,
                activity_date: payload.activity_date,
                did_with_teammate: payload.did_with_teammate,
                value_number: payload.activity_value_number,
                value_text: payload.activity_value_text,
                value_bool: payload.activity_value_bool,
            },
            today,
        )
        .await?;

    Ok(Json(submission))
}

// ─── Teams ───────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 2, max = 40))]
    pub name: String,
}

/// Create a team with the caller as first member (registration gate).
async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateTeamRequest>,
) -> Result<Json<Team>> {
    payload
        .validate()
        .map_err(|_| ValidationFailure::InvalidTeamName)?;

    let team = state.teams.create(&user.user_id, &payload.name).await?;
    Ok(Json(team))
}

#[derive(Deserialize, Validate)]
pub struct JoinTeamRequest {
    #[validate(length(min = 4, max = 12))]
    pub invite_code: String,
}

/// Join a team by invite code (registration gate).
async fn join_team(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<JoinTeamRequest>,
) -> Result<Json<Team>> {
    payload
        .validate()
        .map_err(|_| ValidationFailure::InvalidInviteCode)?;

    let team = state
        .teams
        .join_by_code(&user.user_id, &payload.invite_code)
        .await?;
    Ok(Json(team))
}

#[derive(Deserialize, Validate)]
pub struct RenameTeamRequest {
    #[validate(length(min = 1))]
    pub team_id: String,
    #[validate(length(min = 2, max = 40))]
    pub name: String,
}

/// Rename the caller's team.
async fn rename_team(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RenameTeamRequest>,
) -> Result<Json<Team>> {
    payload
        .validate()
        .map_err(|_| ValidationFailure::InvalidTeamName)?;

    let team = state
        .teams
        .rename(&user.user_id, &payload.team_id, &payload.name)
        .await?;
    Ok(Json(team))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeftTeamResponse {
    pub left: bool,
}

/// Leave the caller's team; the last member out deletes it.
async fn leave_team(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<LeftTeamResponse>> {
    state.teams.leave(&user.user_id).await?;
    Ok(Json(LeftTeamResponse { left: true }))
}

// ─── Leaderboard (public) ────────────────────────────────────

/// One leaderboard row. Points come straight from the team documents; the
/// request path never recomputes them from submissions.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub team_id: String,
    pub name: String,
    pub weekly_points: i64,
    pub total_points: i64,
    pub weeks_won: u32,
    pub tier: Option<TeamTier>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardResponse {
    pub teams: Vec<LeaderboardEntry>,
}

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    /// Tier filter: "gold" | "purple" | "red"; anything else shows all
    tier: Option<String>,
}

/// Parse a tier filter; unknown or missing values mean "all", matching the
/// untiered default view.
fn parse_tier_filter(raw: Option<&str>) -> Option<TeamTier> {
    match raw.map(str::to_lowercase).as_deref() {
        Some("gold") => Some(TeamTier::Gold),
        Some("purple") => Some(TeamTier::Purple),
        Some("red") => Some(TeamTier::Red),
        _ => None,
    }
}

/// Get the team leaderboard, ranked by weekly then total points, optionally
/// restricted to one tier. Ranks are assigned within the filtered view.
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let teams = state.db.list_teams().await?;
    let tier_filter = parse_tier_filter(params.tier.as_deref());

    let entries = teams
        .into_iter()
        .filter(|t| tier_filter.is_none() || t.tier == tier_filter)
        .enumerate()
        .map(|(i, t)| LeaderboardEntry {
            rank: i as u32 + 1,
            team_id: t.id,
            name: t.name,
            weekly_points: t.weekly_points,
            total_points: t.total_points,
            weeks_won: t.weeks_won.len() as u32,
            tier: t.tier,
        })
        .collect();

    Ok(Json(LeaderboardResponse { teams: entries }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tier_filter() {
        assert_eq!(parse_tier_filter(Some("gold")), Some(TeamTier::Gold));
        assert_eq!(parse_tier_filter(Some("PURPLE")), Some(TeamTier::Purple));
        assert_eq!(parse_tier_filter(Some("red")), Some(TeamTier::Red));
        assert_eq!(parse_tier_filter(Some("all")), None);
        assert_eq!(parse_tier_filter(Some("bronze")), None);
        assert_eq!(parse_tier_filter(None), None);
    }
}
