// SPDX-License-Identifier: MIT

//! Admin routes: scoring table management, submission corrections, game
//! settings. Every handler checks the admin capability before touching
//! any state.

use crate::error::{Result, ValidationFailure};
use crate::middleware::auth::{require_admin, AuthUser};
use crate::models::{ActivityRule, GameSettings, InputType, Submission, Team, TeamTier};
use crate::services::{RuleInput, SubmissionEdit};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Admin routes (require authentication via JWT plus the admin capability).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/admin/rules",
            get(list_rules).post(upsert_rule).put(upsert_rules_bulk),
        )
        .route("/api/admin/rules/reset", post(reset_rules))
        .route("/api/admin/rules/{key}", delete(delete_rule))
        .route("/api/admin/submissions", get(list_submissions))
        .route(
            "/api/admin/submissions/{id}",
            put(update_submission).delete(delete_submission),
        )
        .route("/api/admin/settings", get(get_settings).put(put_settings))
        .route("/api/admin/teams/{id}", delete(delete_team))
        .route("/api/admin/teams/{id}/tier", put(set_team_tier))
        .route("/api/admin/teams", get(list_teams))
        .route("/api/admin/reset", post(reset_game))
}

// ─── Scoring Rules ───────────────────────────────────────────

/// Admin-supplied rule fields, shared by single and bulk upsert.
#[derive(Deserialize, Validate, Clone)]
pub struct RulePayload {
    #[validate(length(min = 1, max = 64))]
    pub activity_key: String,
    pub label: Option<String>,
    pub input_type: InputType,
    pub unit_label: Option<String>,
    pub points_per_unit: f64,
    pub teammate_bonus: f64,
    pub min_value: Option<f64>,
    pub step_value: Option<f64>,
    pub weekly_cap: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl From<RulePayload> for RuleInput {
    fn from(p: RulePayload) -> Self {
        RuleInput {
            activity_key: p.activity_key,
            label: p.label,
            input_type: p.input_type,
            unit_label: p.unit_label,
            points_per_unit: p.points_per_unit,
            teammate_bonus: p.teammate_bonus,
            min_value: p.min_value,
            step_value: p.step_value,
            weekly_cap: p.weekly_cap,
            active: p.active,
        }
    }
}

/// List the whole rule table, including inactive rules.
async fn list_rules(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ActivityRule>>> {
    require_admin(&state, &user).await?;

    let rules = state.rules.list(false).await?;
    Ok(Json(rules))
}

/// Upsert one rule ("add new activity" path included).
async fn upsert_rule(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RulePayload>,
) -> Result<Json<ActivityRule>> {
    require_admin(&state, &user).await?;
    payload
        .validate()
        .map_err(|_| ValidationFailure::MissingActivityKey)?;

    let rule = state.rules.upsert(payload.into()).await?;
    Ok(Json(rule))
}

/// Save the whole scoring table in one request.
async fn upsert_rules_bulk(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<Vec<RulePayload>>,
) -> Result<Json<Vec<ActivityRule>>> {
    require_admin(&state, &user).await?;
    for row in &payload {
        row.validate()
            .map_err(|_| ValidationFailure::MissingActivityKey)?;
    }

    let inputs = payload.into_iter().map(Into::into).collect();
    let rules = state.rules.upsert_bulk(inputs).await?;
    Ok(Json(rules))
}

/// Restore the built-in default scoring table (idempotent).
async fn reset_rules(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ActivityRule>>> {
    require_admin(&state, &user).await?;

    let rules = state.rules.reset_to_defaults().await?;
    Ok(Json(rules))
}

/// Delete a rule; existing submissions keep their snapshots.
async fn delete_rule(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<DeletedResponse>> {
    require_admin(&state, &user).await?;

    state.rules.delete(&key).await?;
    Ok(Json(DeletedResponse { deleted: key }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeletedResponse {
    pub deleted: String,
}

// ─── Submissions ─────────────────────────────────────────────

#[derive(Deserialize)]
struct SubmissionsQuery {
    /// Filter by team id
    team: Option<String>,
}

/// List submissions, newest activity first, optionally for one team.
async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SubmissionsQuery>,
) -> Result<Json<Vec<Submission>>> {
    require_admin(&state, &user).await?;

    let submissions = state.db.list_submissions(params.team.as_deref()).await?;
    Ok(Json(submissions))
}

/// Admin correction: same fields as the submit form plus team reassignment.
/// Points are always recomputed from the *current* rule for the key.
#[derive(Deserialize, Validate)]
pub struct UpdateSubmissionRequest {
    #[validate(length(min = 1))]
    pub team_id: String,
    #[validate(length(min = 1, max = 64))]
    pub activity_key: String,
    pub activity_date: NaiveDate,
    #[serde(default)]
    pub did_with_teammate: bool,
    pub activity_value_number: Option<f64>,
    pub activity_value_text: Option<String>,
    pub activity_value_bool: Option<bool>,
}

async fn update_submission(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSubmissionRequest>,
) -> Result<Json<Submission>> {
    require_admin(&state, &user).await?;
    payload
        .validate()
        .map_err(|_| ValidationFailure::MissingActivityKey)?;

    let submission = state
        .submissions
        .admin_update(
            &id,
            SubmissionEdit {
                team_id: payload.team_id,
                activity_key: payload.activity_key,
                activity_date: payload.activity_date,
                did_with_teammate: payload.did_with_teammate,
                value_number: payload.activity_value_number,
                value_text: payload.activity_value_text,
                value_bool: payload.activity_value_bool,
            },
        )
        .await?;

    Ok(Json(submission))
}

/// Delete a submission; the atomic delete reverses the team's points.
async fn delete_submission(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    require_admin(&state, &user).await?;

    state.submissions.admin_delete(&id).await?;
    Ok(Json(DeletedResponse { deleted: id }))
}

// ─── Game Settings ───────────────────────────────────────────

/// Read the settings document. Returns closed-everything defaults when the
/// document does not exist yet, matching the fail-closed gates.
async fn get_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<GameSettings>> {
    require_admin(&state, &user).await?;

    let settings = state
        .db
        .get_game_settings()
        .await?
        .unwrap_or(GameSettings {
            registration_open: false,
            submissions_open: false,
            games_started_at: None,
            games_ended_at: None,
        });
    Ok(Json(settings))
}

async fn put_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(settings): Json<GameSettings>,
) -> Result<Json<GameSettings>> {
    require_admin(&state, &user).await?;

    state.db.set_game_settings(&settings).await?;

    tracing::info!(
        registration_open = settings.registration_open,
        submissions_open = settings.submissions_open,
        "Game settings updated"
    );

    Ok(Json(settings))
}

// ─── Teams ───────────────────────────────────────────────────

/// List all teams (admin overview).
async fn list_teams(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Team>>> {
    require_admin(&state, &user).await?;

    let teams = state.db.list_teams().await?;
    Ok(Json(teams))
}

#[derive(Deserialize)]
pub struct SetTierRequest {
    /// New tier; null clears the assignment
    pub tier: Option<TeamTier>,
}

/// Assign a team to a competition tier (or clear it).
async fn set_team_tier(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<SetTierRequest>,
) -> Result<Json<Team>> {
    require_admin(&state, &user).await?;

    let mut team = state
        .db
        .get_team(&id)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("Team {} not found", id)))?;

    team.tier = payload.tier;
    state.db.upsert_team(&team).await?;

    tracing::info!(team_id = %team.id, tier = ?team.tier, "Team tier updated");
    Ok(Json(team))
}

// ─── Game Reset ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetGameRequest {
    /// Must be exactly "RESET"
    pub confirm: String,
}

/// Wipe all teams and submissions for a new season. Rules, profiles, and
/// settings are kept. Requires typing the confirmation phrase.
async fn reset_game(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ResetGameRequest>,
) -> Result<Json<ResetGameResponse>> {
    require_admin(&state, &user).await?;

    if payload.confirm.trim() != "RESET" {
        return Err(ValidationFailure::ResetConfirmationMismatch.into());
    }

    state.db.delete_all_game_data().await?;

    tracing::warn!(admin = %user.user_id, "Game reset: all teams and submissions deleted");
    Ok(Json(ResetGameResponse { reset: true }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResetGameResponse {
    pub reset: bool,
}

/// Delete a team and its submissions.
async fn delete_team(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    require_admin(&state, &user).await?;

    state.db.delete_team(&id).await?;

    tracing::info!(team_id = %id, "Team deleted by admin");
    Ok(Json(DeletedResponse { deleted: id }))
}
