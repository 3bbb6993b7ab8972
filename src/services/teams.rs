// SPDX-License-Identifier: MIT

//! Team membership: create a team or join one by invite code (both gated
//! on `registration_open`), rename it, or leave it.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result, ValidationFailure};
use crate::models::settings::ensure_registration_open;
use crate::models::Team;
use crate::time_utils::format_utc_rfc3339;

const TEAM_NAME_MIN: usize = 2;
const TEAM_NAME_MAX: usize = 40;
const INVITE_CODE_LEN: usize = 6;

/// Registration operations over the `teams` collection.
pub struct TeamsService {
    db: FirestoreDb,
}

impl TeamsService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Create a team with the caller as its first member.
    pub async fn create(&self, user_id: &str, name: &str) -> Result<Team> {
        let name = name.trim();
        if name.chars().count() < TEAM_NAME_MIN || name.chars().count() > TEAM_NAME_MAX {
            return Err(ValidationFailure::InvalidTeamName.into());
        }

        self.ensure_registration_open().await?;

        if self.db.find_team_for_member(user_id).await?.is_some() {
            return Err(ValidationFailure::AlreadyOnTeam.into());
        }

        let team = Team {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            invite_code: generate_invite_code(),
            member1_id: Some(user_id.to_string()),
            member2_id: None,
            weekly_points: 0,
            total_points: 0,
            weeks_won: vec![],
            tier: None,
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        self.db.upsert_team(&team).await?;

        tracing::info!(team_id = %team.id, name = %team.name, "Team created");
        Ok(team)
    }

    /// Join an existing team via its invite code, taking the free member
    /// slot.
    pub async fn join_by_code(&self, user_id: &str, code: &str) -> Result<Team> {
        let code = code.trim().to_uppercase();
        if code.len() < 4 {
            return Err(ValidationFailure::InvalidInviteCode.into());
        }

        self.ensure_registration_open().await?;

        if self.db.find_team_for_member(user_id).await?.is_some() {
            return Err(ValidationFailure::AlreadyOnTeam.into());
        }

        let mut team = self
            .db
            .find_team_by_invite_code(&code)
            .await?
            .ok_or(ValidationFailure::InvalidInviteCode)?;

        if team.is_full() {
            return Err(ValidationFailure::TeamFull.into());
        }

        // The creator slot can be empty if the creator left; take it first.
        if team.member1_id.is_none() {
            team.member1_id = Some(user_id.to_string());
        } else {
            team.member2_id = Some(user_id.to_string());
        }

        self.db.upsert_team(&team).await?;

        tracing::info!(team_id = %team.id, "Member joined team");
        Ok(team)
    }

    /// Rename the caller's team. Only a current member may rename it.
    pub async fn rename(&self, user_id: &str, team_id: &str, new_name: &str) -> Result<Team> {
        let new_name = new_name.trim();
        if new_name.chars().count() < TEAM_NAME_MIN || new_name.chars().count() > TEAM_NAME_MAX {
            return Err(ValidationFailure::InvalidTeamName.into());
        }

        let mut team = self
            .db
            .get_team(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", team_id)))?;
        if !team.has_member(user_id) {
            return Err(ValidationFailure::NotOnTeam.into());
        }

        team.name = new_name.to_string();
        self.db.upsert_team(&team).await?;

        tracing::info!(team_id = %team.id, name = %team.name, "Team renamed");
        Ok(team)
    }

    /// Leave the caller's team, vacating their slot. The last member out
    /// deletes the team (and its submissions) rather than leaving an empty
    /// shell on the leaderboard.
    pub async fn leave(&self, user_id: &str) -> Result<()> {
        let mut team = self
            .db
            .find_team_for_member(user_id)
            .await?
            .ok_or(ValidationFailure::NotOnTeam)?;

        let leaving_member1 = team.member1_id.as_deref() == Some(user_id);
        let other_remains = if leaving_member1 {
            team.member2_id.is_some()
        } else {
            team.member1_id.is_some()
        };

        if !other_remains {
            self.db.delete_team(&team.id).await?;
            tracing::info!(team_id = %team.id, "Last member left, team deleted");
            return Ok(());
        }

        if leaving_member1 {
            team.member1_id = None;
        } else {
            team.member2_id = None;
        }
        self.db.upsert_team(&team).await?;

        tracing::info!(team_id = %team.id, "Member left team");
        Ok(())
    }

    async fn ensure_registration_open(&self) -> Result<()> {
        // Fail-closed: an unreadable settings document closes registration.
        let settings = self.db.get_game_settings().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Settings read failed, treating registration as closed");
            None
        });
        ensure_registration_open(settings.as_ref())?;
        Ok(())
    }
}

const INVITE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random 6-character invite code over the full A-Z0-9 alphabet.
fn generate_invite_code() -> String {
    uuid::Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(INVITE_CODE_LEN)
        .map(|b| INVITE_ALPHABET[usize::from(*b) % INVITE_ALPHABET.len()] as char)
        .collect()
}
