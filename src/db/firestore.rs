// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (identity + admin capability)
//! - Activity rules (admin-controlled scoring table)
//! - Teams (point aggregates)
//! - Submissions (scored activity events)
//! - Game settings (registration/submission gates)
//!
//! Team point totals are only ever changed here, inside the same Firestore
//! transaction that writes the submission. The service layer never computes
//! team totals itself.

use crate::db::{collections, SETTINGS_DOC};
use crate::error::AppError;
use crate::models::{ActivityRule, GameSettings, Profile, Submission, Team};
use crate::time_utils::is_within_current_week;
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a profile by auth user ID.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a profile.
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(&profile.id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Activity Rule Operations ────────────────────────────────

    /// Get a rule by activity key.
    pub async fn get_rule(&self, activity_key: &str) -> Result<Option<ActivityRule>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITY_RULES)
            .obj()
            .one(activity_key)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List rules, optionally only active ones, ordered by key.
    pub async fn list_rules(&self, active_only: bool) -> Result<Vec<ActivityRule>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITY_RULES);

        let query = if active_only {
            query.filter(|q| q.field("active").eq(true))
        } else {
            query
        };

        query
            .order_by([(
                "activity_key",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Upsert a rule keyed by `activity_key` (replace-in-place, idempotent).
    pub async fn upsert_rule(&self, rule: &ActivityRule) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACTIVITY_RULES)
            .document_id(&rule.activity_key)
            .object(rule)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Upsert many rules concurrently (bulk save, reset-to-defaults).
    ///
    /// Each write is an idempotent upsert by key, so re-running with the
    /// same payload leaves the table unchanged.
    pub async fn upsert_rules(&self, rules: &[ActivityRule]) -> Result<(), AppError> {
        let client = self.get_client()?;

        stream::iter(rules.to_vec())
            .map(|rule| async move {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::ACTIVITY_RULES)
                    .document_id(&rule.activity_key)
                    .object(&rule)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    /// Delete a rule. Existing submissions keep their snapshots and are
    /// not touched.
    pub async fn delete_rule(&self, activity_key: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::ACTIVITY_RULES)
            .document_id(activity_key)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Game Settings Operations ────────────────────────────────

    /// Read the singleton settings document. Callers treat `None` (and any
    /// error) as closed.
    pub async fn get_game_settings(&self) -> Result<Option<GameSettings>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::GAME_SETTINGS)
            .obj()
            .one(SETTINGS_DOC)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write the singleton settings document.
    pub async fn set_game_settings(&self, settings: &GameSettings) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::GAME_SETTINGS)
            .document_id(SETTINGS_DOC)
            .object(settings)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Team Operations ─────────────────────────────────────────

    /// Get a team by ID.
    pub async fn get_team(&self, team_id: &str) -> Result<Option<Team>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TEAMS)
            .obj()
            .one(team_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the team a member belongs to (members are on at most one team).
    pub async fn find_team_for_member(&self, user_id: &str) -> Result<Option<Team>, AppError> {
        let user_id = user_id.to_string();
        let teams: Vec<Team> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::TEAMS)
            .filter(move |q| {
                q.for_any([
                    q.field("member1_id").eq(user_id.clone()),
                    q.field("member2_id").eq(user_id.clone()),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(teams.into_iter().next())
    }

    /// Find a team by its invite code.
    pub async fn find_team_by_invite_code(&self, code: &str) -> Result<Option<Team>, AppError> {
        let code = code.to_string();
        let teams: Vec<Team> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::TEAMS)
            .filter(move |q| q.field("invite_code").eq(code.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(teams.into_iter().next())
    }

    /// Create or update a team.
    pub async fn upsert_team(&self, team: &Team) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TEAMS)
            .document_id(&team.id)
            .object(team)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List all teams ordered for the leaderboard (weekly, then total,
    /// descending).
    pub async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TEAMS)
            .order_by([
                (
                    "weekly_points",
                    firestore::FirestoreQueryDirection::Descending,
                ),
                (
                    "total_points",
                    firestore::FirestoreQueryDirection::Descending,
                ),
            ])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a team and all of its submissions.
    pub async fn delete_team(&self, team_id: &str) -> Result<(), AppError> {
        let submissions = self.list_submissions(Some(team_id)).await?;

        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for submission in &submissions {
            self.get_client()?
                .fluent()
                .delete()
                .from(collections::SUBMISSIONS)
                .document_id(&submission.id)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add deletion to transaction: {}", e))
                })?;
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::TEAMS)
            .document_id(team_id)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add deletion to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(())
    }

    /// Delete every submission and every team (full game reset). Rules,
    /// profiles, and settings survive so the next season starts from the
    /// same scoring table.
    pub async fn delete_all_game_data(&self) -> Result<(), AppError> {
        let client = self.get_client()?;

        let submissions = self.list_submissions(None).await?;
        stream::iter(submissions)
            .map(|submission| async move {
                client
                    .fluent()
                    .delete()
                    .from(collections::SUBMISSIONS)
                    .document_id(&submission.id)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        let teams = self.list_teams().await?;
        stream::iter(teams)
            .map(|team| async move {
                client
                    .fluent()
                    .delete()
                    .from(collections::TEAMS)
                    .document_id(&team.id)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        tracing::warn!("All teams and submissions deleted (game reset)");
        Ok(())
    }

    // ─── Submission Operations ───────────────────────────────────

    /// Get a submission by ID.
    pub async fn get_submission(&self, id: &str) -> Result<Option<Submission>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SUBMISSIONS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List submissions, optionally filtered by team, newest activity first.
    pub async fn list_submissions(
        &self,
        team_id: Option<&str>,
    ) -> Result<Vec<Submission>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SUBMISSIONS);

        let query = if let Some(team_id) = team_id {
            let team_id = team_id.to_string();
            query.filter(move |q| q.field("team_id").eq(team_id.clone()))
        } else {
            query
        };

        query
            .order_by([(
                "activity_date",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Submission + Point Aggregation ───────────────────

    /// Insert a submission and credit its points to the owning team, as one
    /// transaction. If another request touches the team concurrently,
    /// Firestore retries with fresh data, preventing lost updates.
    pub async fn insert_submission_atomic(&self, submission: &Submission) -> Result<(), AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let mut team = self
            .get_team(&submission.team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", submission.team_id)))?;

        apply_points(&mut team, submission, 1);

        self.add_submission_write(&mut transaction, submission)?;
        self.add_team_write(&mut transaction, &team)?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            submission_id = %submission.id,
            team_id = %submission.team_id,
            points = submission.points_awarded,
            "Submission inserted atomically"
        );

        Ok(())
    }

    /// Overwrite a submission and move its points delta, as one transaction.
    /// Handles team reassignment by debiting the old team and crediting the
    /// new one.
    pub async fn update_submission_atomic(
        &self,
        old: &Submission,
        new: &Submission,
    ) -> Result<(), AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        if old.team_id == new.team_id {
            let mut team = self
                .get_team(&new.team_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Team {} not found", new.team_id)))?;

            apply_points(&mut team, old, -1);
            apply_points(&mut team, new, 1);
            self.add_team_write(&mut transaction, &team)?;
        } else {
            let mut new_team = self
                .get_team(&new.team_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Team {} not found", new.team_id)))?;
            apply_points(&mut new_team, new, 1);
            self.add_team_write(&mut transaction, &new_team)?;

            // The old team may already have been deleted; skip the debit then.
            if let Some(mut old_team) = self.get_team(&old.team_id).await? {
                apply_points(&mut old_team, old, -1);
                self.add_team_write(&mut transaction, &old_team)?;
            }
        }

        self.add_submission_write(&mut transaction, new)?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            submission_id = %new.id,
            team_id = %new.team_id,
            points = new.points_awarded,
            previous_points = old.points_awarded,
            "Submission updated atomically"
        );

        Ok(())
    }

    /// Delete a submission and reverse its points, as one transaction.
    pub async fn delete_submission_atomic(&self, submission: &Submission) -> Result<(), AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        if let Some(mut team) = self.get_team(&submission.team_id).await? {
            apply_points(&mut team, submission, -1);
            self.add_team_write(&mut transaction, &team)?;
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SUBMISSIONS)
            .document_id(&submission.id)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add deletion to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            submission_id = %submission.id,
            team_id = %submission.team_id,
            points = submission.points_awarded,
            "Submission deleted atomically"
        );

        Ok(())
    }

    fn add_submission_write(
        &self,
        transaction: &mut firestore::FirestoreTransaction,
        submission: &Submission,
    ) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::SUBMISSIONS)
            .document_id(&submission.id)
            .object(submission)
            .add_to_transaction(transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add submission to transaction: {}", e))
            })?;
        Ok(())
    }

    fn add_team_write(
        &self,
        transaction: &mut firestore::FirestoreTransaction,
        team: &Team,
    ) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::TEAMS)
            .document_id(&team.id)
            .object(team)
            .add_to_transaction(transaction)
            .map_err(|e| AppError::Database(format!("Failed to add team to transaction: {}", e)))?;
        Ok(())
    }
}

/// Apply a submission's points to a team with the given sign.
///
/// Total points always move; weekly points only move when the submission's
/// activity date falls in the current week, keeping `weekly_points` equal to
/// the sum of this week's awarded points.
fn apply_points(team: &mut Team, submission: &Submission, sign: i64) {
    let points = submission.points_awarded * sign;
    team.total_points += points;
    let today = chrono::Local::now().date_naive();
    if is_within_current_week(submission.activity_date, today) {
        team.weekly_points += points;
    }
}
