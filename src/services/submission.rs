// SPDX-License-Identifier: MIT

//! Submission lifecycle: orchestrates one user-facing action into a
//! validated, scored, persisted record.
//!
//! A submission moves Draft -> Validated -> Scored -> Persisted with no
//! intermediate persisted states; the single write happens only after all
//! validation and scoring succeeds.
//!
//! Create and admin-edit are deliberately separate operations with
//! different temporal semantics: create snapshots the rule at submit time,
//! edit re-prices against the current rule.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result, ValidationFailure};
use crate::models::settings::ensure_submissions_open;
use crate::models::{Submission, SubmissionValue};
use crate::services::scoring;
use crate::time_utils::{format_utc_rfc3339, is_within_current_week};
use chrono::NaiveDate;

/// Fields of a member's create-submission request.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub team_id: String,
    pub activity_key: String,
    pub activity_date: NaiveDate,
    pub did_with_teammate: bool,
    pub value_number: Option<f64>,
    pub value_text: Option<String>,
    pub value_bool: Option<bool>,
}

/// Fields of an admin edit; any of them may change, including the team.
#[derive(Debug, Clone)]
pub struct SubmissionEdit {
    pub team_id: String,
    pub activity_key: String,
    pub activity_date: NaiveDate,
    pub did_with_teammate: bool,
    pub value_number: Option<f64>,
    pub value_text: Option<String>,
    pub value_bool: Option<bool>,
}

/// Lifecycle controller over the `submissions` collection.
pub struct SubmissionService {
    db: FirestoreDb,
}

impl SubmissionService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Member create path. `today` anchors the submission-week gate.
    pub async fn create(
        &self,
        user_id: &str,
        input: NewSubmission,
        today: NaiveDate,
    ) -> Result<Submission> {
        // Resolve the caller's team; absence is a hard failure.
        let team = self
            .db
            .find_team_for_member(user_id)
            .await?
            .ok_or(ValidationFailure::NotOnTeam)?;

        // Posted team must match the resolved one (forged-team defense).
        if input.team_id != team.id {
            return Err(ValidationFailure::TeamMismatch.into());
        }

        // Fail-closed gate: unreadable settings reject the request.
        let settings = self.db.get_game_settings().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Settings read failed, treating submissions as closed");
            None
        });
        ensure_submissions_open(settings.as_ref())?;

        if !is_within_current_week(input.activity_date, today) {
            return Err(ValidationFailure::DateOutsideWeek.into());
        }

        let activity_key = input.activity_key.trim().to_string();
        if activity_key.is_empty() {
            return Err(ValidationFailure::MissingActivityKey.into());
        }

        let rule = self
            .db
            .get_rule(&activity_key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Activity rule '{}' not found", activity_key)))?;
        if !rule.active {
            return Err(ValidationFailure::RuleInactive(activity_key).into());
        }

        let value = extract_value(
            input.value_number,
            input.value_text.as_deref(),
            input.value_bool,
        )?;

        let score = scoring::score(
            rule.points_per_unit,
            rule.teammate_bonus,
            rule.input_type,
            &value,
            input.did_with_teammate,
            1.0,
        )?;

        let submission = Submission {
            id: uuid::Uuid::new_v4().to_string(),
            team_id: team.id.clone(),
            submitted_by: user_id.to_string(),
            activity_key,
            activity_date: input.activity_date,
            activity_value_number: match &value {
                SubmissionValue::Number(n) => Some(*n),
                _ => None,
            },
            activity_value_text: match &value {
                SubmissionValue::Text(t) => Some(t.clone()),
                _ => None,
            },
            activity_value_bool: match &value {
                SubmissionValue::Boolean(b) => Some(*b),
                _ => None,
            },
            did_with_teammate: input.did_with_teammate,
            activity_units: score.units,
            // Snapshot of the rule at scoring time; later admin rule edits
            // do not re-price this row.
            points_per_unit: rule.points_per_unit,
            teammate_bonus: rule.teammate_bonus,
            base_points: score.base_points,
            points_awarded: score.points_awarded,
            multiplier: 1.0,
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        self.db.insert_submission_atomic(&submission).await?;

        tracing::info!(
            submission_id = %submission.id,
            team_id = %submission.team_id,
            activity_key = %submission.activity_key,
            points = submission.points_awarded,
            "Submission created"
        );

        Ok(submission)
    }

    /// Admin edit path: re-prices the submission against the *current* rule
    /// for the (possibly changed) activity key, preserving the stored
    /// multiplier, then overwrites all computed fields.
    pub async fn admin_update(&self, id: &str, edit: SubmissionEdit) -> Result<Submission> {
        let existing = self
            .db
            .get_submission(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", id)))?;

        let activity_key = edit.activity_key.trim().to_string();
        if activity_key.is_empty() {
            return Err(ValidationFailure::MissingActivityKey.into());
        }
        if edit.team_id.trim().is_empty() {
            return Err(ValidationFailure::TeamMismatch.into());
        }

        // Missing rule fails distinctly from "rule inactive"; an inactive
        // rule is still valid for correcting historical submissions.
        let rule = self
            .db
            .get_rule(&activity_key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Activity rule '{}' not found", activity_key)))?;

        let multiplier = existing.multiplier;
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ValidationFailure::InvalidMultiplier.into());
        }

        let value = extract_value(
            edit.value_number,
            edit.value_text.as_deref(),
            edit.value_bool,
        )?;

        let score = scoring::score(
            rule.points_per_unit,
            rule.teammate_bonus,
            rule.input_type,
            &value,
            edit.did_with_teammate,
            multiplier,
        )?;

        let updated = Submission {
            id: existing.id.clone(),
            team_id: edit.team_id,
            submitted_by: existing.submitted_by.clone(),
            activity_key,
            activity_date: edit.activity_date,
            activity_value_number: match &value {
                SubmissionValue::Number(n) => Some(*n),
                _ => None,
            },
            activity_value_text: match &value {
                SubmissionValue::Text(t) => Some(t.clone()),
                _ => None,
            },
            activity_value_bool: match &value {
                SubmissionValue::Boolean(b) => Some(*b),
                _ => None,
            },
            did_with_teammate: edit.did_with_teammate,
            activity_units: score.units,
            // Snapshot overwritten with the current rule's values.
            points_per_unit: rule.points_per_unit,
            teammate_bonus: rule.teammate_bonus,
            base_points: score.base_points,
            points_awarded: score.points_awarded,
            multiplier,
            created_at: existing.created_at.clone(),
        };

        self.db.update_submission_atomic(&existing, &updated).await?;

        tracing::info!(
            submission_id = %updated.id,
            team_id = %updated.team_id,
            points = updated.points_awarded,
            previous_points = existing.points_awarded,
            "Submission updated by admin"
        );

        Ok(updated)
    }

    /// Admin delete path; the atomic delete reverses the team's points.
    pub async fn admin_delete(&self, id: &str) -> Result<()> {
        let existing = self
            .db
            .get_submission(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", id)))?;

        self.db.delete_submission_atomic(&existing).await?;

        tracing::info!(submission_id = %id, "Submission deleted by admin");
        Ok(())
    }
}

/// Reduce the three optional raw fields to exactly one value.
fn extract_value(
    number: Option<f64>,
    text: Option<&str>,
    boolean: Option<bool>,
) -> std::result::Result<SubmissionValue, ValidationFailure> {
    let text = text.map(str::trim).filter(|t| !t.is_empty());

    match (number, text, boolean) {
        (Some(n), None, None) => Ok(SubmissionValue::Number(n)),
        (None, Some(t), None) => Ok(SubmissionValue::Text(t.to_string())),
        (None, None, Some(b)) => Ok(SubmissionValue::Boolean(b)),
        (None, None, None) => Err(ValidationFailure::MissingActivityValue),
        _ => Err(ValidationFailure::WrongValueKind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_value_single_kind() {
        assert_eq!(
            extract_value(Some(2.5), None, None).unwrap(),
            SubmissionValue::Number(2.5)
        );
        assert_eq!(
            extract_value(None, Some(" City Meet "), None).unwrap(),
            SubmissionValue::Text("City Meet".to_string())
        );
        assert_eq!(
            extract_value(None, None, Some(true)).unwrap(),
            SubmissionValue::Boolean(true)
        );
    }

    #[test]
    fn test_extract_value_missing() {
        assert_eq!(
            extract_value(None, None, None).unwrap_err(),
            ValidationFailure::MissingActivityValue
        );
        // Blank text is the same as no text
        assert_eq!(
            extract_value(None, Some("   "), None).unwrap_err(),
            ValidationFailure::MissingActivityValue
        );
    }

    #[test]
    fn test_extract_value_rejects_multiple_kinds() {
        assert_eq!(
            extract_value(Some(1.0), None, Some(true)).unwrap_err(),
            ValidationFailure::WrongValueKind
        );
        assert_eq!(
            extract_value(Some(1.0), Some("x"), None).unwrap_err(),
            ValidationFailure::WrongValueKind
        );
    }

    #[test]
    fn test_extract_value_false_boolean_passes_through() {
        // Rejection of unchecked booleans happens in scoring, where it maps
        // to a distinct code; extraction itself accepts it.
        assert_eq!(
            extract_value(None, None, Some(false)).unwrap(),
            SubmissionValue::Boolean(false)
        );
    }
}
