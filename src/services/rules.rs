// SPDX-License-Identifier: MIT

//! Activity rule registry: the single source of truth for how each
//! activity type scores.
//!
//! All mutating operations are admin-only; handlers check the capability
//! before calling in here.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result, ValidationFailure};
use crate::models::{default_rules, ActivityRule, InputType};
use crate::time_utils::format_utc_rfc3339;

/// Admin-supplied fields for one rule upsert.
#[derive(Debug, Clone)]
pub struct RuleInput {
    pub activity_key: String,
    pub label: Option<String>,
    pub input_type: InputType,
    pub unit_label: Option<String>,
    pub points_per_unit: f64,
    /// Accepted as a float, truncated to an integer on save
    pub teammate_bonus: f64,
    pub min_value: Option<f64>,
    pub step_value: Option<f64>,
    pub weekly_cap: Option<i64>,
    pub active: bool,
}

/// Registry over the `activity_rules` collection.
pub struct RulesService {
    db: FirestoreDb,
}

impl RulesService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Look up a rule by key.
    pub async fn get(&self, activity_key: &str) -> Result<Option<ActivityRule>> {
        self.db.get_rule(activity_key).await.map_err(Into::into)
    }

    /// List rules, optionally only the active ones shown on the submit form.
    pub async fn list(&self, active_only: bool) -> Result<Vec<ActivityRule>> {
        self.db.list_rules(active_only).await.map_err(Into::into)
    }

    /// Validate and upsert one rule. Conflict on key replaces fields in
    /// place; this is an idempotent upsert, not an append.
    pub async fn upsert(&self, input: RuleInput) -> Result<ActivityRule> {
        let rule = build_rule(input, &now())?;
        self.db.upsert_rule(&rule).await?;

        tracing::info!(activity_key = %rule.activity_key, "Activity rule upserted");
        Ok(rule)
    }

    /// Validate and upsert a whole rule table at once (the scoring editor
    /// saves every row in one request). All rows are validated before any
    /// write happens.
    pub async fn upsert_bulk(&self, inputs: Vec<RuleInput>) -> Result<Vec<ActivityRule>> {
        if inputs.is_empty() {
            return Err(ValidationFailure::MissingActivityKey.into());
        }

        let stamp = now();
        let rules = inputs
            .into_iter()
            .map(|input| build_rule(input, &stamp))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.db.upsert_rules(&rules).await?;

        tracing::info!(count = rules.len(), "Activity rules bulk upserted");
        Ok(rules)
    }

    /// Restore the built-in default rule table. Upserts by key, so running
    /// it twice produces an identical table.
    pub async fn reset_to_defaults(&self) -> Result<Vec<ActivityRule>> {
        let rules = default_rules(&now());
        self.db.upsert_rules(&rules).await?;

        tracing::info!(count = rules.len(), "Activity rules reset to defaults");
        Ok(rules)
    }

    /// Delete a rule. Existing submissions keep their snapshot values; new
    /// submissions under this key will fail until it is recreated.
    pub async fn delete(&self, activity_key: &str) -> Result<()> {
        if self.db.get_rule(activity_key).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Activity rule '{}' not found",
                activity_key
            )));
        }

        self.db.delete_rule(activity_key).await?;

        tracing::info!(activity_key, "Activity rule deleted");
        Ok(())
    }
}

fn now() -> String {
    format_utc_rfc3339(chrono::Utc::now())
}

/// Normalize an admin-entered key to slug form: trimmed, lowercased,
/// whitespace runs collapsed to a single underscore.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Upper bound on either rate. Keeps every reachable point total far away
/// from i64 range even when multiplied by large unit counts.
const MAX_RATE: f64 = 1_000_000.0;

fn build_rule(input: RuleInput, updated_at: &str) -> std::result::Result<ActivityRule, ValidationFailure> {
    let activity_key = normalize_key(&input.activity_key);
    if activity_key.is_empty() {
        return Err(ValidationFailure::MissingActivityKey);
    }
    if !input.points_per_unit.is_finite()
        || input.points_per_unit < 0.0
        || input.points_per_unit > MAX_RATE
    {
        return Err(ValidationFailure::InvalidPointsPerUnit);
    }
    if !input.teammate_bonus.is_finite()
        || input.teammate_bonus < 0.0
        || input.teammate_bonus > MAX_RATE
    {
        return Err(ValidationFailure::InvalidTeammateBonus);
    }

    Ok(ActivityRule {
        activity_key,
        label: input.label.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
        input_type: input.input_type,
        unit_label: input.unit_label,
        points_per_unit: input.points_per_unit,
        // Bonus is always truncated to an integer, even if submitted as a decimal
        teammate_bonus: input.teammate_bonus.trunc() as i64,
        min_value: input.min_value,
        step_value: input.step_value,
        weekly_cap: input.weekly_cap,
        active: input.active,
        updated_at: updated_at.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(key: &str, ppu: f64, bonus: f64) -> RuleInput {
        RuleInput {
            activity_key: key.to_string(),
            label: None,
            input_type: InputType::Number,
            unit_label: None,
            points_per_unit: ppu,
            teammate_bonus: bonus,
            min_value: None,
            step_value: None,
            weekly_cap: None,
            active: true,
        }
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Trail  Running"), "trail_running");
        assert_eq!(normalize_key("  running "), "running");
        assert_eq!(normalize_key("ICE\tBATH"), "ice_bath");
        assert_eq!(normalize_key("  "), "");
    }

    #[test]
    fn test_build_rule_truncates_bonus() {
        let rule = build_rule(input("running", 10.0, 15.9), "2026-01-01T00:00:00Z").unwrap();
        assert_eq!(rule.teammate_bonus, 15);
    }

    #[test]
    fn test_build_rule_rejects_bad_rates() {
        assert_eq!(
            build_rule(input("running", -1.0, 15.0), "t").unwrap_err(),
            ValidationFailure::InvalidPointsPerUnit
        );
        assert_eq!(
            build_rule(input("running", f64::NAN, 15.0), "t").unwrap_err(),
            ValidationFailure::InvalidPointsPerUnit
        );
        assert_eq!(
            build_rule(input("running", 10.0, -0.5), "t").unwrap_err(),
            ValidationFailure::InvalidTeammateBonus
        );
    }

    #[test]
    fn test_build_rule_rejects_oversized_rates() {
        // Enormous bonuses would otherwise saturate to i64::MAX on save and
        // push later with-teammate scores into saturation.
        assert_eq!(
            build_rule(input("running", 10.0, 1e19), "t").unwrap_err(),
            ValidationFailure::InvalidTeammateBonus
        );
        assert_eq!(
            build_rule(input("running", 1e19, 15.0), "t").unwrap_err(),
            ValidationFailure::InvalidPointsPerUnit
        );
        assert!(build_rule(input("running", MAX_RATE, MAX_RATE), "t").is_ok());
    }

    #[test]
    fn test_build_rule_rejects_blank_key() {
        assert_eq!(
            build_rule(input("   ", 10.0, 15.0), "t").unwrap_err(),
            ValidationFailure::MissingActivityKey
        );
    }

    #[test]
    fn test_build_rule_normalizes_key_and_label() {
        let mut i = input("Cold  Plunge", 5.0, 3.0);
        i.label = Some("  Cold plunge  ".to_string());
        let rule = build_rule(i, "t").unwrap();
        assert_eq!(rule.activity_key, "cold_plunge");
        assert_eq!(rule.label.as_deref(), Some("Cold plunge"));
    }
}
