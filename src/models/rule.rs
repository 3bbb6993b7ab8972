// SPDX-License-Identifier: MIT

//! Activity rule model: the admin-controlled scoring definition for one
//! submittable activity type.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Which raw value field a submission for this activity must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Number,
    Text,
    Boolean,
}

/// Stored activity rule in Firestore (document ID = `activity_key`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityRule {
    /// Stable slug identifier (lowercase, underscore-separated)
    pub activity_key: String,
    /// Display name; frontends fall back to the key when absent
    pub label: Option<String>,
    /// Input type determining how units are derived
    pub input_type: InputType,
    /// Descriptive unit for the input ("miles", "hours", ...)
    pub unit_label: Option<String>,
    /// Points awarded per unit of input
    pub points_per_unit: f64,
    /// Flat bonus when the submission is flagged "with teammate"
    pub teammate_bonus: i64,
    /// Form hint: minimum input value
    pub min_value: Option<f64>,
    /// Form hint: input step
    pub step_value: Option<f64>,
    /// Reserved: weekly bound on units for this activity (not enforced)
    pub weekly_cap: Option<i64>,
    /// Inactive rules are hidden from the submit form but still score
    /// historical submissions via their stored snapshots
    pub active: bool,
    /// Last admin update (ISO 8601)
    pub updated_at: String,
}

impl ActivityRule {
    /// Display label, falling back to the key.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.activity_key)
    }
}

const DEFAULT_POINTS_PER_UNIT: f64 = 10.0;
const DEFAULT_TEAMMATE_BONUS: i64 = 15;

/// The built-in rule table `reset_to_defaults` restores.
///
/// Key, label, unit label, input type, min, step. Rates are uniform;
/// admins tune them from the scoring editor afterwards.
const DEFAULT_TABLE: &[(
    &str,
    &str,
    Option<&str>,
    InputType,
    Option<f64>,
    Option<f64>,
)] = &[
    (
        "sport_practice",
        "Sport practice",
        Some("hours"),
        InputType::Number,
        Some(0.0),
        Some(0.25),
    ),
    (
        "running",
        "Running",
        Some("miles"),
        InputType::Number,
        Some(0.0),
        Some(0.1),
    ),
    (
        "cycling",
        "Cycling",
        Some("miles"),
        InputType::Number,
        Some(0.0),
        Some(0.1),
    ),
    (
        "gyming",
        "Gyming",
        Some("hours"),
        InputType::Number,
        Some(0.0),
        Some(0.25),
    ),
    (
        "swimming",
        "Swimming",
        Some("laps"),
        InputType::Number,
        Some(0.0),
        Some(1.0),
    ),
    (
        "sporting",
        "Sporting",
        Some("games"),
        InputType::Number,
        Some(0.0),
        Some(1.0),
    ),
    (
        "calorie_goal",
        "Hitting Calorie Goal for Day",
        None,
        InputType::Boolean,
        None,
        None,
    ),
    (
        "races",
        "Races",
        Some("races"),
        InputType::Number,
        Some(0.0),
        Some(1.0),
    ),
    (
        "powerlifting_meet",
        "Powerlifting meet",
        Some("name of meet"),
        InputType::Text,
        None,
        None,
    ),
    (
        "bodybuilding_show",
        "Body building show",
        Some("name of show"),
        InputType::Text,
        None,
        None,
    ),
    (
        "win_tournament",
        "Win a tournament",
        Some("name of tournament"),
        InputType::Text,
        None,
        None,
    ),
    (
        "sleep",
        "Sleep",
        Some("hours"),
        InputType::Number,
        Some(0.0),
        Some(0.25),
    ),
];

/// Build the default rule set, stamped with `updated_at`.
pub fn default_rules(updated_at: &str) -> Vec<ActivityRule> {
    DEFAULT_TABLE
        .iter()
        .map(
            |&(key, label, unit_label, input_type, min_value, step_value)| ActivityRule {
                activity_key: key.to_string(),
                label: Some(label.to_string()),
                input_type,
                unit_label: unit_label.map(String::from),
                points_per_unit: DEFAULT_POINTS_PER_UNIT,
                teammate_bonus: DEFAULT_TEAMMATE_BONUS,
                min_value,
                step_value,
                weekly_cap: None,
                active: true,
                updated_at: updated_at.to_string(),
            },
        )
        .collect()
}
