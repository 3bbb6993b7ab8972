// SPDX-License-Identifier: MIT

//! Submission model: one scored activity event.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The raw value a member submitted, one kind per rule input type.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionValue {
    Number(f64),
    Text(String),
    Boolean(bool),
}

/// Stored submission record in Firestore.
///
/// `points_per_unit` and `teammate_bonus` are snapshots of the rule at
/// scoring time, not live references; admin edits overwrite them from the
/// then-current rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Submission {
    /// Document ID
    pub id: String,
    /// Owning team
    pub team_id: String,
    /// Member who logged it
    pub submitted_by: String,
    /// Rule key at time of submission
    pub activity_key: String,
    /// Calendar date the activity occurred (distinct from creation time)
    pub activity_date: NaiveDate,
    /// Exactly one of these is set, matching the rule's input type
    pub activity_value_number: Option<f64>,
    pub activity_value_text: Option<String>,
    pub activity_value_bool: Option<bool>,
    /// Flags the teammate bonus
    pub did_with_teammate: bool,
    /// Units the value was scored as
    pub activity_units: f64,
    /// Rule snapshot at scoring time
    pub points_per_unit: f64,
    /// Rule snapshot at scoring time
    pub teammate_bonus: i64,
    /// Points before the teammate bonus
    pub base_points: i64,
    /// Final awarded points; always >= 1
    pub points_awarded: i64,
    /// Reserved scaling factor, 1.0 at creation, preserved across edits
    pub multiplier: f64,
    /// When this submission was created (ISO 8601)
    pub created_at: String,
}

impl Submission {
    /// The raw value stored on this record, if consistent.
    pub fn value(&self) -> Option<SubmissionValue> {
        match (
            self.activity_value_number,
            self.activity_value_text.as_ref(),
            self.activity_value_bool,
        ) {
            (Some(n), None, None) => Some(SubmissionValue::Number(n)),
            (None, Some(t), None) => Some(SubmissionValue::Text(t.clone())),
            (None, None, Some(b)) => Some(SubmissionValue::Boolean(b)),
            _ => None,
        }
    }
}
