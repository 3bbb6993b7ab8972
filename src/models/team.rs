// SPDX-License-Identifier: MIT

//! Team model: the aggregate point holder, at most two members.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Competition tier an admin can place a team in. Tiers partition the
/// leaderboard; teams without one only appear in the unfiltered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum TeamTier {
    Gold,
    Purple,
    Red,
}

/// Stored team record in Firestore.
///
/// `weekly_points` and `total_points` are only ever changed by the atomic
/// submission operations in the db layer; nothing else may write them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Team {
    /// Document ID
    pub id: String,
    pub name: String,
    /// Shared with the second member to join
    pub invite_code: String,
    pub member1_id: Option<String>,
    pub member2_id: Option<String>,
    /// Points accrued in the current submission week
    pub weekly_points: i64,
    /// Points accrued over the whole season
    pub total_points: i64,
    /// Week-start dates ("YYYY-MM-DD") this team won
    #[serde(default)]
    pub weeks_won: Vec<String>,
    /// Admin-assigned competition tier
    #[serde(default)]
    pub tier: Option<TeamTier>,
    /// When the team was created (ISO 8601)
    pub created_at: String,
}

impl Team {
    /// Whether `user_id` is one of this team's members.
    pub fn has_member(&self, user_id: &str) -> bool {
        self.member1_id.as_deref() == Some(user_id)
            || self.member2_id.as_deref() == Some(user_id)
    }

    /// Whether both member slots are taken.
    pub fn is_full(&self) -> bool {
        self.member1_id.is_some() && self.member2_id.is_some()
    }
}
