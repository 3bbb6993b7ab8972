// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.
//!
//! Every validation rejection carries a distinct machine-readable code so
//! the frontend can render an actionable message instead of a generic one.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Admin capability required")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// A named validation failure.
///
/// Each variant maps to the error code the original form flow surfaced via
/// its `?error=` query parameter, so existing frontend copy keeps working.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("Activity key is required")]
    MissingActivityKey,

    #[error("An activity value is required")]
    MissingActivityValue,

    #[error("The submitted value does not match the activity's input type")]
    WrongValueKind,

    #[error("Numeric value must be finite")]
    ValueNotFinite,

    #[error("Units must be a positive amount")]
    NonPositiveUnits,

    #[error("Text value must not be blank")]
    EmptyTextValue,

    #[error("A boolean activity can only be submitted when checked")]
    BoolUnchecked,

    #[error("Activity '{0}' is not currently active")]
    RuleInactive(String),

    #[error("You are not on a team")]
    NotOnTeam,

    #[error("Submitted team does not match your team")]
    TeamMismatch,

    #[error("Activity date is outside the current submission week")]
    DateOutsideWeek,

    #[error("Submissions are currently closed")]
    SubmissionsClosed,

    #[error("Team registration is currently closed")]
    RegistrationClosed,

    #[error("points_per_unit must be a finite non-negative number")]
    InvalidPointsPerUnit,

    #[error("teammate_bonus must be a finite non-negative number")]
    InvalidTeammateBonus,

    #[error("multiplier must be a finite positive number")]
    InvalidMultiplier,

    #[error("Computed points must be positive")]
    PointsNotPositive,

    #[error("Team name must be 2-40 characters")]
    InvalidTeamName,

    #[error("Invalid invite code")]
    InvalidInviteCode,

    #[error("Team already has two members")]
    TeamFull,

    #[error("You are already on a team")]
    AlreadyOnTeam,

    #[error("Confirmation text must be RESET")]
    ResetConfirmationMismatch,
}

impl ValidationFailure {
    /// Stable machine-readable code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingActivityKey => "missing_activity_key",
            Self::MissingActivityValue => "missing_activity_value",
            Self::WrongValueKind => "wrong_value_kind",
            Self::ValueNotFinite => "invalid_numeric_value",
            Self::NonPositiveUnits => "invalid_units",
            Self::EmptyTextValue => "empty_text_value",
            Self::BoolUnchecked => "value_bool_unchecked",
            Self::RuleInactive(_) => "rule_inactive",
            Self::NotOnTeam => "not_on_team",
            Self::TeamMismatch => "team_mismatch",
            Self::DateOutsideWeek => "date_outside_week",
            Self::SubmissionsClosed => "submissions_closed",
            Self::RegistrationClosed => "registration_closed",
            Self::InvalidPointsPerUnit => "invalid_points_per_unit",
            Self::InvalidTeammateBonus => "invalid_teammate_bonus",
            Self::InvalidMultiplier => "invalid_multiplier",
            Self::PointsNotPositive => "points_zero",
            Self::InvalidTeamName => "invalid_team_name",
            Self::InvalidInviteCode => "invalid_invite_code",
            Self::TeamFull => "team_full",
            Self::AlreadyOnTeam => "already_on_team",
            Self::ResetConfirmationMismatch => "reset_confirmation_mismatch",
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "not_authenticated".to_string(),
                None,
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "not_admin".to_string(), None),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "not_found".to_string(),
                Some(msg.clone()),
            ),
            AppError::Validation(failure) => (
                StatusCode::BAD_REQUEST,
                failure.code().to_string(),
                Some(failure.to_string()),
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error".to_string(),
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse { error, details };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_codes_are_distinct() {
        let failures = [
            ValidationFailure::MissingActivityKey,
            ValidationFailure::MissingActivityValue,
            ValidationFailure::WrongValueKind,
            ValidationFailure::ValueNotFinite,
            ValidationFailure::NonPositiveUnits,
            ValidationFailure::EmptyTextValue,
            ValidationFailure::BoolUnchecked,
            ValidationFailure::RuleInactive("running".to_string()),
            ValidationFailure::NotOnTeam,
            ValidationFailure::TeamMismatch,
            ValidationFailure::DateOutsideWeek,
            ValidationFailure::SubmissionsClosed,
            ValidationFailure::RegistrationClosed,
            ValidationFailure::InvalidPointsPerUnit,
            ValidationFailure::InvalidTeammateBonus,
            ValidationFailure::InvalidMultiplier,
            ValidationFailure::PointsNotPositive,
            ValidationFailure::InvalidTeamName,
            ValidationFailure::InvalidInviteCode,
            ValidationFailure::TeamFull,
            ValidationFailure::AlreadyOnTeam,
            ValidationFailure::ResetConfirmationMismatch,
        ];

        let mut codes: Vec<&str> = failures.iter().map(|f| f.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), failures.len());
    }
}
