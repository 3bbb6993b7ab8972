// SPDX-License-Identifier: MIT

//! Global game settings and the fail-closed gate checks over them.

use crate::error::ValidationFailure;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Singleton settings document controlling the competition phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GameSettings {
    /// Whether teams may be created or joined
    pub registration_open: bool,
    /// Whether activity submissions are accepted
    pub submissions_open: bool,
    /// Informational: when the games started (ISO 8601)
    pub games_started_at: Option<String>,
    /// Informational: when the games ended (ISO 8601)
    pub games_ended_at: Option<String>,
}

/// Gate on `submissions_open`. Fails closed: a missing settings document
/// rejects the request, so an infrastructure error can never silently
/// allow unrestricted submission.
pub fn ensure_submissions_open(settings: Option<&GameSettings>) -> Result<(), ValidationFailure> {
    match settings {
        Some(s) if s.submissions_open => Ok(()),
        _ => Err(ValidationFailure::SubmissionsClosed),
    }
}

/// Gate on `registration_open`, same fail-closed contract as
/// [`ensure_submissions_open`], gating team creation and joining.
pub fn ensure_registration_open(settings: Option<&GameSettings>) -> Result<(), ValidationFailure> {
    match settings {
        Some(s) if s.registration_open => Ok(()),
        _ => Err(ValidationFailure::RegistrationClosed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(registration: bool, submissions: bool) -> GameSettings {
        GameSettings {
            registration_open: registration,
            submissions_open: submissions,
            games_started_at: None,
            games_ended_at: None,
        }
    }

    #[test]
    fn test_gates_pass_when_open() {
        let s = settings(true, true);
        assert!(ensure_submissions_open(Some(&s)).is_ok());
        assert!(ensure_registration_open(Some(&s)).is_ok());
    }

    #[test]
    fn test_gates_reject_when_closed() {
        let s = settings(false, false);
        assert_eq!(
            ensure_submissions_open(Some(&s)),
            Err(ValidationFailure::SubmissionsClosed)
        );
        assert_eq!(
            ensure_registration_open(Some(&s)),
            Err(ValidationFailure::RegistrationClosed)
        );
    }

    #[test]
    fn test_gates_fail_closed_on_missing_settings() {
        assert_eq!(
            ensure_submissions_open(None),
            Err(ValidationFailure::SubmissionsClosed)
        );
        assert_eq!(
            ensure_registration_open(None),
            Err(ValidationFailure::RegistrationClosed)
        );
    }

    #[test]
    fn test_gates_are_independent() {
        let s = settings(false, true);
        assert!(ensure_submissions_open(Some(&s)).is_ok());
        assert!(ensure_registration_open(Some(&s)).is_err());
    }
}
