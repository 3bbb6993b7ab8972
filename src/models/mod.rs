// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod rule;
pub mod settings;
pub mod submission;
pub mod team;
pub mod user;

pub use rule::{default_rules, ActivityRule, InputType};
pub use settings::GameSettings;
pub use submission::{Submission, SubmissionValue};
pub use team::{Team, TeamTier};
pub use user::Profile;
