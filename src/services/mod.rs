// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod rules;
pub mod scoring;
pub mod submission;
pub mod teams;

pub use rules::{RuleInput, RulesService};
pub use scoring::Score;
pub use submission::{NewSubmission, SubmissionEdit, SubmissionService};
pub use teams::TeamsService;
