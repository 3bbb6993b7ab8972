// SPDX-License-Identifier: MIT

//! Spartan Games: team fitness competition backend.
//!
//! Two-person teams log dated activities; an admin-configurable scoring
//! engine turns each log into points, and Firestore transactions keep team
//! point totals consistent with the submissions that produced them.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{RulesService, SubmissionService, TeamsService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub rules: RulesService,
    pub submissions: SubmissionService,
    pub teams: TeamsService,
}

impl AppState {
    /// Build the state from a config and database handle.
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        Self {
            rules: RulesService::new(db.clone()),
            submissions: SubmissionService::new(db.clone()),
            teams: TeamsService::new(db.clone()),
            config,
            db,
        }
    }
}
