//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const PROFILES: &str = "profiles";
    pub const TEAMS: &str = "teams";
    pub const SUBMISSIONS: &str = "submissions";
    pub const ACTIVITY_RULES: &str = "activity_rules";
    /// Singleton settings collection; the one document is [`SETTINGS_DOC`]
    pub const GAME_SETTINGS: &str = "game_settings";
}

/// Document ID of the singleton settings row.
pub const SETTINGS_DOC: &str = "global";
