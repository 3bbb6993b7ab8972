//! User profile model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User profile stored in Firestore (document ID = user id from the
/// auth provider).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    /// Auth provider user id (also used as document ID)
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    /// Admin capability flag; admin-only operations check this per call
    #[serde(default)]
    pub is_admin: bool,
    /// When the profile was created (ISO 8601)
    pub created_at: String,
}
