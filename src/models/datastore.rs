//! Datastore snapshot exposed to the admin dashboard.

use serde::Serialize;

use super::{FoundItemRecord, LostItemReport, User};

/// The full collection snapshot, admin only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Datastore {
    pub schema_version: i32,
    pub generated_at: String,
    pub revision_id: i64,
    pub users: Vec<User>,
    pub lost_items: Vec<LostItemReport>,
    pub found_items: Vec<FoundItemRecord>,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
