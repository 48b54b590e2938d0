//! Lost item report model matching the frontend LostItem interface.

use serde::{Deserialize, Serialize};

/// Status of a lost item report. Progression is strictly one-way:
/// `not_found -> matched -> claimed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LostStatus {
    NotFound,
    Matched,
    Claimed,
}

impl LostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LostStatus::NotFound => "not_found",
            LostStatus::Matched => "matched",
            LostStatus::Claimed => "claimed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_found" => Some(LostStatus::NotFound),
            "matched" => Some(LostStatus::Matched),
            "claimed" => Some(LostStatus::Claimed),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            LostStatus::NotFound => 0,
            LostStatus::Matched => 1,
            LostStatus::Claimed => 2,
        }
    }

    /// Whether a transition to `next` respects the one-way ordering.
    pub fn can_advance_to(&self, next: LostStatus) -> bool {
        next.rank() > self.rank()
    }
}

/// A lost item reported by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LostItemReport {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub date_lost: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub status: LostStatus,
    pub date_reported: String,
}

/// Request body for reporting a lost item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLostItemRequest {
    pub name: String,
    pub description: String,
    pub location: String,
    pub date_lost: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Request body for advancing a report's status (staff only).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLostStatusRequest {
    pub status: LostStatus,
}

/// A freshly filed report plus any points the reporter earned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLostItemResponse {
    pub report: LostItemReport,
    pub points_awarded: i64,
}
