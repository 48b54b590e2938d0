//! Found item record model matching the frontend FoundItem interface.

use serde::{Deserialize, Serialize};

/// Location tag shared by the report form and the found-items filter.
pub const LOCATIONS: &[&str] = &[
    "Dining Hall",
    "Study Room",
    "Library",
    "Sports Complex",
    "Hostel Block A",
    "Hostel Block B",
    "Cafeteria",
    "Lecture Hall",
    "Lab Complex",
    "Other",
];

/// Sentinel filter value meaning "no location filter".
pub const ALL_LOCATIONS: &str = "All Locations";

/// Status of a found item. One-way: `available -> claimed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FoundStatus {
    Available,
    Claimed,
}

impl FoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoundStatus::Available => "available",
            FoundStatus::Claimed => "claimed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(FoundStatus::Available),
            "claimed" => Some(FoundStatus::Claimed),
            _ => None,
        }
    }
}

/// An item handed in at the lost and found desk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundItemRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub date_found: String,
    pub image_url: String,
    pub status: FoundStatus,
    pub staff_id: String,
    pub staff_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<String>,
}

impl FoundItemRecord {
    /// Case-insensitive substring match over name and description, plus an
    /// exact location tag match ("All Locations" disables the location
    /// filter). Only available items are browsable.
    pub fn matches_filter(&self, search: &str, location: &str) -> bool {
        if self.status != FoundStatus::Available {
            return false;
        }

        let matches_location = location == ALL_LOCATIONS || self.location == location;
        if !matches_location {
            return false;
        }

        if search.is_empty() {
            return true;
        }
        let needle = search.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Request body for logging a found item (staff only).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFoundItemRequest {
    pub name: String,
    pub description: String,
    pub location: String,
    pub date_found: String,
    pub image_url: String,
}

/// Query parameters for browsing found items.
#[derive(Debug, Clone, Deserialize)]
pub struct FoundItemsQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_location")]
    pub location: String,
}

fn default_location() -> String {
    ALL_LOCATIONS.to_string()
}

/// Result of a claim attempt on a found item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    /// Whether the verification scan passed.
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<FoundItemRecord>,
    /// Id of the lost report matched and closed by this claim, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_lost_item_id: Option<String>,
    pub points_awarded: i64,
}
