//! Marketplace listing model and the embedded browse catalog.
//!
//! Listings submitted through the API are validated and acknowledged but not
//! persisted; the browse catalog is a fixed set of demo entries.

use serde::{Deserialize, Serialize};

/// Marketplace item categories offered by the listing form.
pub const CATEGORIES: &[&str] = &[
    "Textbooks",
    "Electronics",
    "Clothing",
    "Furniture",
    "Sports Equipment",
    "Kitchen Items",
    "Stationery",
    "Other",
];

/// Accepted item conditions.
pub const CONDITIONS: &[&str] = &["New", "Like New", "Good", "Fair", "Poor"];

/// Sentinel filter value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All Categories";

/// Whether an item is offered for sale or given away.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Sell,
    Donate,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Sell => "sell",
            ListingKind::Donate => "donate",
        }
    }
}

/// Who is offering the item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub name: String,
    pub room: String,
}

/// A marketplace listing as shown in the browse grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketListing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub price: i64,
    pub kind: ListingKind,
    pub date: String,
    pub location: String,
    pub image_url: String,
    pub seller: Seller,
}

impl MarketListing {
    pub fn matches_filter(&self, search: &str, category: &str, kind: Option<ListingKind>) -> bool {
        if category != ALL_CATEGORIES && self.category != category {
            return false;
        }
        if let Some(kind) = kind {
            if self.kind != kind {
                return false;
            }
        }
        if search.is_empty() {
            return true;
        }
        let needle = search.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Request body for listing an item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    #[serde(default)]
    pub price: Option<i64>,
    pub kind: ListingKind,
    /// Image URLs; at least one is required, at most three accepted.
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Acknowledgment returned for a validated listing submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingAck {
    pub id: String,
    pub title: String,
    pub kind: ListingKind,
    pub submitted_at: String,
}

/// Query parameters for browsing the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingsQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub kind: Option<ListingKind>,
}

fn default_category() -> String {
    ALL_CATEGORIES.to_string()
}

/// The demo browse catalog.
pub fn catalog() -> Vec<MarketListing> {
    let entry = |id: &str,
                 title: &str,
                 description: &str,
                 category: &str,
                 condition: &str,
                 price: i64,
                 kind: ListingKind,
                 date: &str,
                 location: &str,
                 image_url: &str,
                 seller_name: &str,
                 seller_room: &str| MarketListing {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        condition: condition.to_string(),
        price,
        kind,
        date: date.to_string(),
        location: location.to_string(),
        image_url: image_url.to_string(),
        seller: Seller {
            name: seller_name.to_string(),
            room: seller_room.to_string(),
        },
    };

    vec![
        entry(
            "1",
            "Physics Textbook",
            "Fundamentals of Physics by Halliday & Resnick. 10th edition, good condition with minor highlighting.",
            "Textbooks",
            "Good",
            400,
            ListingKind::Sell,
            "2023-06-10",
            "Hostel Block A",
            "https://images.unsplash.com/photo-1532012197267-da84d127e765?q=80&w=400",
            "Alex Johnson",
            "A-205",
        ),
        entry(
            "2",
            "Scientific Calculator",
            "Casio FX-991EX scientific calculator. Like new, includes cover and manual.",
            "Electronics",
            "Like New",
            800,
            ListingKind::Sell,
            "2023-06-08",
            "Hostel Block B",
            "https://images.unsplash.com/photo-1564438497-80a5fe87447a?q=80&w=400",
            "Sarah Patel",
            "B-118",
        ),
        entry(
            "3",
            "Winter Jacket",
            "Medium size black winter jacket, barely used. Very warm and comfortable.",
            "Clothing",
            "Good",
            600,
            ListingKind::Sell,
            "2023-06-07",
            "Hostel Block A",
            "https://images.unsplash.com/photo-1539533113208-f6df8cc8b543?q=80&w=400",
            "Mike Chen",
            "A-312",
        ),
        entry(
            "4",
            "Chemistry Lab Coat",
            "Standard white lab coat, size L. No stains or damage. Free to a good home!",
            "Clothing",
            "Good",
            0,
            ListingKind::Donate,
            "2023-06-05",
            "Hostel Block B",
            "https://images.unsplash.com/photo-1584308878768-57d8546e3ffa?q=80&w=400",
            "Emma Clark",
            "B-240",
        ),
        entry(
            "5",
            "Desk Lamp",
            "Adjustable LED desk lamp with multiple brightness levels. Includes USB charging port.",
            "Furniture",
            "Like New",
            350,
            ListingKind::Sell,
            "2023-06-03",
            "Hostel Block A",
            "https://images.unsplash.com/photo-1534965187426-13b05740388f?q=80&w=400",
            "David Kim",
            "A-127",
        ),
        entry(
            "6",
            "Yoga Mat",
            "Purple 6mm thick yoga mat. Lightly used, clean and in great condition.",
            "Sports Equipment",
            "Good",
            200,
            ListingKind::Sell,
            "2023-06-01",
            "Hostel Block B",
            "https://images.unsplash.com/photo-1591291621164-2c6367723315?q=80&w=400",
            "Priya Singh",
            "B-305",
        ),
    ]
}
