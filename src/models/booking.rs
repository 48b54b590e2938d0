//! Service booking model and the embedded provider catalog.
//!
//! Bookings are validated and acknowledged but not persisted; the provider
//! roster is a fixed set of demo entries.

use serde::{Deserialize, Serialize};

use super::listing::ALL_CATEGORIES;

/// Maintenance service categories.
pub const SERVICE_CATEGORIES: &[&str] = &[
    "Plumbing",
    "Electrical",
    "Carpentry",
    "HVAC",
    "Laundry",
    "Cleaning",
    "Painting",
    "IT Support",
];

/// A maintenance staff member available for booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProvider {
    pub id: String,
    pub name: String,
    pub title: String,
    pub category: String,
    pub rating: f64,
    pub availability: Vec<String>,
}

/// Request body for booking a service visit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookServiceRequest {
    pub provider_id: String,
    pub date: String,
    pub time: String,
    pub description: String,
    pub location: String,
}

/// Acknowledgment returned for a validated booking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAck {
    pub id: String,
    pub provider_id: String,
    pub provider_name: String,
    pub date: String,
    pub time: String,
    pub submitted_at: String,
}

/// Query parameters for browsing providers.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersQuery {
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    ALL_CATEGORIES.to_string()
}

/// The demo provider roster.
pub fn providers() -> Vec<ServiceProvider> {
    let entry = |id: &str, name: &str, title: &str, category: &str, rating: f64, availability: &[&str]| {
        ServiceProvider {
            id: id.to_string(),
            name: name.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            rating,
            availability: availability.iter().map(|s| s.to_string()).collect(),
        }
    };

    vec![
        entry(
            "1",
            "Rajesh Kumar",
            "Plumber",
            "Plumbing",
            4.8,
            &["Mon-Fri, 9AM-5PM", "Sat, 10AM-2PM"],
        ),
        entry(
            "2",
            "Anita Sharma",
            "Electrician",
            "Electrical",
            4.9,
            &["Mon-Sat, 10AM-6PM"],
        ),
        entry(
            "3",
            "Vikram Singh",
            "Carpenter",
            "Carpentry",
            4.7,
            &["Mon-Fri, 8AM-4PM"],
        ),
        entry(
            "4",
            "Priya Patel",
            "Laundry Services",
            "Laundry",
            4.6,
            &["Mon-Sun, 7AM-7PM"],
        ),
        entry(
            "5",
            "Sanjay Mehta",
            "AC Technician",
            "HVAC",
            4.8,
            &["Mon-Sat, 9AM-5PM"],
        ),
    ]
}

/// Look up a provider by id.
pub fn find_provider(id: &str) -> Option<ServiceProvider> {
    providers().into_iter().find(|p| p.id == id)
}
