//! Data models for the FindIt application.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

pub mod booking;
mod datastore;
mod found_item;
pub mod listing;
mod lost_item;
mod user;

pub use datastore::*;
pub use found_item::*;
pub use listing::{
    CreateListingRequest, ListingAck, ListingKind, ListingsQuery, MarketListing, Seller,
};
pub use lost_item::*;
pub use user::*;

pub use booking::{BookServiceRequest, BookingAck, ProvidersQuery, ServiceProvider};
