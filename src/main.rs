//! FindIt Backend
//!
//! REST backend for the FindIt campus community application: lost-and-found
//! reporting and claiming, a marketplace catalog, and service bookings.
//! SQLite persistence with Tantivy full-text search over found items.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod search;
mod verification;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use search::SearchIndex;

/// Password shared by the seeded demo accounts.
const DEMO_PASSWORD: &str = "password";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FindIt Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Index path: {:?}", config.index_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database and seed demo data on first run
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));
    repo.seed_defaults(&auth::hash_password(DEMO_PASSWORD))
        .await?;

    // Initialize search index
    let search = Arc::new(SearchIndex::open(&config.index_path)?);

    // Build initial search index from the found item collection
    tracing::info!("Building search index...");
    let found_items = repo.list_found_items().await?;
    search.rebuild(&found_items).await?;

    // Create application state
    let state = AppState {
        repo,
        search,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes; protected handlers authenticate via the CurrentUser extractor
    let api_routes = Router::new()
        // Auth
        .route("/auth/register", post(api::register))
        .route("/auth/login", post(api::login))
        .route("/auth/logout", post(api::logout))
        .route("/auth/me", get(api::me))
        // Lost items
        .route("/lost-items", get(api::list_lost_items))
        .route("/lost-items", post(api::report_lost_item))
        .route("/lost-items/{id}", get(api::get_lost_item))
        .route("/lost-items/{id}/status", put(api::update_lost_status))
        // Found items
        .route("/found-items", get(api::list_found_items))
        .route("/found-items", post(api::create_found_item))
        .route("/found-items/{id}", get(api::get_found_item))
        .route("/found-items/{id}/claim", post(api::claim_found_item))
        // Marketplace
        .route("/marketplace/listings", get(api::list_listings))
        .route("/marketplace/listings", post(api::create_listing))
        // Services
        .route("/services/providers", get(api::list_providers))
        .route("/services/bookings", post(api::book_service))
        // Search
        .route("/search", get(api::search_found_items))
        // Datastore
        .route("/datastore", get(api::get_datastore))
        .route("/datastore/revision", get(api::get_revision));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
