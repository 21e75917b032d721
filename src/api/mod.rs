mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

/// Base URL for live-prototype links when DOCUVERSE_DEMO_BASE is unset.
pub const DEFAULT_DEMO_BASE: &str = "http://localhost:5173/demo/";

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Base URL the prototype links in generated reports point at.
    pub demo_base: String,
}

/// Build the router with the demo-link base taken from the environment.
pub fn create_router(db: Database) -> Router {
    let demo_base =
        std::env::var("DOCUVERSE_DEMO_BASE").unwrap_or_else(|_| DEFAULT_DEMO_BASE.to_string());
    create_router_with(db, demo_base)
}

pub fn create_router_with(db: Database, demo_base: String) -> Router {
    let api = Router::new()
        // Projects
        .route("/projects", get(handlers::list_projects))
        .route("/projects", post(handlers::create_project))
        .route("/projects/{id}", get(handlers::get_project))
        .route("/projects/{id}", put(handlers::update_project))
        .route("/projects/{id}", delete(handlers::delete_project))
        // Reports
        .route("/projects/{id}/report", get(handlers::download_report))
        .route("/reports", post(handlers::build_report))
        // Estimation
        .route("/estimate", get(handlers::get_estimate))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { db, demo_base })
}
