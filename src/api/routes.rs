use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::analytics::{get_link_analytics, get_overview};
use super::handlers::{health_check, list_links, AppState};

pub fn create_api_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/links", get(list_links))
        .route("/analytics", get(get_overview))
        .route("/analytics/{id}", get(get_link_analytics))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
