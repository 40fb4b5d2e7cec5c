//! API routes for the ClawBazaar server.

pub mod agents;
pub mod editions;

use axum::Router;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Creates the main API router with all routes mounted.
///
/// CORS is open: the endpoints are consumed by browser front-ends and
/// agent-side tools alike.
pub fn create_router(pool: PgPool) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes(pool))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Creates the v1 API routes.
fn api_v1_routes(pool: PgPool) -> Router {
    Router::new()
        .nest("/agents", agents::router(pool.clone()))
        .nest("/editions", editions::router(pool))
}
