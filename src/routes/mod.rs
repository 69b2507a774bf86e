//! HTTP route definitions and handlers.
//!
//! The GraphQL endpoint does all the real work; health checks sit beside it.

mod graphql_routes;
mod health_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Creates the application router with all configured routes.
///
/// Combines all route modules into a single router and attaches
/// the application state for access in handlers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(graphql_routes::routes())
        .merge(health_routes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
