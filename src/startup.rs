//! Application startup and server initialization.
//!
//! Connects the user store, builds the shared state and router, and serves
//! HTTP until the process is stopped.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::routes;
use crate::state::AppState;
use crate::store::create_store;

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the user store cannot be reached, the listener
/// cannot bind to the configured address, or the server fails while running.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let store = create_store(&config.store).await?;
    let state = AppState::new(config.clone(), store);
    let app = routes::create_router(state);

    let bind_address = config.bind_address();
    let listener = TcpListener::bind(&bind_address).await?;
    info!("API server running on {}", bind_address);
    info!("GraphQL server running at http://{}/graphql", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
