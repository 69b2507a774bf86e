//! Shared application state.
//!
//! Contains the state that is shared across all request handlers:
//! configuration, token service, user store and the GraphQL schema.

use crate::auth::TokenService;
use crate::config::ConfigV1;
use crate::graphql::Schema;
use crate::store::UserStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Everything in here is immutable after startup; per-request data lives
/// in the `GraphQLContext` built for each request.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Signs and verifies identity tokens.
    pub tokens: Arc<TokenService>,
    /// User persistence.
    pub store: Arc<dyn UserStore>,
    pub schema: Arc<Schema>,
}

impl AppState {
    pub fn new(config: Arc<ConfigV1>, store: Arc<dyn UserStore>) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt));
        AppState {
            config,
            tokens,
            store,
            schema: Arc::new(crate::graphql::create_schema()),
        }
    }
}
