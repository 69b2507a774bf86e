use std::sync::Arc;

use crate::auth::{Session, TokenService};
use crate::store::UserStore;

/// GraphQL request context
///
/// The caller's session plus the shared services the resolvers need.
pub struct GraphQLContext {
    pub session: Session,
    pub store: Arc<dyn UserStore>,
    pub tokens: Arc<TokenService>,
}

impl juniper::Context for GraphQLContext {}

impl GraphQLContext {
    pub fn new(session: Session, store: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self {
            session,
            store,
            tokens,
        }
    }
}
