//! GraphQL surface: per-request context, object types, operation handlers
//! and the juniper schema tying them together.

pub mod context;
pub mod resolvers;
pub mod schema;
pub mod types;

pub use context::GraphQLContext;
pub use schema::{create_schema, Schema};
