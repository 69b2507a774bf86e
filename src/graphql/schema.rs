//! GraphQL schema definition.

use juniper::{graphql_object, EmptySubscription, RootNode, ID};

use super::context::GraphQLContext;
use super::resolvers;
use super::types::AuthPayload;
use crate::error::ApiError;
use crate::models::{BookInput, User};

pub struct Query;

#[graphql_object(context = GraphQLContext)]
impl Query {
    /// The signed-in user.
    async fn me(ctx: &GraphQLContext) -> Result<Option<User>, ApiError> {
        resolvers::current_user(ctx).await
    }
}

pub struct Mutation;

#[graphql_object(context = GraphQLContext)]
impl Mutation {
    async fn login(
        ctx: &GraphQLContext,
        email: String,
        password: String,
    ) -> Result<AuthPayload, ApiError> {
        resolvers::login(ctx, &email, &password).await
    }

    /// Register a new user and sign them in.
    async fn add_user(
        ctx: &GraphQLContext,
        username: String,
        email: String,
        password: String,
    ) -> Result<AuthPayload, ApiError> {
        resolvers::add_user(ctx, username, email, password).await
    }

    async fn save_book(ctx: &GraphQLContext, book: BookInput) -> Result<Option<User>, ApiError> {
        resolvers::save_book(ctx, book).await
    }

    async fn remove_book(ctx: &GraphQLContext, book_id: ID) -> Result<Option<User>, ApiError> {
        resolvers::remove_book(ctx, book_id.to_string()).await
    }
}

pub type Schema = RootNode<'static, Query, Mutation, EmptySubscription<GraphQLContext>>;

pub fn create_schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Session, TokenService};
    use crate::config::JWTConfig;
    use crate::store::memory_store::MemoryStore;
    use juniper::{graphql_value, Variables};
    use std::sync::Arc;

    fn anonymous_context() -> GraphQLContext {
        GraphQLContext::new(
            Session::Anonymous,
            Arc::new(MemoryStore::new()),
            Arc::new(TokenService::new(&JWTConfig {
                secret: "test_secret".to_string(),
                iss: "test_issuer".to_string(),
                exp: 7200,
            })),
        )
    }

    #[tokio::test]
    async fn test_me_requires_login() {
        let schema = create_schema();
        let ctx = anonymous_context();
        let (value, errors) = juniper::execute("{ me { _id } }", None, &schema, &Variables::new(), &ctx)
            .await
            .expect("query should be valid");

        assert_eq!(value, graphql_value!({ "me": null }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error().message(), "Not logged in");
    }

    #[tokio::test]
    async fn test_add_user_exposes_public_fields() {
        let schema = create_schema();
        let ctx = anonymous_context();
        let query = r#"
            mutation {
                addUser(username: "alice", email: "a@x.com", password: "pw") {
                    user { username email bookCount savedBooks { bookId } }
                }
            }
        "#;
        let (value, errors) = juniper::execute(query, None, &schema, &Variables::new(), &ctx)
            .await
            .expect("mutation should be valid");

        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        assert_eq!(
            value,
            graphql_value!({
                "addUser": {
                    "user": {
                        "username": "alice",
                        "email": "a@x.com",
                        "bookCount": 0,
                        "savedBooks": [],
                    },
                },
            })
        );
    }

    #[tokio::test]
    async fn test_password_is_not_queryable() {
        let schema = create_schema();
        let ctx = anonymous_context();
        let res = juniper::execute("{ me { password } }", None, &schema, &Variables::new(), &ctx).await;
        assert!(res.is_err(), "password must not be part of the schema");
    }
}
