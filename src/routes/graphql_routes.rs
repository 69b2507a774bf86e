//! GraphQL endpoint handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{routing::get, Json, Router};
use juniper::http::graphiql::graphiql_source;
use juniper::http::GraphQLBatchRequest;

use crate::auth::Session;
use crate::graphql::GraphQLContext;
use crate::state::AppState;

/// Registers the GraphQL routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/graphql", get(graphiql).post(graphql_handler))
}

/// GraphQL POST endpoint, single or batched operations.
///
/// The session is resolved once per request and handed to every operation
/// in the batch.
async fn graphql_handler(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<GraphQLBatchRequest>,
) -> Response {
    let context = GraphQLContext::new(session, state.store.clone(), state.tokens.clone());
    let response = request.execute(state.schema.as_ref(), &context).await;
    let status = if response.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    (status, Json(response)).into_response()
}

/// GraphiQL page for poking at the API from a browser.
async fn graphiql() -> Html<String> {
    Html(graphiql_source("/graphql", None))
}
