#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use bookshelf::config::{extract_config, ConfigV1};
use bookshelf::routes::create_router;
use bookshelf::state::AppState;
use bookshelf::store::create_store;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
host: 127.0.0.1
port: 3001
jwt:
  secret: test-secret
  iss: bookshelf-test
  exp: 7200
store:
  type: memory
logging:
  level: debug
  format: console
"#;

pub fn load_test_config() -> ConfigV1 {
    extract_config(&Figment::new().merge(Yaml::string(TEST_CONFIG)))
        .expect("Failed to parse test config YAML")
}

pub async fn build_app(config: ConfigV1) -> (Router, Arc<ConfigV1>) {
    let config = Arc::new(config);
    let store = create_store(&config.store)
        .await
        .expect("memory store should always be created");
    let state = AppState::new(config.clone(), store);
    (create_router(state), config)
}

pub fn graphql_request(query: &str, variables: Value, authorization: Option<&str>) -> Request<Body> {
    let body = json!({ "query": query, "variables": variables });
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

/// Send one GraphQL operation and return the decoded JSON response.
pub async fn post_graphql(
    app: &Router,
    query: &str,
    variables: Value,
    authorization: Option<&str>,
) -> Value {
    let response = app
        .clone()
        .oneshot(graphql_request(query, variables, authorization))
        .await
        .expect("request should complete");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("response should be JSON")
}

/// The `extensions.code` of the first error, if any.
pub fn first_error_code(response: &Value) -> Option<&str> {
    response["errors"][0]["extensions"]["code"].as_str()
}

pub fn first_error_message(response: &Value) -> Option<&str> {
    response["errors"][0]["message"].as_str()
}
