//! Errors surfaced by the GraphQL operation handlers.

use juniper::{FieldError, IntoFieldError, Object, ScalarValue, Value};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// Failures an operation handler can report to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No identity in the session where one is required.
    #[error("Not logged in")]
    Unauthenticated,

    /// Login failed. Deliberately the same for "no such user" and "wrong password".
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signature, issuer, expiry or format check failed. Only used internally:
    /// the session builder downgrades it to an anonymous session.
    #[error("Invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("A user with that username or email already exists")]
    DuplicateUser,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to sign token: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    #[error("Store error: {0}")]
    Store(String),
}

impl ApiError {
    /// The `extensions.code` reported alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated | ApiError::InvalidCredentials | ApiError::InvalidToken(_) => {
                "UNAUTHENTICATED"
            }
            ApiError::DuplicateUser | ApiError::InvalidInput(_) => "BAD_USER_INPUT",
            ApiError::TokenSigning(_) | ApiError::Store(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => ApiError::DuplicateUser,
            StoreError::Validation(msg) => ApiError::InvalidInput(msg),
            other => ApiError::Store(other.to_string()),
        }
    }
}

impl<S: ScalarValue> IntoFieldError<S> for ApiError {
    fn into_field_error(self) -> FieldError<S> {
        let code = self.code();
        // Internal details stay in the logs.
        let message = match &self {
            ApiError::TokenSigning(_) | ApiError::Store(_) => {
                error!("Operation failed: {}", self);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let mut extensions = Object::with_capacity(1);
        extensions.add_field("code", Value::scalar(code.to_string()));
        FieldError::new(message, Value::object(extensions))
    }
}
