use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::header::{HeaderMap, AUTHORIZATION};
use http::request::Parts;
use tracing::{debug, warn};

use super::token::{IdentityClaim, TokenService};
use crate::error::ApiError;
use crate::state::AppState;

/// Who is making the current request. Built fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated(IdentityClaim),
}

impl Session {
    /// Build the session from the `Authorization` header.
    ///
    /// A missing header yields an anonymous session. So does a token that
    /// fails verification: access control is left to each operation, so
    /// login and registration stay reachable with a stale token attached.
    pub fn from_headers(headers: &HeaderMap, tokens: &TokenService) -> Self {
        let Some(token) = bearer_token(headers) else {
            debug!("No token on request; continuing anonymously");
            return Session::Anonymous;
        };

        match tokens.verify(token) {
            Ok(identity) => Session::Authenticated(identity),
            Err(e) => {
                warn!("Invalid token: {}", e);
                Session::Anonymous
            }
        }
    }

    pub fn identity(&self) -> Option<&IdentityClaim> {
        match self {
            Session::Authenticated(identity) => Some(identity),
            Session::Anonymous => None,
        }
    }

    /// The caller's identity, or `Unauthenticated`.
    pub fn require_identity(&self) -> Result<&IdentityClaim, ApiError> {
        self.identity().ok_or(ApiError::Unauthenticated)
    }
}

/// Accepts `Bearer <token>` (any case) or the bare token.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

/// Extractor implementation: every request gets a session, never a rejection.
#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Infallible> {
        Ok(Session::from_headers(&parts.headers, &state.tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JWTConfig;
    use http::HeaderValue;

    fn tokens() -> TokenService {
        TokenService::new(&JWTConfig {
            secret: "test_secret".to_string(),
            iss: "test_issuer".to_string(),
            exp: 3600,
        })
    }

    fn alice() -> IdentityClaim {
        IdentityClaim {
            id: "1".to_string(),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
        }
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_is_verified() {
        let tokens = tokens();
        let token = tokens.issue(alice()).unwrap();

        let session = Session::from_headers(&headers(&format!("Bearer {}", token)), &tokens);
        let identity = session.require_identity().expect("should be authenticated");
        assert_eq!(identity.id, "1");
        assert_eq!(identity.username, "alice");
    }

    #[test]
    fn test_raw_and_lowercase_scheme_are_accepted() {
        let tokens = tokens();
        let token = tokens.issue(alice()).unwrap();

        for value in [token.clone(), format!("bearer {}", token)] {
            let session = Session::from_headers(&headers(&value), &tokens);
            assert!(session.identity().is_some(), "'{}' should authenticate", value);
        }
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        let session = Session::from_headers(&HeaderMap::new(), &tokens());
        assert_eq!(session, Session::Anonymous);
        assert!(matches!(
            session.require_identity(),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn test_empty_header_is_anonymous() {
        for value in ["", "Bearer", "Bearer   "] {
            let session = Session::from_headers(&headers(value), &tokens());
            assert_eq!(session, Session::Anonymous);
        }
    }

    #[test]
    fn test_invalid_token_is_downgraded_to_anonymous() {
        let session = Session::from_headers(&headers("Bearer invalid_token"), &tokens());
        assert_eq!(session, Session::Anonymous);
    }

    #[test]
    fn test_token_from_other_secret_is_anonymous() {
        let other = TokenService::new(&JWTConfig {
            secret: "other_secret".to_string(),
            iss: "test_issuer".to_string(),
            exp: 3600,
        });
        let token = other.issue(alice()).unwrap();
        let session = Session::from_headers(&headers(&format!("Bearer {}", token)), &tokens());
        assert_eq!(session, Session::Anonymous);
    }
}
