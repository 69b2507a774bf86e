use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::JWTConfig;
use crate::error::ApiError;

/// The identity embedded in every token we issue.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaim {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Registered claims plus the identity under `data`.
#[derive(Serialize, Deserialize, Debug)]
struct Claims {
    data: IdentityClaim,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies signed, time-limited identity tokens.
///
/// The secret, issuer and lifetime are fixed at construction.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    lifetime_secs: i64,
}

impl TokenService {
    pub fn new(config: &JWTConfig) -> Self {
        TokenService {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.iss.clone(),
            lifetime_secs: config.exp,
        }
    }

    /// Sign a token for the given identity, expiring `lifetime_secs` from now.
    pub fn issue(&self, identity: IdentityClaim) -> Result<String, ApiError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    fn issue_at(&self, identity: IdentityClaim, now: i64) -> Result<String, ApiError> {
        let claims = Claims {
            data: identity,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.lifetime_secs,
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(ApiError::TokenSigning)
    }

    /// Check signature, issuer and expiry, and return the embedded identity.
    pub fn verify(&self, token: &str) -> Result<IdentityClaim, ApiError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = 0;

        let decoded =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(ApiError::InvalidToken)?;
        debug!("Verified token for user '{}'", decoded.claims.data.username);
        Ok(decoded.claims.data)
    }
}
