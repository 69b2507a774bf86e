use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::warn;

use super::book::Book;
use crate::auth::IdentityClaim;
use crate::store::StoreError;

/// The User struct represents a registered account and its saved books.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Argon2 hash in PHC string format. Never the plaintext.
    pub password_hash: String,
    pub saved_books: Vec<Book>,
}

impl User {
    /// Compare a submitted plaintext password against the stored hash.
    ///
    /// Argon2 runs on the blocking pool so request workers stay free.
    pub async fn is_correct_password(&self, password: &str) -> bool {
        let stored = self.password_hash.clone();
        let password = password.to_string();
        let verified = task::spawn_blocking(move || verify_password(&stored, &password)).await;

        match verified {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                warn!("Stored password hash for user '{}' is unreadable: {}", self.id, e);
                false
            }
            Err(e) => {
                warn!("Password check for user '{}' did not complete: {}", self.id, e);
                false
            }
        }
    }

    /// The claim embedded in tokens issued for this user.
    pub fn identity(&self) -> IdentityClaim {
        IdentityClaim {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Registration input, before the password is hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        NewUser {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Field checks every store applies before inserting.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.username.trim().is_empty() {
            return Err(StoreError::Validation("Username is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(StoreError::Validation("Password is required".to_string()));
        }
        if !looks_like_email(&self.email) {
            return Err(StoreError::Validation(
                "Must use a valid email address".to_string(),
            ));
        }
        Ok(())
    }

    /// Turn the input into a stored record under `id`, hashing the password.
    pub async fn into_user(self, id: String) -> Result<User, StoreError> {
        let password_hash = hash_password(self.password).await?;
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password_hash,
            saved_books: Vec::new(),
        })
    }
}

/// Hash a plaintext password with a fresh random salt, on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, StoreError> {
    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| StoreError::Hash(e.to_string()))
    })
    .await
    .map_err(|e| StoreError::Hash(format!("hashing task failed: {}", e)))?
}

/// `Err` only when the stored hash cannot be parsed.
fn verify_password(stored: &str, password: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(stored)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// `local@domain.tld`, without whitespace.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
        }
        None => false,
    }
}
