use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::{memory_store::MemoryStore, mongodb_store::MongoDBStore};
use crate::config::StoreConfig;
use crate::models::{Book, NewUser, User};

/// Failures reported by a user store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Username or email is already taken.
    #[error("duplicate username or email")]
    Duplicate,
    #[error("{0}")]
    Validation(String),
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("{0}")]
    Backend(String),
}

/// Lookup keys accepted by `UserStore::find_one`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Email(String),
}

/// Atomic updates on a user's saved books, keyed by `book_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedBooksUpdate {
    /// Append the book unless one with the same `book_id` is already saved.
    AddToSet(Book),
    /// Remove any saved book with this `book_id`.
    Pull { book_id: String },
}

/// The UserStore trait abstracts user persistence.
///
/// Implementations hash passwords on `create`, enforce unique usernames and
/// emails, and apply each `SavedBooksUpdate` atomically so concurrent
/// updates to the same user never overwrite each other.
#[async_trait]
pub trait UserStore: Send + Sync {
    fn get_name(&self) -> &str;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError>;
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;
    /// Apply `update` to the user `id` and return the updated record,
    /// or `None` if no such user exists.
    async fn find_by_id_and_update(
        &self,
        id: &str,
        update: SavedBooksUpdate,
    ) -> Result<Option<User>, StoreError>;
}

/// Creates a concrete store implementation based on the StoreConfig.
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn UserStore>, StoreError> {
    match config {
        StoreConfig::MongoDB(mongo_config) => {
            let store = MongoDBStore::new(mongo_config).await?;
            info!("Successfully created MongoDB store.");
            Ok(Arc::new(store))
        }
        StoreConfig::Memory => {
            info!("Using in-memory user store; data is lost on restart.");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
