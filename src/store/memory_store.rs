use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;
use tracing::debug;

use super::{SavedBooksUpdate, StoreError, UserFilter, UserStore};
use crate::models::{NewUser, User};

/// A process-local store. Writers are serialized by the lock, which gives
/// the same per-update atomicity as the MongoDB operators.
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    fn get_name(&self) -> &str {
        "memory"
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        let found = users.values().find(|u| match filter {
            UserFilter::Email(email) => &u.email == email,
        });
        Ok(found.cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        new_user.validate()?;
        // Hash outside the lock; it is the slow part.
        let user = new_user.into_user(ObjectId::new().to_hex()).await?;

        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Duplicate);
        }
        debug!("Inserting user '{}' with id {}", user.username, user.id);
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id_and_update(
        &self,
        id: &str,
        update: SavedBooksUpdate,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(id) else {
            return Ok(None);
        };

        match update {
            SavedBooksUpdate::AddToSet(book) => {
                if !user.saved_books.iter().any(|b| b.book_id == book.book_id) {
                    user.saved_books.push(book);
                }
            }
            SavedBooksUpdate::Pull { book_id } => {
                user.saved_books.retain(|b| b.book_id != book_id);
            }
        }
        Ok(Some(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    async fn store_with_alice() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let user = store
            .create(NewUser::new("alice", "a@x.com", "pw"))
            .await
            .expect("create should succeed");
        (store, user)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let (store, user) = store_with_alice().await;
        assert!(user.saved_books.is_empty());
        assert!(user.is_correct_password("pw").await);

        let by_id = store.find_by_id(&user.id).await.unwrap();
        assert_eq!(by_id.as_ref(), Some(&user));

        let by_email = store
            .find_one(&UserFilter::Email("a@x.com".to_string()))
            .await
            .unwrap();
        assert_eq!(by_email, Some(user));

        let missing = store
            .find_one(&UserFilter::Email("nobody@x.com".to_string()))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_is_rejected() {
        let (store, _) = store_with_alice().await;

        let same_email = store.create(NewUser::new("bob", "a@x.com", "pw")).await;
        assert!(matches!(same_email, Err(StoreError::Duplicate)));

        let same_username = store.create(NewUser::new("alice", "b@x.com", "pw")).await;
        assert!(matches!(same_username, Err(StoreError::Duplicate)));

        assert!(store.create(NewUser::new("bob", "b@x.com", "pw")).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let store = MemoryStore::new();
        let res = store.create(NewUser::new("alice", "not-an-email", "pw")).await;
        assert!(matches!(res, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_to_set_is_idempotent() {
        let (store, user) = store_with_alice().await;
        let book = Book::with_id("b1");

        for _ in 0..2 {
            let updated = store
                .find_by_id_and_update(&user.id, SavedBooksUpdate::AddToSet(book.clone()))
                .await
                .unwrap()
                .expect("user exists");
            assert_eq!(updated.saved_books, vec![book.clone()]);
        }

        // Same key with different details does not add a second entry.
        let mut retitled = book.clone();
        retitled.title = Some("Another title".to_string());
        let updated = store
            .find_by_id_and_update(&user.id, SavedBooksUpdate::AddToSet(retitled))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.saved_books.len(), 1);
    }

    #[tokio::test]
    async fn test_pull_absent_book_is_a_noop() {
        let (store, user) = store_with_alice().await;
        store
            .find_by_id_and_update(&user.id, SavedBooksUpdate::AddToSet(Book::with_id("b1")))
            .await
            .unwrap();

        let updated = store
            .find_by_id_and_update(
                &user.id,
                SavedBooksUpdate::Pull {
                    book_id: "missing".to_string(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.saved_books, vec![Book::with_id("b1")]);

        let updated = store
            .find_by_id_and_update(
                &user.id,
                SavedBooksUpdate::Pull {
                    book_id: "b1".to_string(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(updated.saved_books.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_create_does_not_starve_other_tasks() {
        let store = MemoryStore::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = ticks.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    ticks.fetch_add(1, Ordering::Relaxed);
                }
            })
        };

        for i in 0..3 {
            store
                .create(NewUser::new(
                    format!("user{}", i),
                    format!("user{}@x.com", i),
                    "pw",
                ))
                .await
                .expect("create should succeed");
        }
        ticker.abort();

        assert!(
            ticks.load(Ordering::Relaxed) > 0,
            "ticker never ran while users were created"
        );
    }

    #[tokio::test]
    async fn test_update_unknown_user_returns_none() {
        let store = MemoryStore::new();
        let res = store
            .find_by_id_and_update("nope", SavedBooksUpdate::AddToSet(Book::with_id("b1")))
            .await
            .unwrap();
        assert!(res.is_none());
    }
}
