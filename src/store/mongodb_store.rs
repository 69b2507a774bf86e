use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{SavedBooksUpdate, StoreError, UserFilter, UserStore};
use crate::models::{Book, NewUser, User};

/// MongoDB reports unique index violations with this code.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// The config struct for MongoDB connections.
/// Contains the URI and database name.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct MongoDBConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for MongoDBConfig {
    fn default() -> Self {
        MongoDBConfig {
            uri: default_uri(),
            database: default_database(),
        }
    }
}

fn default_uri() -> String {
    "mongodb://127.0.0.1:27017".to_string()
}

fn default_database() -> String {
    "googlebooks".to_string()
}

/// A concrete `UserStore` implementation that uses MongoDB.
pub struct MongoDBStore {
    user_collection: Collection<UserDocument>,
}

/// Document shape for storing users in MongoDB.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct UserDocument {
    _id: ObjectId,
    username: String,
    email: String,
    password: String,
    #[serde(rename = "savedBooks", default)]
    saved_books: Vec<Book>,
}

impl MongoDBStore {
    /// Creates a new `MongoDBStore` from the given config.
    /// It initializes client connections and sets up the unique indexes.
    pub async fn new(config: &MongoDBConfig) -> Result<Self, StoreError> {
        info!("Connecting to MongoDB at URI: {}", config.uri);

        let mut client_options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to parse MongoDB URI: {}", e)))?;
        client_options.app_name = Some("Bookshelf".to_string());

        let client = Client::with_options(client_options)
            .map_err(|e| StoreError::Backend(format!("Failed to create MongoDB client: {}", e)))?;

        let database = client.database(&config.database);
        let user_collection = database.collection::<UserDocument>("users");

        for field in ["username", "email"] {
            let mut keys = Document::new();
            keys.insert(field, 1);
            let mut unique = IndexModel::default();
            unique.keys = keys;
            unique.options = Some(IndexOptions::builder().unique(true).build());

            user_collection.create_index(unique, None).await.map_err(|e| {
                StoreError::Backend(format!("Failed to create unique index on {}: {}", field, e))
            })?;
        }

        info!("MongoDB connection established successfully.");
        Ok(Self { user_collection })
    }

    fn new_user_to_doc(user: User) -> Result<UserDocument, StoreError> {
        let _id = ObjectId::parse_str(&user.id)
            .map_err(|e| StoreError::Backend(format!("Invalid user id '{}': {}", user.id, e)))?;
        Ok(UserDocument {
            _id,
            username: user.username,
            email: user.email,
            password: user.password_hash,
            saved_books: user.saved_books,
        })
    }

    fn doc_to_user(doc: UserDocument) -> User {
        User {
            id: doc._id.to_hex(),
            username: doc.username,
            email: doc.email,
            password_hash: doc.password,
            saved_books: doc.saved_books,
        }
    }

    fn filter_to_doc(filter: &UserFilter) -> Document {
        match filter {
            UserFilter::Email(email) => doc! { "email": email.as_str() },
        }
    }

    /// Translate a saved-books update into a (filter, update) pair for `findOneAndUpdate`.
    ///
    /// Set-add is keyed on `bookId` rather than the whole subdocument, so the
    /// filter excludes users that already hold the key.
    fn update_to_docs(
        _id: ObjectId,
        update: &SavedBooksUpdate,
    ) -> Result<(Document, Document), StoreError> {
        match update {
            SavedBooksUpdate::AddToSet(book) => {
                let book_doc = mongodb::bson::to_bson(book)
                    .map_err(|e| StoreError::Backend(format!("Failed to encode book: {}", e)))?;
                Ok((
                    doc! { "_id": _id, "savedBooks.bookId": { "$ne": book.book_id.as_str() } },
                    doc! { "$push": { "savedBooks": book_doc } },
                ))
            }
            SavedBooksUpdate::Pull { book_id } => Ok((
                doc! { "_id": _id },
                doc! { "$pull": { "savedBooks": { "bookId": book_id.as_str() } } },
            )),
        }
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

#[async_trait]
impl UserStore for MongoDBStore {
    fn get_name(&self) -> &str {
        "mongo"
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        // An id that is not an ObjectId cannot match any document.
        let Ok(_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let user_doc = self
            .user_collection
            .find_one(doc! { "_id": _id }, None)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to query user: {}", e)))?;
        Ok(user_doc.map(Self::doc_to_user))
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError> {
        let user_doc = self
            .user_collection
            .find_one(Self::filter_to_doc(filter), None)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to query user: {}", e)))?;
        Ok(user_doc.map(Self::doc_to_user))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        new_user.validate()?;
        let user = new_user.into_user(ObjectId::new().to_hex()).await?;
        let user_doc = Self::new_user_to_doc(user.clone())?;

        self.user_collection
            .insert_one(user_doc, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    StoreError::Duplicate
                } else {
                    StoreError::Backend(format!("Failed to insert user: {}", e))
                }
            })?;

        debug!("Inserted user '{}' with id {}", user.username, user.id);
        Ok(user)
    }

    async fn find_by_id_and_update(
        &self,
        id: &str,
        update: SavedBooksUpdate,
    ) -> Result<Option<User>, StoreError> {
        let Ok(_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let (filter, modifications) = Self::update_to_docs(_id, &update)?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .user_collection
            .find_one_and_update(filter, modifications, options)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to update saved books: {}", e)))?;

        match (updated, &update) {
            (Some(user_doc), _) => Ok(Some(Self::doc_to_user(user_doc))),
            // The filter missed: either the book is already saved or the user is gone.
            (None, SavedBooksUpdate::AddToSet(_)) => self.find_by_id(id).await,
            (None, SavedBooksUpdate::Pull { .. }) => Ok(None),
        }
    }
}
