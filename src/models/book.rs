use serde::{Deserialize, Serialize};

/// A book saved to a user's profile, keyed by the external `book_id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, juniper::GraphQLObject)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub book_id: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

/// The book fields a client submits when saving.
#[derive(Debug, Clone, juniper::GraphQLInputObject)]
pub struct BookInput {
    pub book_id: String,
    pub authors: Option<Vec<String>>,
    pub description: Option<String>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

impl From<BookInput> for Book {
    fn from(input: BookInput) -> Self {
        Book {
            book_id: input.book_id,
            authors: input.authors.unwrap_or_default(),
            description: input.description,
            title: input.title,
            image: input.image,
            link: input.link,
        }
    }
}

impl Book {
    /// A book with only its key set.
    pub fn with_id(book_id: impl Into<String>) -> Self {
        Book {
            book_id: book_id.into(),
            authors: Vec::new(),
            description: None,
            title: None,
            image: None,
            link: None,
        }
    }
}
