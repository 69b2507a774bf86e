use juniper::{graphql_object, ID};

use super::context::GraphQLContext;
use crate::models::{Book, User};

#[graphql_object(context = GraphQLContext)]
impl User {
    #[graphql(name = "_id")]
    fn id(&self) -> ID {
        ID::from(self.id.clone())
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn email(&self) -> &str {
        &self.email
    }

    /// Number of saved books.
    fn book_count(&self) -> i32 {
        i32::try_from(self.saved_books.len()).unwrap_or(i32::MAX)
    }

    fn saved_books(&self) -> Vec<Book> {
        self.saved_books.clone()
    }
}

/// Returned by `login` and `addUser`.
#[derive(Debug, juniper::GraphQLObject)]
#[graphql(name = "Auth", context = GraphQLContext)]
pub struct AuthPayload {
    pub token: ID,
    pub user: User,
}
