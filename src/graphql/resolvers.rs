//! Operation handlers behind the GraphQL schema.
//!
//! Every handler that touches a user's record takes the target id from the
//! session, never from its arguments.

use juniper::ID;
use tracing::info;

use super::context::GraphQLContext;
use super::types::AuthPayload;
use crate::error::ApiError;
use crate::models::{BookInput, NewUser, User};
use crate::store::{SavedBooksUpdate, UserFilter};

/// `me`: the caller's own record.
pub async fn current_user(ctx: &GraphQLContext) -> Result<Option<User>, ApiError> {
    let identity = ctx.session.require_identity()?;
    Ok(ctx.store.find_by_id(&identity.id).await?)
}

/// `login`: exchange email and password for a token.
///
/// An unknown email and a wrong password produce the same error.
pub async fn login(
    ctx: &GraphQLContext,
    email: &str,
    password: &str,
) -> Result<AuthPayload, ApiError> {
    let Some(user) = ctx
        .store
        .find_one(&UserFilter::Email(email.to_string()))
        .await?
    else {
        return Err(ApiError::InvalidCredentials);
    };
    if !user.is_correct_password(password).await {
        return Err(ApiError::InvalidCredentials);
    }

    info!("User '{}' logged in", user.username);
    sign_in(ctx, user)
}

/// `addUser`: register and sign in.
pub async fn add_user(
    ctx: &GraphQLContext,
    username: String,
    email: String,
    password: String,
) -> Result<AuthPayload, ApiError> {
    let user = ctx
        .store
        .create(NewUser::new(username, email, password))
        .await?;

    info!("Registered user '{}' with id {}", user.username, user.id);
    sign_in(ctx, user)
}

/// `saveBook`: add a book to the caller's saved books, keyed by `bookId`.
pub async fn save_book(ctx: &GraphQLContext, book: BookInput) -> Result<Option<User>, ApiError> {
    let identity = ctx.session.require_identity()?;
    Ok(ctx
        .store
        .find_by_id_and_update(&identity.id, SavedBooksUpdate::AddToSet(book.into()))
        .await?)
}

/// `removeBook`: drop a book from the caller's saved books. Absent ids are a no-op.
pub async fn remove_book(ctx: &GraphQLContext, book_id: String) -> Result<Option<User>, ApiError> {
    let identity = ctx.session.require_identity()?;
    Ok(ctx
        .store
        .find_by_id_and_update(&identity.id, SavedBooksUpdate::Pull { book_id })
        .await?)
}

fn sign_in(ctx: &GraphQLContext, user: User) -> Result<AuthPayload, ApiError> {
    let token = ctx.tokens.issue(user.identity())?;
    Ok(AuthPayload {
        token: ID::from(token),
        user,
    })
}
