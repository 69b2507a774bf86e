pub mod base;
pub mod memory_store;
pub mod mongodb_store;

// Re-export the primary Store items so code outside can do
// "use crate::store::{UserStore, create_store};"
pub use base::{create_store, SavedBooksUpdate, StoreError, UserFilter, UserStore};
