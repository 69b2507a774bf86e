pub mod session;
pub mod token;

// Re-export so we can do "use crate::auth::{Session, TokenService};"
pub use session::Session;
pub use token::{IdentityClaim, TokenService};
