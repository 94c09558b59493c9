// Persistence surface: the user model and the store trait.

pub mod models;
pub mod store;

pub use models::{canonical_email, User, PLACEHOLDER_NAME};
pub use store::{StoreError, UserStore};
