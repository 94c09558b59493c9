// UserStore — the narrow interface the engine requires of persistence.
//
// Implementations must enforce a uniqueness constraint on email at insert
// time and report a violation as `StoreError::Duplicate`; the reconciler
// and registration flow rely on that to resolve check-then-act races.

use async_trait::async_trait;

use super::models::User;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by canonical email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Look up the user currently holding an activation token.
    async fn find_by_activation_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user, assigning an id. An existing record with the same
    /// email fails with `StoreError::Duplicate`.
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    /// Persist mutations to an existing user, matched by id.
    async fn save(&self, user: &User) -> Result<(), StoreError>;
}
