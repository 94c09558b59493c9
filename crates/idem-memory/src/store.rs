// In-memory user store — HashMap keyed by canonical email, implementing
// the core `UserStore` trait.
//
// The email key doubles as the uniqueness constraint: `insert` refuses an
// email that is already present, which is the backstop concurrent
// reconcile/registration paths rely on. The whole map sits behind one
// `tokio::sync::RwLock`, so check-and-insert is atomic here.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use idem_core::{StoreError, User, UserStore};

/// In-memory user store.
///
/// All data lives in a `HashMap` wrapped in an `Arc<RwLock<...>>` for
/// thread-safe concurrent access.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryUserStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all users (for debugging/testing).
    pub async fn snapshot(&self) -> Vec<User> {
        self.users.read().await.values().cloned().collect()
    }

    /// Clear all data.
    pub async fn clear(&self) {
        self.users.write().await.clear();
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn find_by_activation_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.activation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn insert(&self, mut user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::Duplicate(user.email));
        }

        user.id = uuid::Uuid::new_v4().to_string();
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let existing = users
            .values_mut()
            .find(|u| u.id == user.id)
            .ok_or(StoreError::NotFound)?;
        *existing = user.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new(email)
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = MemoryUserStore::new();
        let inserted = store.insert(user("a@x.com")).await.unwrap();

        assert!(!inserted.id.is_empty());
        assert_eq!(inserted.email, "a@x.com");
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_insert_duplicate_email_fails() {
        let store = MemoryUserStore::new();
        store.insert(user("a@x.com")).await.unwrap();

        let result = store.insert(user("a@x.com")).await;
        match result {
            Err(StoreError::Duplicate(email)) => assert_eq!(email, "a@x.com"),
            other => panic!("expected Duplicate, got {other:?}"),
        }
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let store = MemoryUserStore::new();
        store.insert(user("a@x.com")).await.unwrap();

        let found = store.find_by_email("a@x.com").await.unwrap();
        assert!(found.is_some());
        assert!(store.find_by_email("other@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_activation_token() {
        let store = MemoryUserStore::new();
        let mut pending = user("a@x.com");
        pending.activation_token = Some("tok-1".to_string());
        store.insert(pending).await.unwrap();

        let found = store.find_by_activation_token("tok-1").await.unwrap();
        assert_eq!(found.unwrap().email, "a@x.com");
        assert!(store
            .find_by_activation_token("tok-2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_save_updates_by_id() {
        let store = MemoryUserStore::new();
        let mut inserted = store.insert(user("a@x.com")).await.unwrap();

        inserted.name = Some("Ada".to_string());
        inserted.is_active = true;
        store.save(&inserted).await.unwrap();

        let reloaded = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(reloaded.name.as_deref(), Some("Ada"));
        assert!(reloaded.is_active);
    }

    #[tokio::test]
    async fn test_save_unknown_id_is_not_found() {
        let store = MemoryUserStore::new();
        let mut ghost = user("a@x.com");
        ghost.id = "missing".to_string();

        let result = store.save(&ghost).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_one_winner() {
        let store = Arc::new(MemoryUserStore::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(
                async move { store.insert(user("race@x.com")).await },
            ));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_clear_and_snapshot() {
        let store = MemoryUserStore::new();
        store.insert(user("a@x.com")).await.unwrap();
        store.insert(user("b@x.com")).await.unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 2);

        store.clear().await;
        assert_eq!(store.user_count().await, 0);
    }
}
