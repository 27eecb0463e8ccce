//! In-memory user store. Data lives in a `HashMap` and is lost on restart;
//! uniqueness is enforced under the write lock so the semantics match the
//! database's unique indexes.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::users::{ConflictField, NewUser, StoreError, User, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed user, bypassing the registration path. Used to
    /// seed dev-mode data and test fixtures (e.g. inactive accounts).
    pub fn insert(&self, user: User) {
        self.users.write().insert(user.id, user);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .values()
            .find(|user| user.email_address == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write();

        if users
            .values()
            .any(|existing| existing.email_address == user.email_address)
        {
            return Err(StoreError::Conflict(ConflictField::Email));
        }
        if users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Err(StoreError::Conflict(ConflictField::Username));
        }

        let row = User {
            id: Uuid::new_v4(),
            username: user.username,
            email_address: user.email_address,
            name: user.name,
            password_hash: user.password_hash,
            is_active: true,
            is_superuser: false,
        };
        users.insert(row.id, row.clone());
        Ok(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::MemoryUserStore;
    use crate::password::hash_password;
    use crate::users::{ConflictField, NewUser, StoreError, UserStore};

    fn registration(username: &str, email: &str) -> NewUser {
        NewUser {
            username: String::from(username),
            email_address: String::from(email),
            name: String::from("Test User"),
            password_hash: hash_password("password123").unwrap(),
        }
    }

    #[tokio::test]
    async fn create_then_find_by_both_keys() {
        let store = MemoryUserStore::new();
        let created = store
            .create(registration("alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(created.is_active);
        assert!(!created.is_superuser);

        let by_email = store.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(by_email.map(|user| user.id), Some(created.id));

        let by_username = store.find_by_username("alice").await.unwrap();
        assert_eq!(by_username.map(|user| user.id), Some(created.id));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryUserStore::new();
        store
            .create(registration("alice", "alice@example.com"))
            .await
            .unwrap();

        let result = store.create(registration("bob", "alice@example.com")).await;
        assert!(matches!(
            result,
            Err(StoreError::Conflict(ConflictField::Email))
        ));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryUserStore::new();
        store
            .create(registration("alice", "alice@example.com"))
            .await
            .unwrap();

        let result = store.create(registration("alice", "bob@example.com")).await;
        assert!(matches!(
            result,
            Err(StoreError::Conflict(ConflictField::Username))
        ));
    }

    #[tokio::test]
    async fn duplicate_on_both_fields_reports_email_first() {
        let store = MemoryUserStore::new();
        store
            .create(registration("alice", "alice@example.com"))
            .await
            .unwrap();

        let result = store
            .create(registration("alice", "alice@example.com"))
            .await;
        assert!(matches!(
            result,
            Err(StoreError::Conflict(ConflictField::Email))
        ));
    }

    #[tokio::test]
    async fn authenticate_checks_the_password() {
        let store = MemoryUserStore::new();
        store
            .create(registration("alice", "alice@example.com"))
            .await
            .unwrap();

        let authenticated = store.authenticate("alice", "password123").await.unwrap();
        assert!(authenticated.is_some());

        let rejected = store.authenticate("alice", "wrong").await.unwrap();
        assert!(rejected.is_none());

        let unknown = store.authenticate("nobody", "password123").await.unwrap();
        assert!(unknown.is_none());
    }
}
