use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::users::repo_types::User;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user id already exists")]
    DuplicateId,
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new record. Id collisions are reported before email collisions.
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    /// Match a username or email together with the stored credential.
    ///
    /// The username scan runs first; the email scan only runs when it finds
    /// nothing. Empty selectors are skipped.
    async fn find_by_credentials(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> anyhow::Result<Option<User>>;

    async fn find_by_id(&self, user_id: &str) -> anyhow::Result<Option<User>>;
}

#[derive(Default)]
struct Records {
    by_id: HashMap<String, User>,
    // insertion order, so scans return the oldest match
    order: Vec<String>,
}

impl Records {
    fn scan<F>(&self, pred: F) -> Option<&User>
    where
        F: Fn(&User) -> bool,
    {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .find(|u| pred(u))
    }
}

/// Process-local store. Writers are serialized, so the uniqueness check and
/// the insert happen atomically.
#[derive(Default)]
pub struct MemoryUserStore {
    records: RwLock<Records>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.order.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut records = self.records.write().await;

        if records.by_id.contains_key(&user.user_id) {
            return Err(StoreError::DuplicateId);
        }
        if records.by_id.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        records.order.push(user.user_id.clone());
        records.by_id.insert(user.user_id.clone(), user.clone());
        debug!(user_id = %user.user_id, total = records.order.len(), "user inserted");
        Ok(user)
    }

    async fn find_by_credentials(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> anyhow::Result<Option<User>> {
        let records = self.records.read().await;

        if let Some(name) = username.filter(|s| !s.is_empty()) {
            if let Some(user) =
                records.scan(|u| u.username == name && u.hashed_password == password)
            {
                return Ok(Some(user.clone()));
            }
        }

        if let Some(email) = email.filter(|s| !s.is_empty()) {
            if let Some(user) = records.scan(|u| u.email == email && u.hashed_password == password)
            {
                return Ok(Some(user.clone()));
            }
        }

        Ok(None)
    }

    async fn find_by_id(&self, user_id: &str) -> anyhow::Result<Option<User>> {
        Ok(self.records.read().await.by_id.get(user_id).cloned())
    }
}
