use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{ConfigStore, StoreError, UserStore};
use crate::models::{AppConfig, UserRecord};

/// A process-local store keeping users and the config singleton in memory.
/// Used when no persistent backend is enabled, and in tests.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    config: RwLock<Option<AppConfig>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(identity).cloned())
    }

    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.identity) {
            return Err(StoreError::Duplicate(user.identity));
        }
        debug!("Inserting user '{}' into memory store", user.identity);
        users.insert(user.identity.clone(), user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn read_singleton(&self) -> Result<Option<AppConfig>, StoreError> {
        Ok(self.config.read().await.clone())
    }

    async fn write_singleton(&self, config: &AppConfig) -> Result<(), StoreError> {
        *self.config.write().await = Some(config.clone());
        Ok(())
    }

    async fn get_or_insert_default(&self) -> Result<AppConfig, StoreError> {
        if let Some(config) = self.config.read().await.as_ref() {
            return Ok(config.clone());
        }
        // Check and insert under a single write lock.
        let mut guard = self.config.write().await;
        Ok(guard.get_or_insert_with(AppConfig::default).clone())
    }
}
