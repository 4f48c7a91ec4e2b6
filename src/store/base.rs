use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use super::{memory_store::MemoryStore, mongodb_store::MongoDBStore};
use crate::config::{StoreBackend, StoreConfig};
use crate::models::{AppConfig, UserRecord};

/// Failures reported by store backends.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A record with this identity already exists.
    #[error("identity '{0}' already exists")]
    Duplicate(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Persistence for user records. Records are only ever inserted and looked up.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserRecord>, StoreError>;
    /// Insert a new record. Must fail with [`StoreError::Duplicate`] when the
    /// identity is already taken.
    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError>;
}

/// Persistence for the application config singleton.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn read_singleton(&self) -> Result<Option<AppConfig>, StoreError>;
    /// Replace the singleton wholesale.
    async fn write_singleton(&self, config: &AppConfig) -> Result<(), StoreError>;
    /// Return the singleton, atomically creating it with defaults if absent.
    async fn get_or_insert_default(&self) -> Result<AppConfig, StoreError>;
}

/// The store handles injected into the application state.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub config: Arc<dyn ConfigStore>,
}

impl Stores {
    /// Both stores backed by one shared in-memory instance.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Stores {
            users: store.clone(),
            config: store,
        }
    }
}

/// Creates the concrete stores based on the StoreConfig.
/// If `store.enabled = false`, everything lives in memory. Otherwise, picks the specified backend.
pub async fn create_stores(config: &StoreConfig) -> Stores {
    if !config.enabled {
        info!("Persistent store is disabled. Using in-memory store.");
        return Stores::in_memory();
    }

    match &config.backend {
        Some(StoreBackend::MongoDB(mongo_config)) => match MongoDBStore::new(mongo_config).await {
            Ok(store) => {
                info!("Successfully created MongoDB store.");
                let store = Arc::new(store);
                Stores {
                    users: store.clone(),
                    config: store,
                }
            }
            Err(e) => {
                error!("Failed to create MongoDB store: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            error!("Store is enabled, but no backend config is provided!");
            std::process::exit(1);
        }
    }
}
