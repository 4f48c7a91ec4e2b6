use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, IndexOptions, ReplaceOptions, ReturnDocument,
};
use mongodb::{Client, Collection, IndexModel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{AppConfig, UserRecord};
use crate::store::{ConfigStore, StoreError, UserStore};

/// `_id` of the one document holding the config singleton.
const SINGLETON_ID: &str = "app_config";
/// MongoDB server error code for unique index violations.
const DUPLICATE_KEY: i32 = 11000;

/// The config struct for MongoDB connections.
/// Contains the URI and database name.
#[derive(Deserialize, Serialize, JsonSchema, Debug)]
pub struct MongoDBConfig {
    pub uri: String,
    pub database: String,
}

/// A concrete store implementation that uses MongoDB.
///
/// This struct holds references to two collections:
/// - `user_collection`: registered user records
/// - `config_collection`: the single app config document
pub struct MongoDBStore {
    user_collection: Collection<UserDocument>,
    config_collection: Collection<ConfigDocument>,
}

/// Document shape for storing users in MongoDB.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct UserDocument {
    _id: ObjectId,
    user: UserRecord,
}

/// Document shape for the config singleton.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct ConfigDocument {
    _id: String,
    config: AppConfig,
}

impl MongoDBStore {
    /// Creates a new `MongoDBStore` from the given config.
    /// It initializes client connections, sets up indexes, etc.
    pub async fn new(config: &MongoDBConfig) -> Result<Self, String> {
        info!("Connecting to MongoDB database '{}'", config.database);

        let mut client_options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| format!("Failed to parse MongoDB URI: {}", e))?;

        client_options.app_name = Some("authgate".to_string());

        let client = Client::with_options(client_options)
            .map_err(|e| format!("Failed to create MongoDB client: {}", e))?;

        info!("MongoDB connection established successfully.");

        let database = client.database(&config.database);
        let user_collection = database.collection::<UserDocument>("users");
        let config_collection = database.collection::<ConfigDocument>("app_config");

        // Identity uniqueness is enforced by the database, not by a read-then-write.
        let mut unique_on_identity = IndexModel::default();
        unique_on_identity.keys = doc! { "user.identity": 1 };
        unique_on_identity.options = Some(IndexOptions::builder().unique(true).build());

        user_collection
            .create_index(unique_on_identity, None)
            .await
            .map_err(|e| format!("Failed to create unique index on user.identity: {}", e))?;

        Ok(Self {
            user_collection,
            config_collection,
        })
    }

    fn user_to_doc(user: &UserRecord) -> UserDocument {
        UserDocument {
            _id: ObjectId::new(),
            user: user.clone(),
        }
    }

    fn config_to_doc(config: &AppConfig) -> ConfigDocument {
        ConfigDocument {
            _id: SINGLETON_ID.to_string(),
            config: config.clone(),
        }
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserStore for MongoDBStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserRecord>, StoreError> {
        let user_doc = self
            .user_collection
            .find_one(doc! { "user.identity": identity }, None)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to query user: {}", e)))?;
        Ok(user_doc.map(|ud| ud.user))
    }

    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        self.user_collection
            .insert_one(Self::user_to_doc(&user), None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    StoreError::Duplicate(user.identity.clone())
                } else {
                    StoreError::Backend(format!("Failed to insert user document: {}", e))
                }
            })?;
        debug!("Inserted user document for '{}'", user.identity);
        Ok(user)
    }
}

#[async_trait]
impl ConfigStore for MongoDBStore {
    async fn read_singleton(&self) -> Result<Option<AppConfig>, StoreError> {
        let config_doc = self
            .config_collection
            .find_one(doc! { "_id": SINGLETON_ID }, None)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to read app config: {}", e)))?;
        Ok(config_doc.map(|cd| cd.config))
    }

    async fn write_singleton(&self, config: &AppConfig) -> Result<(), StoreError> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.config_collection
            .replace_one(
                doc! { "_id": SINGLETON_ID },
                Self::config_to_doc(config),
                options,
            )
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to write app config: {}", e)))?;
        Ok(())
    }

    /// A single upsert with `$setOnInsert`, so concurrent first readers never
    /// race a separate read and write.
    async fn get_or_insert_default(&self) -> Result<AppConfig, StoreError> {
        let defaults = to_bson(&AppConfig::default())
            .map_err(|e| StoreError::Backend(format!("Failed to encode default config: {}", e)))?;
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let config_doc = self
            .config_collection
            .find_one_and_update(
                doc! { "_id": SINGLETON_ID },
                doc! { "$setOnInsert": { "config": defaults } },
                options,
            )
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to upsert app config: {}", e)))?;

        config_doc
            .map(|cd| cd.config)
            .ok_or_else(|| StoreError::Backend("Upsert returned no app config".to_string()))
    }
}
