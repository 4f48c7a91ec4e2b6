use serde::{Deserialize, Serialize};

use super::token::Role;

/// A registered user as persisted in the user store.
///
/// Records are created once on registration and never mutated afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub identity: String,
    /// bcrypt hash of the user's secret.
    pub secret_hash: String,
}

impl UserRecord {
    /// Create a new record with a freshly generated id.
    pub fn new(identity: String, secret_hash: String) -> Self {
        UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            identity,
            secret_hash,
        }
    }
}

/// The identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}
