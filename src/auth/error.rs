use thiserror::Error;

use crate::store::StoreError;

/// Every way an authentication or authorization step can reject a request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("identity '{0}' is already registered")]
    DuplicateIdentity(String),
    #[error("incorrect username or password")]
    InvalidCredential,
    #[error("could not validate credentials")]
    Unauthorized,
    #[error("'{identity}' is not allowed to {action}")]
    Forbidden { identity: String, action: String },
    /// The user store or the hasher failed; the request is rejected as a whole.
    #[error("authentication backend unavailable: {0}")]
    Backend(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(identity) => AuthError::DuplicateIdentity(identity),
            StoreError::Backend(msg) => AuthError::Backend(msg),
        }
    }
}
