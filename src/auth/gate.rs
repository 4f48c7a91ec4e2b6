use std::sync::Arc;

use tracing::{debug, info, warn};

use super::password::{hash_secret, verify_secret, MAX_SECRET_BYTES};
use super::tokens::TokenSigner;
use super::{Action, AuthError};
use crate::config::{AdminConfig, AuthConfig, JWTConfig};
use crate::models::{Identity, Role, Token, UserRecord};
use crate::store::UserStore;

/// Turns credentials into verified identities and identities into
/// authorization decisions.
///
/// The gate holds no per-request state. A single privileged identity, taken
/// from configuration, may perform every [`Action`]; nobody else may.
pub struct AuthGate {
    users: Arc<dyn UserStore>,
    signer: TokenSigner,
    admin: AdminConfig,
    bcrypt_cost: u32,
}

impl AuthGate {
    pub fn new(
        users: Arc<dyn UserStore>,
        jwt: &JWTConfig,
        auth: &AuthConfig,
        admin: AdminConfig,
    ) -> Self {
        info!(
            "Creating auth gate with privileged identity '{}'",
            admin.identity
        );
        AuthGate {
            users,
            signer: TokenSigner::new(jwt),
            admin,
            bcrypt_cost: auth.bcrypt_cost,
        }
    }

    /// Whether `identity` is the privileged identity, ignoring case.
    pub fn is_privileged(&self, identity: &str) -> bool {
        identity.to_lowercase() == self.admin.identity.to_lowercase()
    }

    /// The role claim issued for `identity`.
    pub fn role_for(&self, identity: &str) -> Role {
        if self.is_privileged(identity) {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Register a new user.
    ///
    /// The privileged identity is reserved in every casing and can only be
    /// created through [`AuthGate::seed_admin`].
    pub async fn register(&self, identity: &str, secret: &str) -> Result<UserRecord, AuthError> {
        if identity.is_empty() || secret.is_empty() || secret.len() > MAX_SECRET_BYTES {
            return Err(AuthError::InvalidCredential);
        }
        if self.is_privileged(identity) {
            warn!("Refusing public registration of reserved identity '{}'", identity);
            return Err(AuthError::DuplicateIdentity(identity.to_string()));
        }
        self.create_user(identity, secret).await
    }

    async fn create_user(&self, identity: &str, secret: &str) -> Result<UserRecord, AuthError> {
        if self.users.find_by_identity(identity).await?.is_some() {
            debug!("Identity '{}' already registered", identity);
            return Err(AuthError::DuplicateIdentity(identity.to_string()));
        }
        let secret_hash = hash_secret(secret, self.bcrypt_cost)?;
        // The store re-checks uniqueness, covering concurrent registrations.
        let record = self
            .users
            .insert(UserRecord::new(identity.to_string(), secret_hash))
            .await?;
        info!("Registered user '{}'", record.identity);
        Ok(record)
    }

    /// Check a credential against the stored hash and issue a token.
    pub async fn login(&self, identity: &str, secret: &str) -> Result<Token, AuthError> {
        let record = match self.users.find_by_identity(identity).await? {
            Some(record) => record,
            None => {
                debug!("Login for unknown identity '{}'", identity);
                return Err(AuthError::InvalidCredential);
            }
        };
        if !verify_secret(secret, &record.secret_hash) {
            warn!("Wrong secret for identity '{}'", identity);
            return Err(AuthError::InvalidCredential);
        }
        info!("User '{}' logged in", record.identity);
        self.issue(&record)
    }

    /// Issue a token for an existing record.
    pub fn issue(&self, record: &UserRecord) -> Result<Token, AuthError> {
        self.signer
            .issue(&record.identity, self.role_for(&record.identity))
    }

    /// Validate a token's signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.signer.verify(token)?;
        Ok(Identity {
            username: claims.sub,
            role: claims.role,
        })
    }

    /// Verify a token and resolve it to the stored user record.
    ///
    /// A valid token whose subject no longer resolves is `Unauthorized`.
    pub async fn authenticate(&self, token: &str) -> Result<UserRecord, AuthError> {
        let identity = self.verify(token)?;
        match self.users.find_by_identity(&identity.username).await? {
            Some(record) => Ok(record),
            None => {
                warn!("Token subject '{}' has no user record", identity.username);
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// Only the privileged identity may perform elevated actions. Roles
    /// recorded anywhere else are not consulted.
    pub fn authorize(&self, identity: &str, action: Action) -> bool {
        let allowed = self.is_privileged(identity);
        debug!(
            "Authorization for '{}' to {}: {}",
            identity,
            action,
            if allowed { "permitted" } else { "forbidden" }
        );
        allowed
    }

    /// Like [`AuthGate::authorize`] but as a `Forbidden` error.
    pub fn require(&self, identity: &str, action: Action) -> Result<(), AuthError> {
        if self.authorize(identity, action) {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                identity: identity.to_string(),
                action: action.to_string(),
            })
        }
    }

    /// Create the privileged account from configuration if it does not exist.
    /// An existing account is left untouched.
    pub async fn seed_admin(&self) -> Result<(), AuthError> {
        let Some(secret) = self.admin.secret.as_deref() else {
            warn!(
                "No admin secret configured; privileged identity '{}' is not seeded",
                self.admin.identity
            );
            return Ok(());
        };
        match self.create_user(&self.admin.identity, secret).await {
            Ok(_) => {
                info!("Seeded privileged identity '{}'", self.admin.identity);
                Ok(())
            }
            Err(AuthError::DuplicateIdentity(_)) => {
                info!("Privileged identity '{}' already present", self.admin.identity);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
