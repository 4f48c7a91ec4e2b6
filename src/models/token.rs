use serde::{Deserialize, Serialize};

/// Role claim embedded in every issued token.
///
/// The claim is informational: authorization decisions are made from the
/// identity alone, see [`crate::auth::AuthGate::authorize`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// JWT claims signed into every access token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// An issued access token as handed back to clients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    /// Expiry as a unix timestamp.
    #[serde(skip_serializing, default)]
    pub expires_at: i64,
}

impl Token {
    pub fn bearer(access_token: String, expires_at: i64) -> Self {
        Token {
            access_token,
            token_type: "bearer".to_string(),
            expires_at,
        }
    }
}
