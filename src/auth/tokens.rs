//! Signing and verification of bearer access tokens.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use super::AuthError;
use crate::config::JWTConfig;
use crate::models::{Claims, Role, Token};

/// Issues and verifies HS256 tokens for a single issuer and secret.
pub struct TokenSigner {
    issuer: String,
    lifetime: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(config: &JWTConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_issuer(&[&config.iss]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        TokenSigner {
            issuer: config.iss.clone(),
            lifetime: config.exp,
            encoding_key: EncodingKey::from_secret(config.secret.as_ref()),
            decoding_key: DecodingKey::from_secret(config.secret.as_ref()),
            validation,
        }
    }

    /// Issue a token for `identity` valid from now.
    pub fn issue(&self, identity: &str, role: Role) -> Result<Token, AuthError> {
        self.issue_at(identity, role, Utc::now().timestamp())
    }

    /// Issue a token as if it had been signed at `issued_at` (unix seconds).
    pub fn issue_at(&self, identity: &str, role: Role, issued_at: i64) -> Result<Token, AuthError> {
        let claims = Claims {
            sub: identity.to_string(),
            role,
            iss: self.issuer.clone(),
            iat: issued_at,
            exp: issued_at + self.lifetime,
        };
        let jwt = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Backend(format!("failed to sign token: {}", e)))?;
        Ok(Token::bearer(jwt, claims.exp))
    }

    /// Decode and validate a token. Any failure (bad encoding, signature,
    /// issuer or expiry) is reported as `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Rejecting token: {}", e);
            AuthError::Unauthorized
        })?;
        if data.claims.sub.is_empty() {
            return Err(AuthError::Unauthorized);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_config(secret: &str) -> JWTConfig {
        JWTConfig {
            iss: "authgate-test".to_string(),
            exp: 900,
            secret: secret.to_string(),
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let signer = TokenSigner::new(&jwt_config("secret"));
        let token = signer.issue("alice", Role::User).unwrap();
        assert_eq!(token.token_type, "bearer");

        let claims = signer.verify(&token.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.iss, "authgate-test");
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(claims.exp, token.expires_at);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let signer = TokenSigner::new(&jwt_config("secret"));
        let long_ago = Utc::now().timestamp() - 2 * 900;
        let token = signer.issue_at("alice", Role::User, long_ago).unwrap();
        assert_eq!(signer.verify(&token.access_token), Err(AuthError::Unauthorized));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let ours = TokenSigner::new(&jwt_config("secret"));
        let theirs = TokenSigner::new(&jwt_config("another-secret"));
        let token = theirs.issue("alice", Role::Admin).unwrap();
        assert_eq!(ours.verify(&token.access_token), Err(AuthError::Unauthorized));
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let signer = TokenSigner::new(&jwt_config("secret"));
        // Far-future expiry must not matter once the signature is wrong.
        let token = signer
            .issue_at("alice", Role::User, Utc::now().timestamp() + 10_000_000)
            .unwrap();
        let mut parts: Vec<String> = token.access_token.split('.').map(str::to_string).collect();
        let sig = parts[2].clone();
        let flipped = if sig.starts_with('A') { "B" } else { "A" };
        parts[2] = format!("{}{}", flipped, &sig[1..]);
        assert_eq!(signer.verify(&parts.join(".")), Err(AuthError::Unauthorized));
    }

    #[test]
    fn test_tampered_claims_are_rejected() {
        let signer = TokenSigner::new(&jwt_config("secret"));
        let token = signer.issue("alice", Role::User).unwrap();
        let forged = signer.issue("Raaz", Role::Admin).unwrap();

        // Splice the admin payload onto alice's signature.
        let ours: Vec<&str> = token.access_token.split('.').collect();
        let theirs: Vec<&str> = forged.access_token.split('.').collect();
        let spliced = format!("{}.{}.{}", ours[0], theirs[1], ours[2]);
        assert_eq!(signer.verify(&spliced), Err(AuthError::Unauthorized));
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let signer = TokenSigner::new(&jwt_config("secret"));
        let mut other = jwt_config("secret");
        other.iss = "someone-else".to_string();
        let token = TokenSigner::new(&other).issue("alice", Role::User).unwrap();
        assert_eq!(signer.verify(&token.access_token), Err(AuthError::Unauthorized));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let signer = TokenSigner::new(&jwt_config("secret"));
        for garbage in ["", "not-a-token", "a.b.c", "Bearer abc"] {
            assert_eq!(signer.verify(garbage), Err(AuthError::Unauthorized));
        }
    }
}
