use std::net::SocketAddr;

use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, error};

use crate::auth::AuthError;
use crate::models::UserRecord;
use crate::state::AppState;

/// A general purpose HTTP error type that can be converted into an `IntoResponse`.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
    challenge: Option<String>,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code, message and an
    /// optional `WWW-Authenticate` challenge.
    pub fn new(status: StatusCode, message: impl Into<String>, challenge: Option<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
            challenge,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Converts our `HTTPError` into a JSON error response.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(json!({ "error": self.message }))).into_response();
        if let Some(challenge) = self.challenge {
            if let Ok(value) = challenge.parse() {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

impl From<AuthError> for HTTPError {
    fn from(err: AuthError) -> Self {
        let bearer = Some("Bearer".to_string());
        match err {
            AuthError::DuplicateIdentity(_) => {
                HTTPError::new(StatusCode::BAD_REQUEST, "Username already registered", None)
            }
            AuthError::InvalidCredential => HTTPError::new(
                StatusCode::UNAUTHORIZED,
                "Incorrect username or password",
                bearer,
            ),
            AuthError::Unauthorized => HTTPError::new(
                StatusCode::UNAUTHORIZED,
                "Could not validate credentials",
                bearer,
            ),
            AuthError::Forbidden { .. } => {
                HTTPError::new(StatusCode::FORBIDDEN, "Not enough permissions", None)
            }
            AuthError::Backend(msg) => {
                error!("Auth backend failure: {}", msg);
                HTTPError::new(StatusCode::SERVICE_UNAVAILABLE, "Service unavailable", None)
            }
        }
    }
}

/// The user behind a valid bearer token on the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(auth_header: &str) -> Option<&str> {
    let mut parts = auth_header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

/// Extractor implementation: resolves the `authorization` header to a stored
/// user through `AuthGate::authenticate`.
#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = HTTPError;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &AppState,
    ) -> Result<CurrentUser, HTTPError> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        let client_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let Some(token) = bearer_token(auth_header) else {
            debug!("Request from IP='{}' without a bearer token", client_ip);
            return Err(AuthError::Unauthorized.into());
        };

        let user = state.gate.authenticate(token).await?;
        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("  Bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer a b"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn test_auth_errors_map_to_statuses() {
        let cases = [
            (AuthError::DuplicateIdentity("a".into()), StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredential, StatusCode::UNAUTHORIZED),
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                AuthError::Forbidden {
                    identity: "a".into(),
                    action: "write_config".into(),
                },
                StatusCode::FORBIDDEN,
            ),
            (AuthError::Backend("down".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(HTTPError::from(err).status(), status);
        }
    }

    #[test]
    fn test_unauthorized_carries_bearer_challenge() {
        let response = HTTPError::from(AuthError::Unauthorized).into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        let response = HTTPError::from(AuthError::Forbidden {
            identity: "a".into(),
            action: "delete_post".into(),
        })
        .into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
