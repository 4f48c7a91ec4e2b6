#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use authgate::config::{extract_config, ConfigV1};
use authgate::routes::create_router;
use authgate::startup::build_state;
use authgate::store::Stores;
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ADMIN_SECRET: &str = "admin-secret";

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
logging:
  level: "debug"
  format: "json"
auth:
  bcrypt_cost: 4
admin:
  identity: "Raaz"
  secret: "admin-secret"
store:
  enabled: false
jwt:
  exp: 900
  iss: authgate-test
  secret: test-secret
bind_address: 127.0.0.1:8081
"#;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn load_test_config() -> ConfigV1 {
    extract_config(&Figment::new().merge(Yaml::string(TEST_CONFIG)))
        .expect("Failed to parse test config YAML")
}

pub async fn build_app(config: ConfigV1) -> (Router, Arc<ConfigV1>) {
    let state = build_state(&config, Stores::in_memory())
        .await
        .expect("state should build");
    (create_router(state), Arc::new(config))
}

fn with_client_addr(mut request: Request<Body>) -> Request<Body> {
    request.extensions_mut().insert(ConnectInfo(SocketAddr::new(
        IpAddr::V4(Ipv4Addr::LOCALHOST),
        0,
    )));
    request
}

pub fn json_request(path: &str, method: Method, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    with_client_addr(
        builder
            .body(Body::from(body.to_string()))
            .expect("failed to build request"),
    )
}

pub fn form_request(path: &str, username: &str, password: &str) -> Request<Body> {
    let body = format!("username={}&password={}", username, password);
    with_client_addr(
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("failed to build request"),
    )
}

pub fn request_with_bearer(path: &str, token: &str, method: Method) -> Request<Body> {
    with_client_addr(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .expect("failed to build request"),
    )
}

pub fn plain_request(path: &str, method: Method) -> Request<Body> {
    with_client_addr(
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("failed to build request"),
    )
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub fn decode_claims(token: &str, secret: &str) -> TokenData<Claims> {
    let mut validation = Validation::default();
    validation.validate_aud = false;

    decode(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .expect("JWT should decode")
}
