//! Registration, login and identity endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};

use crate::models::{Role, Token};
use crate::state::AppState;
use crate::utils::http_helpers::{CurrentUser, HTTPError};

/// Registers authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/token", post(login))
        .route("/auth/me", get(me))
}

/// Username and password as submitted by clients.
#[derive(Deserialize)]
struct CredentialForm {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct MeResponse {
    id: String,
    username: String,
    role: Role,
}

/// Creates an account and immediately hands back a token for it.
async fn register(
    State(state): State<AppState>,
    Json(form): Json<CredentialForm>,
) -> Result<(StatusCode, Json<Token>), HTTPError> {
    let record = state.gate.register(&form.username, &form.password).await?;
    let token = state.gate.issue(&record)?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// OAuth2 password grant: form-encoded `username` and `password`.
async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialForm>,
) -> Result<Json<Token>, HTTPError> {
    let token = state.gate.login(&form.username, &form.password).await?;
    Ok(Json(token))
}

async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<MeResponse> {
    let role = state.gate.role_for(&user.identity);
    Json(MeResponse {
        id: user.id,
        username: user.identity,
        role,
    })
}
