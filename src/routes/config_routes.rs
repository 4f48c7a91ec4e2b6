//! Endpoints for the app config singleton.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::Action;
use crate::models::AppConfig;
use crate::state::AppState;
use crate::store::StoreError;
use crate::utils::http_helpers::{CurrentUser, HTTPError};

/// Registers config routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/config", get(read_config).put(write_config))
        .route("/config/update", get(check_update))
}

#[derive(Deserialize)]
struct UpdateQuery {
    current: String,
}

#[derive(Serialize)]
struct UpdateResponse {
    update_available: bool,
    latest_version: Version,
    update_url: String,
    maintenance_mode: bool,
}

fn map_store_error(e: StoreError) -> HTTPError {
    error!("Config store error: {}", e);
    HTTPError::new(StatusCode::SERVICE_UNAVAILABLE, "Config store unavailable", None)
}

/// Anyone may read the config; it is created with defaults on first access.
async fn read_config(State(state): State<AppState>) -> Result<Json<AppConfig>, HTTPError> {
    let config = state
        .app_config
        .get_or_insert_default()
        .await
        .map_err(map_store_error)?;
    Ok(Json(config))
}

/// Replaces the whole config. Only the privileged identity may do this.
async fn write_config(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(config): Json<AppConfig>,
) -> Result<Json<AppConfig>, HTTPError> {
    state.gate.require(&user.identity, Action::WriteConfig)?;
    state
        .app_config
        .write_singleton(&config)
        .await
        .map_err(map_store_error)?;
    info!(
        "'{}' replaced app config (maintenance_mode={}, latest_version={})",
        user.identity, config.maintenance_mode, config.latest_version
    );
    Ok(Json(config))
}

/// Tells a client running `current` whether it should update.
async fn check_update(
    State(state): State<AppState>,
    Query(query): Query<UpdateQuery>,
) -> Result<Json<UpdateResponse>, HTTPError> {
    let current = Version::parse(query.current.trim()).map_err(|e| {
        HTTPError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid version '{}': {}", query.current, e),
            None,
        )
    })?;
    let config = state
        .app_config
        .get_or_insert_default()
        .await
        .map_err(map_store_error)?;
    Ok(Json(UpdateResponse {
        update_available: config.update_available(&current),
        latest_version: config.latest_version,
        update_url: config.update_url,
        maintenance_mode: config.maintenance_mode,
    }))
}
