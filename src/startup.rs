//! Application startup and server initialization.
//!
//! Builds the stores and the auth gate from configuration, seeds the
//! privileged account, and serves the router.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::auth::AuthGate;
use crate::config::ConfigV1;
use crate::routes;
use crate::state::AppState;
use crate::store::{create_stores, Stores};

/// Wire the application state from explicitly constructed stores.
///
/// Fails on configuration that would leave the gate unable to issue tokens
/// or hash secrets, or when seeding the privileged account fails.
pub async fn build_state(
    config: &ConfigV1,
    stores: Stores,
) -> Result<AppState, Box<dyn std::error::Error>> {
    config.validate()?;
    let gate = Arc::new(AuthGate::new(
        stores.users,
        &config.jwt,
        &config.auth,
        config.admin.clone(),
    ));
    gate.seed_admin().await?;

    Ok(AppState {
        gate,
        app_config: stores.config,
    })
}

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if seeding the admin account fails, the server cannot
/// bind to the configured address, or serving fails.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let stores = create_stores(&config.store).await;
    let state = build_state(&config, stores).await?;

    info!("Starting server on {}", config.bind_address);

    let app = routes::create_router(state);
    let listener = TcpListener::bind(&config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
