//! Shared application state.
//!
//! Every handle here is constructed once in `startup` and injected into the
//! router; handlers never reach for process-wide globals.

use crate::auth::AuthGate;
use crate::store::ConfigStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The authentication and authorization gate.
    pub gate: Arc<AuthGate>,
    /// Persistence for the app config singleton.
    pub app_config: Arc<dyn ConfigStore>,
}
