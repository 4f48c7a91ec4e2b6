pub mod action;
pub mod error;
pub mod gate;
pub mod password;
pub mod tokens;

// Re-export so we can do "use crate::auth::{AuthGate, AuthError};"
pub use action::Action;
pub use error::AuthError;
pub use gate::AuthGate;
