pub mod app_config;
pub mod token;
pub mod user;

pub use app_config::{AppConfig, Plugin};
pub use token::{Claims, Role, Token};
pub use user::{Identity, UserRecord};
