pub mod base;
pub mod memory_store;
pub mod mongodb_store;

// Re-export the primary Store items so code outside can do
// "use crate::store::{UserStore, ConfigStore, create_stores};"
pub use base::{create_stores, ConfigStore, StoreError, Stores, UserStore};
