use std::collections::HashMap;

use semver::Version;
use serde::{Deserialize, Serialize};

/// The application-wide configuration singleton controlling maintenance mode
/// and client update metadata.
///
/// There is exactly one logical instance. It is created with defaults on first
/// read and always replaced wholesale, never patched field by field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default = "default_latest_version")]
    pub latest_version: Version,
    #[serde(default = "default_update_url")]
    pub update_url: String,
    /// Plugins that clients may download.
    #[serde(default)]
    pub plugins: Vec<Plugin>,
    /// Free-form extra settings.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// A downloadable client plugin.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    pub name: String,
    pub version: String,
    pub download_url: String,
}

fn default_latest_version() -> Version {
    Version::new(1, 0, 0)
}

fn default_update_url() -> String {
    "https://playstore.com".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            maintenance_mode: false,
            latest_version: default_latest_version(),
            update_url: default_update_url(),
            plugins: Vec::new(),
            attributes: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Whether a client running `current` should be told to update.
    pub fn update_available(&self, current: &Version) -> bool {
        &self.latest_version > current
    }
}
