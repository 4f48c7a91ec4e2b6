use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StoreConfig;

/// Environment variable pointing at the YAML config file.
pub const CONFIG_PATH_ENV: &str = "AUTHGATE_CONFIG";
/// Prefix for environment overrides, e.g. `AUTHGATE_ADMIN__SECRET`.
pub const ENV_PREFIX: &str = "AUTHGATE_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub store: StoreConfig,
    pub bind_address: String,
    pub jwt: JWTConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigV1 {
    /// Reject settings that parse but cannot work at runtime.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt.secret.is_empty() {
            return Err("jwt.secret must not be empty".to_string());
        }
        if self.jwt.exp <= 0 {
            return Err(format!(
                "jwt.exp must be a positive number of seconds, got {}",
                self.jwt.exp
            ));
        }
        if !BCRYPT_COSTS.contains(&self.auth.bcrypt_cost) {
            return Err(format!(
                "auth.bcrypt_cost must be between {} and {}, got {}",
                BCRYPT_COSTS.start(),
                BCRYPT_COSTS.end(),
                self.auth.bcrypt_cost
            ));
        }
        Ok(())
    }
}

/// Build the figment used by [`load_config`]: the YAML file first, then
/// `AUTHGATE_*` environment variables on top.
pub fn config_figment(path: &str) -> Figment {
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extract a `ConfigV1` from any figment.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from the file named by `AUTHGATE_CONFIG`, defaulting to
/// "config.yaml" in the current directory.
pub fn load_config() -> ConfigV1 {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.yaml".to_string());
    match extract_config(&config_figment(&path)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Signing parameters for issued access tokens.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct JWTConfig {
    pub iss: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_lifetime")]
    pub exp: i64,
    pub secret: String,
}

fn default_token_lifetime() -> i64 {
    30 * 60
}

/// Password hashing settings.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct AuthConfig {
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

/// Work factors bcrypt accepts.
const BCRYPT_COSTS: std::ops::RangeInclusive<u32> = 4..=31;

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// The single privileged identity.
///
/// `secret` is only ever supplied externally (file or `AUTHGATE_ADMIN__SECRET`).
/// When it is absent the account is not seeded and nobody can log in as admin.
#[derive(Deserialize, Serialize, Clone, JsonSchema)]
pub struct AdminConfig {
    #[serde(default = "default_admin_identity")]
    pub identity: String,
    #[serde(default)]
    pub secret: Option<String>,
}

fn default_admin_identity() -> String {
    "Raaz".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        AdminConfig {
            identity: default_admin_identity(),
            secret: None,
        }
    }
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("identity", &self.identity)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
