//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Rate limit configuration.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "sqlite://data.db?mode=rwc".to_string()
}

/// Rate limit configuration for the fixed-window limiter.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    #[serde(default = "default_rate_limit_requests")]
    pub requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_rate_limit_window")]
    pub window_secs: u64,
}

fn default_rate_limit_requests() -> u32 {
    10
}

fn default_rate_limit_window() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: default_rate_limit_requests(),
            window_secs: default_rate_limit_window(),
        }
    }
}

/// Deployment environment tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development: documents go to local disk regardless of provider.
    Dev,
    /// Production: the configured cloud provider is used.
    Prod,
}

/// Preferred cloud storage provider for new uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Provider {
    /// S3-compatible object store.
    #[serde(rename = "s3")]
    ObjectStore,
    /// Managed asset host.
    #[serde(rename = "asset_host")]
    AssetHost,
}

/// Storage configuration: environment tag, provider preference, and
/// per-provider credential bundles.
///
/// Loaded once at process start and read-only thereafter. Credential
/// presence is validated by the backend constructors in `docbox-core`,
/// not here.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Deployment environment.
    #[serde(default = "default_environment")]
    pub environment: Environment,
    /// Preferred provider for new uploads in prod. `None` means local disk.
    #[serde(default)]
    pub provider: Option<Provider>,
    /// Root directory for local disk storage.
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,
    /// Object store credential bundle.
    #[serde(default)]
    pub object_store: Option<ObjectStoreSettings>,
    /// Asset host credential bundle.
    #[serde(default)]
    pub asset_host: Option<AssetHostSettings>,
    /// Per-call timeout applied around backend I/O, in seconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,
}

fn default_environment() -> Environment {
    Environment::Prod
}

fn default_local_root() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_operation_timeout() -> u64 {
    30
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            provider: None,
            local_root: default_local_root(),
            object_store: None,
            asset_host: None,
            operation_timeout_secs: default_operation_timeout(),
        }
    }
}

/// S3-compatible object store credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStoreSettings {
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key_id: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_access_key: String,
    /// Custom endpoint (R2, Spaces, MinIO). Empty means the provider default.
    #[serde(default)]
    pub endpoint: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for ObjectStoreSettings {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            endpoint: String::new(),
        }
    }
}

/// Managed asset host credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetHostSettings {
    /// Cloud name identifying the tenant.
    #[serde(default)]
    pub cloud_name: String,
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API secret.
    #[serde(default)]
    pub api_secret: String,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("DOCBOX").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
