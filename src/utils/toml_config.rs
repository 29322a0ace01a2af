//! TOML-based configuration for the training-log server
//!
//! Settings live in a single `trainlog.toml`. Every section and field has a
//! default, so an empty file (or no `[storage]` table) is valid. Secrets are
//! never stored in the file; it only names the environment variables that
//! hold them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Root configuration structure loaded from trainlog.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainlogConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// ============= Authentication Configuration =============

/// Upper bound for `auth.token_expiry_secs`
pub const MAX_TOKEN_EXPIRY_SECS: u64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Token lifetime in seconds; tokens never expire when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expiry_secs: Option<u64>,

    /// Path prefixes reachable without a bearer token
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,

    #[serde(default)]
    pub password: PasswordConfig,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_public_paths() -> Vec<String> {
    ["/api/user", "/api/health", "/api-docs", "/swagger-ui", "/files"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            token_expiry_secs: None,
            public_paths: default_public_paths(),
            password: PasswordConfig::default(),
        }
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    #[serde(default = "default_iterations")]
    pub iterations: u32,

    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    19456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Environment variable for the remote Turso URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turso_url_env: Option<String>,

    /// Environment variable for the remote Turso auth token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turso_token_env: Option<String>,
}

fn default_database_url() -> String {
    "./data/trainlog.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            turso_url_env: None,
            turso_token_env: None,
        }
    }
}

// ============= Storage Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the local backend
    #[serde(default = "default_storage_root")]
    pub root: String,

    /// Base URL prefixed to object keys in upload responses
    #[serde(default = "default_public_url")]
    pub public_url: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_storage_root() -> String {
    "./data/blobs".to_string()
}

fn default_public_url() -> String {
    "http://127.0.0.1:3000/files".to_string()
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            public_url: default_public_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

// ============= Errors =============

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl TrainlogConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Check internal consistency. Does not look at the environment; see
    /// [`TrainlogConfig::jwt_secret`] for that.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.auth.jwt_secret_env.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.jwt_secret_env must name an environment variable".to_string(),
            ));
        }

        if self.auth.token_expiry_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "auth.token_expiry_secs must be positive; omit it for non-expiring tokens"
                    .to_string(),
            ));
        }

        if self
            .auth
            .token_expiry_secs
            .is_some_and(|secs| secs > MAX_TOKEN_EXPIRY_SECS)
        {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_expiry_secs must be at most {} (100 years)",
                MAX_TOKEN_EXPIRY_SECS
            )));
        }

        if let Some(prefix) = self
            .auth
            .public_paths
            .iter()
            .find(|p| p.is_empty() || !p.starts_with('/'))
        {
            return Err(ConfigError::ValidationError(format!(
                "auth.public_paths entry {:?} must be a non-empty path starting with '/'",
                prefix
            )));
        }

        let password = &self.auth.password;
        if password.iterations == 0 || password.parallelism == 0 {
            return Err(ConfigError::ValidationError(
                "auth.password iterations and parallelism must be at least 1".to_string(),
            ));
        }
        if password.memory_kib < 8 * password.parallelism {
            return Err(ConfigError::ValidationError(format!(
                "auth.password.memory_kib must be at least 8 * parallelism ({})",
                8 * password.parallelism
            )));
        }

        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }

        if self.storage.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "storage.max_upload_bytes must be positive".to_string(),
            ));
        }

        if self.storage.backend == StorageBackend::Local && self.storage.root.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.root is required for the local backend".to_string(),
            ));
        }

        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        let secret = self
            .resolve_env(&self.auth.jwt_secret_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))?;

        if secret.len() < 32 {
            warn!(
                env = %self.auth.jwt_secret_env,
                "JWT secret is shorter than 32 bytes; use a longer random value"
            );
        }

        Ok(secret)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
