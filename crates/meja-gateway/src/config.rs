//! # Meja Configuration
//!
//! Runtime settings for the server and its outbound integrations.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MEJA_PORT=8080                                                     │
//! │     MEJA_SERVER_KEY=SB-Mid-server-...                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $MEJA_CONFIG, or                                                   │
//! │     ~/.config/meja/meja.toml (Linux)                                   │
//! │     ~/Library/Application Support/com.meja.meja/meja.toml (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [upstream]
//! base_url = "https://pos.example.com/api"
//! timeout_secs = 15
//! order_timeout_secs = 30
//!
//! [payment]
//! base_url = "https://api.sandbox.midtrans.com"
//! server_key = "SB-Mid-server-xxxx"
//! poll_interval_secs = 5
//! minimum_amount = 1500
//!
//! [qr]
//! secret = "table-token-secret"
//!
//! [storage]
//! database_path = "/var/lib/meja/meja.db"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, GatewayResult};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "MEJA_CONFIG";

// =============================================================================
// Server Settings
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Upstream Settings
// =============================================================================

/// The restaurant's ordering API (menus, categories, orders).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default = "default_upstream_url")]
    pub base_url: String,

    /// Sent as a bearer token when set.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Timeout for catalogue reads (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Timeout for order submission (seconds).
    #[serde(default = "default_order_timeout")]
    pub order_timeout_secs: u64,
}

fn default_upstream_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_order_timeout() -> u64 {
    30
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        UpstreamSettings {
            base_url: default_upstream_url(),
            api_key: None,
            timeout_secs: default_timeout(),
            order_timeout_secs: default_order_timeout(),
        }
    }
}

// =============================================================================
// Payment Settings
// =============================================================================

/// Midtrans Core API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSettings {
    #[serde(default = "default_payment_url")]
    pub base_url: String,

    /// Server key, used for basic auth and webhook signatures.
    #[serde(default)]
    pub server_key: String,

    /// Interval between status polls (seconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Smallest QRIS charge the gateway accepts (rupiah).
    #[serde(default = "default_minimum_amount")]
    pub minimum_amount: i64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_payment_url() -> String {
    "https://api.sandbox.midtrans.com".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_minimum_amount() -> i64 {
    1_500
}

impl Default for PaymentSettings {
    fn default() -> Self {
        PaymentSettings {
            base_url: default_payment_url(),
            server_key: String::new(),
            poll_interval_secs: default_poll_interval(),
            minimum_amount: default_minimum_amount(),
            timeout_secs: default_timeout(),
        }
    }
}

impl PaymentSettings {
    pub fn is_configured(&self) -> bool {
        !self.server_key.is_empty()
    }
}

// =============================================================================
// QR Settings
// =============================================================================

/// Shared secret for table QR tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QrSettings {
    #[serde(default)]
    pub secret: String,
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart and sessions are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Keep everything in memory (lost on restart).
    #[serde(default)]
    pub in_memory: bool,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: None,
            in_memory: false,
            max_connections: default_max_connections(),
        }
    }
}

impl StorageSettings {
    /// Configured path, or `meja.db` in the platform data directory.
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("com", "meja", "meja")
                .map(|dirs| dirs.data_dir().join("meja.db"))
                .unwrap_or_else(|| PathBuf::from("meja.db"))
        })
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MejaConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub upstream: UpstreamSettings,

    #[serde(default)]
    pub payment: PaymentSettings,

    #[serde(default)]
    pub qr: QrSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl MejaConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (meja.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> GatewayResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        if !config.payment.is_configured() {
            warn!("No payment server key configured, checkout will fail");
        }
        if config.qr.secret.is_empty() {
            warn!("No QR secret configured, table tokens cannot be verified");
        }

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> GatewayResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| GatewayError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GatewayResult<()> {
        for (name, url) in [
            ("upstream.base_url", &self.upstream.base_url),
            ("payment.base_url", &self.payment.base_url),
        ] {
            if url.trim().is_empty() {
                return Err(GatewayError::InvalidConfig(format!("{} must not be empty", name)));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(GatewayError::InvalidConfig(format!(
                    "{} must start with http:// or https://, got: {}",
                    name, url
                )));
            }
        }

        if self.payment.poll_interval_secs == 0 {
            return Err(GatewayError::InvalidConfig(
                "poll_interval_secs must be greater than 0".into(),
            ));
        }

        if self.upstream.timeout_secs == 0 || self.upstream.order_timeout_secs == 0 {
            return Err(GatewayError::InvalidConfig(
                "upstream timeouts must be greater than 0".into(),
            ));
        }

        if self.payment.minimum_amount < 0 {
            return Err(GatewayError::InvalidConfig(
                "minimum_amount must not be negative".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("MEJA_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Ok(port) = std::env::var("MEJA_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(port = %port, "Ignoring invalid MEJA_PORT"),
            }
        }

        if let Ok(url) = std::env::var("MEJA_UPSTREAM_URL") {
            debug!(url = %url, "Overriding upstream URL from environment");
            self.upstream.base_url = url;
        }

        if let Ok(key) = std::env::var("MEJA_UPSTREAM_API_KEY") {
            self.upstream.api_key = Some(key);
        }

        if let Ok(url) = std::env::var("MEJA_PAYMENT_URL") {
            debug!(url = %url, "Overriding payment URL from environment");
            self.payment.base_url = url;
        }

        if let Ok(key) = std::env::var("MEJA_SERVER_KEY") {
            self.payment.server_key = key;
        }

        if let Ok(secs) = std::env::var("MEJA_POLL_INTERVAL_SECS") {
            if let Ok(s) = secs.parse::<u64>() {
                self.payment.poll_interval_secs = s;
            }
        }

        if let Ok(secret) = std::env::var("MEJA_QR_SECRET") {
            self.qr.secret = secret;
        }

        if let Ok(path) = std::env::var("MEJA_DATABASE_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Ok(flag) = std::env::var("MEJA_IN_MEMORY") {
            self.storage.in_memory = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// `$MEJA_CONFIG`, else `meja.toml` in the platform config directory.
    fn default_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        directories::ProjectDirs::from("com", "meja", "meja")
            .map(|dirs| dirs.config_dir().join("meja.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MejaConfig::default();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.payment.base_url, "https://api.sandbox.midtrans.com");
        assert_eq!(config.payment.poll_interval_secs, 5);
        assert_eq!(config.payment.minimum_amount, 1_500);
        assert!(!config.payment.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = MejaConfig::default();

        config.upstream.base_url = String::new();
        assert!(config.validate().is_err());

        config.upstream.base_url = "ftp://pos.example.com".to_string();
        assert!(config.validate().is_err());

        config.upstream.base_url = "https://pos.example.com/api".to_string();
        config.payment.poll_interval_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());

        config.payment.poll_interval_secs = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: MejaConfig = toml::from_str(
            r#"
            [payment]
            server_key = "SB-Mid-server-abc"

            [qr]
            secret = "s3cret"
            "#,
        )
        .unwrap();

        assert!(config.payment.is_configured());
        assert_eq!(config.payment.poll_interval_secs, 5);
        assert_eq!(config.upstream.order_timeout_secs, 30);
        assert_eq!(config.qr.secret, "s3cret");
        assert_eq!(config.storage.max_connections, 5);
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = MejaConfig::default();
        config.storage.database_path = Some(PathBuf::from("/tmp/meja.db"));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[payment]"));

        let parsed: MejaConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("meja-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nport = 9090\n").unwrap();

        let config = MejaConfig::load(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
    }

    #[test]
    fn test_load_rejects_bad_file() {
        let path = std::env::temp_dir().join(format!("meja-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server\nport = ").unwrap();

        let result = MejaConfig::load(Some(path.clone()));
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(GatewayError::ConfigLoadFailed(_))));
    }
}
