//! Gateway configuration types.
//!
//! The configuration surface is environment-driven (see the binary crate's
//! CLI definition); these are the typed sections the rest of the gateway
//! consumes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Deployment environment. Controls the bus authentication mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Development,
    Production,
    Test,
}

impl Environment {
    /// Production requires JWT bus authentication; everything else may use
    /// user/password or no authentication.
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Local => "local",
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        };
        f.write_str(s)
    }
}

/// Bus connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Comma-separated server URLs, already split.
    pub servers: Vec<String>,
    /// Optional user/password credentials (non-production).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// JWT token endpoint and keys (production).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

/// External contact-messaging API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API credential (bearer token).
    pub api_key: String,
    /// Base URL of the external API.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
}

fn default_api_base_url() -> String {
    "https://api.respond.io/v2".to_string()
}

/// Polling synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Master switch; a disabled coordinator is a no-op on every tick.
    #[serde(default)]
    pub enabled: bool,
    /// Seconds between sync cycles.
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
    /// Contact-id allow-list; empty means all contacts.
    #[serde(default)]
    pub contacts: Vec<String>,
    /// Contacts synced concurrently per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Messages fetched per contact per cycle.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_batch_size() -> usize {
    20
}

fn default_window_size() -> usize {
    5
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_poll_interval_secs(),
            contacts: Vec::new(),
            batch_size: default_batch_size(),
            window_size: default_window_size(),
        }
    }
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP server port.
    pub port: u16,
    pub environment: Environment,
    pub bus: BusConfig,
    pub api: ApiConfig,
    pub polling: PollingConfig,
}

/// Parse a comma-separated list, trimming whitespace and dropping empties.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
