//! Environment-driven configuration.
//!
//! Every setting is available both as a flag and as an environment
//! variable; the env names match the deployment surface
//! (`RESPOND_IO_API_KEY`, `NATS_URL`, `POLLING_ENABLED`, ...).

use clap::Parser;

use courier_types::config::{
    ApiConfig, BusConfig, Environment, GatewayConfig, PollingConfig, split_csv,
};

#[derive(Parser, Debug)]
#[command(name = "courier", version, about = "Bus <-> contact-messaging API gateway")]
pub struct Cli {
    /// respond.io API credential.
    #[arg(long, env = "RESPOND_IO_API_KEY")]
    pub respond_io_api_key: String,

    /// respond.io API base URL.
    #[arg(long, env = "RESPOND_IO_BASE_URL", default_value = "https://api.respond.io/v2")]
    pub respond_io_base_url: String,

    /// Enable periodic message polling.
    #[arg(long, env = "POLLING_ENABLED")]
    pub polling_enabled: bool,

    /// Comma-separated contact-id allow-list for polling (empty = all).
    #[arg(long, env = "POLLING_CONTACTS", default_value = "")]
    pub polling_contacts: String,

    /// Seconds between sync cycles.
    #[arg(long, env = "POLLING_INTERVAL_SECS", default_value_t = 60)]
    pub polling_interval_secs: u64,

    /// HTTP server port.
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Deployment environment: local, development, production, or test.
    #[arg(long, env = "ENVIRONMENT", default_value = "development")]
    pub environment: String,

    /// Comma-separated bus server URLs.
    #[arg(long, env = "NATS_URL", default_value = "nats://localhost:4222")]
    pub nats_url: String,

    /// Bus user (non-production).
    #[arg(long, env = "NATS_USER")]
    pub nats_user: Option<String>,

    /// Bus password (non-production).
    #[arg(long, env = "NATS_PASSWORD")]
    pub nats_password: Option<String>,

    /// Bus JWT token endpoint (production).
    #[arg(long, env = "NATS_AUTH_URL")]
    pub nats_auth_url: Option<String>,

    /// Bus JWT access key (production).
    #[arg(long, env = "NATS_ACCESS_KEY")]
    pub nats_access_key: Option<String>,

    /// Bus JWT secret key (production).
    #[arg(long, env = "NATS_SECRET_KEY")]
    pub nats_secret_key: Option<String>,

    /// Export spans via OpenTelemetry (stdout exporter).
    #[arg(long, env = "ENABLE_OTEL")]
    pub enable_otel: bool,
}

impl Cli {
    /// Turn the parsed arguments into the typed gateway configuration.
    pub fn into_config(self) -> anyhow::Result<GatewayConfig> {
        let environment: Environment = self
            .environment
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        Ok(GatewayConfig {
            port: self.port,
            environment,
            bus: BusConfig {
                servers: split_csv(&self.nats_url),
                user: self.nats_user,
                password: self.nats_password,
                auth_url: self.nats_auth_url,
                access_key: self.nats_access_key,
                secret_key: self.nats_secret_key,
            },
            api: ApiConfig {
                api_key: self.respond_io_api_key,
                base_url: self.respond_io_base_url,
            },
            polling: PollingConfig {
                enabled: self.polling_enabled,
                interval_secs: self.polling_interval_secs,
                contacts: split_csv(&self.polling_contacts),
                ..PollingConfig::default()
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["courier", "--respond-io-api-key", "key"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn defaults_produce_development_config() {
        let config = parse(&[]).into_config().unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.bus.servers, vec!["nats://localhost:4222"]);
        assert!(!config.polling.enabled);
        assert!(config.polling.contacts.is_empty());
    }

    #[test]
    fn comma_separated_lists_are_split() {
        let config = parse(&[
            "--nats-url",
            "nats://a:4222, nats://b:4222",
            "--polling-contacts",
            "1, 2,3",
        ])
        .into_config()
        .unwrap();
        assert_eq!(config.bus.servers.len(), 2);
        assert_eq!(config.polling.contacts, vec!["1", "2", "3"]);
    }

    #[test]
    fn polling_flags_are_applied() {
        let config = parse(&["--polling-enabled", "--polling-interval-secs", "30"])
            .into_config()
            .unwrap();
        assert!(config.polling.enabled);
        assert_eq!(config.polling.interval_secs, 30);
        // Batch and window sizes keep their engine defaults.
        assert_eq!(config.polling.batch_size, 20);
        assert_eq!(config.polling.window_size, 5);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = parse(&["--environment", "staging"]).into_config().unwrap_err();
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn missing_api_key_fails_parsing() {
        assert!(Cli::try_parse_from(["courier"]).is_err());
    }
}
