//! Configuration management for the payment proxy.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use pibridge_client::{ClientConfig, DEFAULT_BASE_URL};
use pibridge_core::ApiKey;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

const CONFIG_FILE: &str = "config.toml";

/// Variables holding free-form text. The environment provider types values
/// that look like numbers, so these are merged verbatim instead.
const TEXT_VARS: &[&str] =
    &["pi_api_key", "pi_api_base_url", "a2u_memo", "a2u_metadata_type", "host", "rust_log"];

/// Service configuration with defaults, file, and environment overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The provider credential is optional at startup. Without it the server
/// still runs, health reports `degraded`, and every payment request fails
/// with a configuration error.
///
/// # Example
///
/// ```no_run
/// use pibridge_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Provider
    /// Provider API credential.
    ///
    /// Environment variable: `PI_API_KEY`. An empty value counts as unset.
    #[serde(default, alias = "PI_API_KEY", deserialize_with = "blank_as_none")]
    pub pi_api_key: Option<ApiKey>,
    /// Base URL of the provider payments API.
    ///
    /// Environment variable: `PI_API_BASE_URL`
    #[serde(default = "default_base_url", alias = "PI_API_BASE_URL")]
    pub pi_api_base_url: String,
    /// Provider request timeout in seconds. Unset means no timeout.
    ///
    /// Environment variable: `PROVIDER_TIMEOUT_SECONDS`
    #[serde(default, alias = "PROVIDER_TIMEOUT_SECONDS")]
    pub provider_timeout_seconds: Option<u64>,

    // A2U payments
    /// Memo attached to App-to-User payments.
    ///
    /// Environment variable: `A2U_MEMO`
    #[serde(default = "default_memo", alias = "A2U_MEMO")]
    pub a2u_memo: String,
    /// `metadata.type` attached to App-to-User payments.
    ///
    /// Environment variable: `A2U_METADATA_TYPE`
    #[serde(default = "default_metadata_type", alias = "A2U_METADATA_TYPE")]
    pub a2u_metadata_type: String,

    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// Inbound request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Logging
    /// Log filter directives.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

/// Per-request settings the payment handlers read.
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    /// Provider credential, if configured.
    pub api_key: Option<ApiKey>,
    /// Memo for App-to-User payments.
    pub a2u_memo: String,
    /// Metadata type for App-to-User payments.
    pub a2u_metadata_type: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("").ignore(TEXT_VARS));

        for (key, value) in Env::raw().only(TEXT_VARS).iter() {
            figment = figment.merge(Serialized::default(key.as_str(), value));
        }

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the provider client's configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.pi_api_base_url.clone(),
            timeout: self.provider_timeout_seconds.map(Duration::from_secs),
            ..ClientConfig::default()
        }
    }

    /// Extract the settings the payment handlers need.
    pub fn to_payments_config(&self) -> PaymentsConfig {
        PaymentsConfig {
            api_key: self.pi_api_key.clone(),
            a2u_memo: self.a2u_memo.clone(),
            a2u_metadata_type: self.a2u_metadata_type.clone(),
        }
    }

    /// Inbound request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Get the provider credential masked for logging.
    pub fn api_key_masked(&self) -> String {
        self.pi_api_key.as_ref().map_or_else(|| "<unset>".to_string(), ApiKey::masked)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.provider_timeout_seconds == Some(0) {
            anyhow::bail!("provider_timeout_seconds must be greater than 0 when set");
        }

        let base_url = Url::parse(&self.pi_api_base_url)
            .with_context(|| format!("pi_api_base_url is not a URL: {}", self.pi_api_base_url))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("pi_api_base_url must use http or https");
        }

        if self.a2u_memo.is_empty() {
            anyhow::bail!("a2u_memo cannot be empty");
        }

        if self.a2u_metadata_type.is_empty() {
            anyhow::bail!("a2u_metadata_type cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pi_api_key: None,
            pi_api_base_url: default_base_url(),
            provider_timeout_seconds: None,
            a2u_memo: default_memo(),
            a2u_metadata_type: default_metadata_type(),
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            rust_log: default_log_level(),
        }
    }
}

impl PaymentsConfig {
    /// Settings with the default memo and metadata type.
    pub fn with_api_key(api_key: Option<ApiKey>) -> Self {
        Self { api_key, a2u_memo: default_memo(), a2u_metadata_type: default_metadata_type() }
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<ApiKey>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(ApiKey::new))
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_memo() -> String {
    "Testnet A2U – unlock App Wallet Mainnet".to_string()
}

fn default_metadata_type() -> String {
    "a2u-testnet".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info,pibridge=debug,tower_http=debug".to_string()
}
