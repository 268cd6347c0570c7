//! Shared configuration for the basislink bridge.
//!
//! TOML file + `BASISLINK_`-prefixed environment variables, translated
//! into `basislink_core::BridgeConfig` and an OAuth token session. The
//! host embeds this; nothing here talks to the network.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use basislink_api::{OAuthSession, TlsMode, TransportConfig};
use basislink_core::BridgeConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no refresh token configured (set oauth.refresh_token or oauth.refresh_token_env)")]
    NoRefreshToken,

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("transport setup failed: {0}")]
    Transport(#[from] basislink_api::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Skip TLS verification (development endpoints only).
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Poll cadences.
    #[serde(default)]
    pub intervals: Intervals,

    /// OAuth2 session settings.
    #[serde(default)]
    pub oauth: OAuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            insecure: false,
            ca_cert: None,
            timeout: default_timeout(),
            intervals: Intervals::default(),
            oauth: OAuthConfig::default(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.wearebasis.io".into()
}
fn default_timeout() -> u64 {
    30
}

/// Poll intervals in seconds.
#[derive(Debug, Deserialize, Serialize)]
pub struct Intervals {
    /// Board discovery cadence.
    #[serde(default = "default_discovery_secs")]
    pub discovery: u64,

    /// Live switchboard state cadence.
    #[serde(default = "default_live_secs")]
    pub live: u64,

    /// Energy totals cadence.
    #[serde(default = "default_energy_secs")]
    pub energy: u64,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            discovery: default_discovery_secs(),
            live: default_live_secs(),
            energy: default_energy_secs(),
        }
    }
}

fn default_discovery_secs() -> u64 {
    300
}
fn default_live_secs() -> u64 {
    5
}
fn default_energy_secs() -> u64 {
    300
}

/// OAuth2 refresh-token session settings.
#[derive(Debug, Deserialize, Serialize)]
pub struct OAuthConfig {
    /// Token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// OAuth2 client id.
    pub client_id: Option<String>,

    /// Refresh token (plaintext -- prefer `refresh_token_env`).
    pub refresh_token: Option<String>,

    /// Environment variable holding the refresh token.
    pub refresh_token_env: Option<String>,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            client_id: None,
            refresh_token: None,
            refresh_token_env: None,
        }
    }
}

fn default_token_url() -> String {
    "https://auth.wearebasis.com/oauth/token".into()
}

// ── Loading ─────────────────────────────────────────────────────────

impl Config {
    /// Load from an optional TOML file, then `BASISLINK_*` environment
    /// variables (nested keys split on `__`, e.g.
    /// `BASISLINK_INTERVALS__LIVE=2`).
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        let config = figment
            .merge(Env::prefixed("BASISLINK_").split("__"))
            .extract()?;
        Ok(config)
    }

    // ── Translation ─────────────────────────────────────────────────

    fn tls_mode(&self) -> TlsMode {
        if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref path) = self.ca_cert {
            TlsMode::CustomCa(path.clone())
        } else {
            TlsMode::System
        }
    }

    /// Build the runtime bridge configuration.
    pub fn to_bridge_config(&self) -> Result<BridgeConfig, ConfigError> {
        let api_url = Url::parse(&self.api_url).map_err(|e| ConfigError::Validation {
            field: "api_url".into(),
            reason: e.to_string(),
        })?;

        Ok(BridgeConfig {
            api_url,
            tls: self.tls_mode(),
            timeout: Duration::from_secs(self.timeout),
            discovery_interval: Duration::from_secs(self.intervals.discovery),
            live_interval: Duration::from_secs(self.intervals.live),
            energy_interval: Duration::from_secs(self.intervals.energy),
        })
    }

    /// Resolve the refresh token: explicit value first, then the named
    /// environment variable.
    fn refresh_token(&self) -> Result<SecretString, ConfigError> {
        if let Some(ref token) = self.oauth.refresh_token {
            return Ok(SecretString::from(token.clone()));
        }
        if let Some(ref var) = self.oauth.refresh_token_env {
            if let Ok(token) = std::env::var(var) {
                return Ok(SecretString::from(token));
            }
        }
        Err(ConfigError::NoRefreshToken)
    }

    /// Build the lazy-refresh OAuth session used as the bridge's token
    /// provider.
    pub fn to_oauth_session(&self) -> Result<OAuthSession, ConfigError> {
        let token_url =
            Url::parse(&self.oauth.token_url).map_err(|e| ConfigError::Validation {
                field: "oauth.token_url".into(),
                reason: e.to_string(),
            })?;

        let client_id = self
            .oauth
            .client_id
            .clone()
            .ok_or_else(|| ConfigError::Validation {
                field: "oauth.client_id".into(),
                reason: "missing".into(),
            })?;

        let transport = TransportConfig {
            tls: self.tls_mode(),
            timeout: Duration::from_secs(self.timeout),
            ..TransportConfig::default()
        };

        Ok(OAuthSession::new(
            token_url,
            client_id,
            self.refresh_token()?,
            &transport,
        )?)
    }
}
