// ── Runtime bridge configuration ──
//
// Describes *how* to reach the Basis API and how often to poll. Carries
// connection tuning but never touches disk -- basislink-config builds a
// `BridgeConfig` from files/environment and hands it in.

use std::time::Duration;

use basislink_api::TlsMode;
use url::Url;

/// Configuration for one bridge instance.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// API base URL (the `/query` path is appended by the client).
    pub api_url: Url,
    /// TLS verification strategy.
    pub tls: TlsMode,
    /// Request timeout.
    pub timeout: Duration,
    /// How often to re-discover the switchboard set.
    pub discovery_interval: Duration,
    /// How often each board's live state is polled.
    pub live_interval: Duration,
    /// How often each board's energy totals are polled.
    pub energy_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse("https://api.wearebasis.io").expect("static URL is valid"),
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            discovery_interval: Duration::from_secs(300),
            live_interval: Duration::from_secs(5),
            energy_interval: Duration::from_secs(300),
        }
    }
}
