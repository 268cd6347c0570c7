// ── Token acquisition ──
//
// Every API call acquires a fresh bearer token immediately before use;
// tokens may be short-lived. The provider abstraction lets the host
// runtime supply its own credential session, while `OAuthSession` covers
// the standalone refresh-token flow.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Supplies a valid bearer token on demand.
///
/// Implementations must return a token that is valid at the moment of the
/// call; callers never cache it across requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<SecretString, Error>;
}

/// Fixed token provider for tests and pre-authenticated hosts.
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<SecretString, Error> {
        Ok(self.0.clone())
    }
}

// ── OAuth2 refresh-token session ────────────────────────────────────

/// Leeway subtracted from the token lifetime so a token is refreshed
/// slightly before it actually expires.
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// Fallback lifetime when the token endpoint omits `expires_in`.
const DEFAULT_LIFETIME_SECS: i64 = 300;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

struct CachedToken {
    access_token: SecretString,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - ChronoDuration::seconds(EXPIRY_LEEWAY_SECS) > now
    }
}

/// OAuth2 session backed by a long-lived refresh token.
///
/// The access token is refreshed lazily: a cached token is reused until
/// it is within [`EXPIRY_LEEWAY_SECS`] of expiring, then exchanged via a
/// `refresh_token` grant against the configured token endpoint.
pub struct OAuthSession {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    refresh_token: SecretString,
    cached: Mutex<Option<CachedToken>>,
}

impl OAuthSession {
    pub fn new(
        token_url: Url,
        client_id: impl Into<String>,
        refresh_token: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            token_url,
            client_id: client_id.into(),
            refresh_token,
            cached: Mutex::new(None),
        })
    }

    async fn refresh(&self) -> Result<CachedToken, Error> {
        debug!(url = %self.token_url, "refreshing access token");

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("refresh_token", self.refresh_token.expose_secret()),
        ];

        let resp = self
            .http
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("token endpoint returned HTTP {status}: {body}"),
            });
        }

        let token: TokenResponse = resp.json().await.map_err(|e| Error::Authentication {
            message: format!("invalid token response: {e}"),
        })?;

        let lifetime = token.expires_in.unwrap_or(DEFAULT_LIFETIME_SECS);
        Ok(CachedToken {
            access_token: SecretString::from(token.access_token),
            expires_at: Utc::now() + ChronoDuration::seconds(lifetime),
        })
    }
}

#[async_trait]
impl TokenProvider for OAuthSession {
    async fn access_token(&self) -> Result<SecretString, Error> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_valid(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.refresh().await?;
        let access = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_token_valid_before_leeway_window() {
        let token = CachedToken {
            access_token: SecretString::from("t".to_string()),
            expires_at: Utc::now() + ChronoDuration::seconds(120),
        };
        assert!(token.is_valid(Utc::now()));
    }

    #[test]
    fn cached_token_invalid_inside_leeway_window() {
        let token = CachedToken {
            access_token: SecretString::from("t".to_string()),
            expires_at: Utc::now() + ChronoDuration::seconds(EXPIRY_LEEWAY_SECS - 5),
        };
        assert!(!token.is_valid(Utc::now()));
    }

    #[test]
    fn cached_token_invalid_after_expiry() {
        let token = CachedToken {
            access_token: SecretString::from("t".to_string()),
            expires_at: Utc::now() - ChronoDuration::seconds(1),
        };
        assert!(!token.is_valid(Utc::now()));
    }
}
