// Hand-crafted async client for the Basis switchboard GraphQL API.
//
// Endpoint: {base_url}/query
// Auth: bearer token, acquired fresh from the TokenProvider before
// every request (tokens may be short-lived).
//
// No retry or backoff lives here -- transient failures propagate to the
// caller's scheduled-refresh layer, which retains last-known-good data.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::auth::TokenProvider;
use crate::graphql::{self, GraphqlRequest, GraphqlResponse, NO_VARIABLES};
use crate::transport::TransportConfig;
use crate::types::{
    DiscoveredBoard, EnergyData, EnergyUsage, SitesData, StandbyUpdate, SwitchboardData,
    SwitchboardDetail, UpdateStandbyData, UpdateStandbyInput, UpdateStandbyVariables,
};

/// Async client for the Basis switchboard cloud API.
///
/// Stateless aside from the token provider reference: one POST per
/// operation, a fresh bearer token per request.
pub struct PanelClient {
    http: reqwest::Client,
    endpoint: Url,
    auth: Arc<dyn TokenProvider>,
}

impl PanelClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for the given API base URL.
    pub fn new(
        base_url: &str,
        auth: Arc<dyn TokenProvider>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            endpoint: Self::query_endpoint(base_url)?,
            auth,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages transport config).
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        auth: Arc<dyn TokenProvider>,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            endpoint: Self::query_endpoint(base_url)?,
            auth,
        })
    }

    /// Resolve `{base_url}/query`, tolerating a trailing slash.
    fn query_endpoint(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/query"));
        Ok(url)
    }

    // ── Request execution ────────────────────────────────────────────

    /// Execute one GraphQL operation: acquire a token, POST, unwrap the
    /// envelope.
    async fn execute<V, T>(&self, query: &'static str, variables: V) -> Result<T, Error>
    where
        V: Serialize + Send + Sync,
        T: DeserializeOwned,
    {
        let token = self.auth.access_token().await?;

        debug!("POST {}", self.endpoint);
        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(token.expose_secret())
            .json(&GraphqlRequest { query, variables })
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "endpoint rejected bearer token (HTTP 401)".into(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }

        let body = resp.text().await?;
        let envelope: GraphqlResponse<T> = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })?;

        if let Some(err) = envelope.errors.first() {
            return Err(Error::Graphql {
                message: err.message.clone(),
                path: err.path_string(),
            });
        }

        envelope.data.ok_or(Error::MissingData { what: "data" })
    }

    // ━━ Operations ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Discover all switchboards visible to the authenticated account,
    /// flattened across sites.
    pub async fn discover_switchboards(&self) -> Result<Vec<DiscoveredBoard>, Error> {
        let data: SitesData = self
            .execute(graphql::DISCOVER_SWITCHBOARDS, NO_VARIABLES)
            .await?;

        let sites = data.sites.map(|node| node.sites).unwrap_or_default();
        let mut boards = Vec::new();
        for site in sites {
            for board in site.switchboards {
                boards.push(DiscoveredBoard {
                    serial: board.serial,
                    site_id: site.id.clone(),
                    connected: board.connectivity.unwrap_or_default().connected,
                });
            }
        }

        debug!(count = boards.len(), "discovered switchboards");
        Ok(boards)
    }

    /// Fetch the full live snapshot of one switchboard.
    pub async fn get_switchboard(&self, serial: &str) -> Result<SwitchboardDetail, Error> {
        #[derive(Serialize)]
        struct Vars<'a> {
            serial: &'a str,
        }

        let data: SwitchboardData = self
            .execute(graphql::GET_SWITCHBOARD, Vars { serial })
            .await?;

        data.switchboard
            .ok_or(Error::MissingData { what: "switchboard" })
    }

    /// Fetch cumulative energy usage for the window `[start_time, now)`.
    ///
    /// An absent usage node decodes to an all-`None` record rather than
    /// an error -- the caller decides what an empty window means.
    pub async fn get_energy_usage<Tz>(
        &self,
        serial: &str,
        start_time: &chrono::DateTime<Tz>,
    ) -> Result<EnergyUsage, Error>
    where
        Tz: chrono::TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Vars<'a> {
            serial: &'a str,
            start_time: String,
        }

        let data: EnergyData = self
            .execute(
                graphql::GET_ENERGY_USAGE,
                Vars {
                    serial,
                    start_time: start_time.to_rfc3339(),
                },
            )
            .await?;

        Ok(data
            .switchboard
            .and_then(|node| node.total_switchboard_energy_usage)
            .unwrap_or_default())
    }

    /// Set a subcircuit's standby state. Idempotent at the remote end.
    pub async fn set_subcircuit_standby(
        &self,
        switchboard_serial: &str,
        subcircuit_serial: &str,
        standby: bool,
    ) -> Result<StandbyUpdate, Error> {
        let variables = UpdateStandbyVariables {
            input: UpdateStandbyInput {
                switchboard_serial: switchboard_serial.to_owned(),
                subcircuit_serial: subcircuit_serial.to_owned(),
                activate_standby: standby,
            },
        };

        let data: UpdateStandbyData = self
            .execute(graphql::UPDATE_SUBCIRCUIT_STANDBY, variables)
            .await?;

        data.update_subcircuit_standby_state
            .ok_or(Error::MissingData {
                what: "updated subcircuit state",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_endpoint_appends_query_path() {
        let url = PanelClient::query_endpoint("https://api.wearebasis.io").expect("valid URL");
        assert_eq!(url.as_str(), "https://api.wearebasis.io/query");
    }

    #[test]
    fn query_endpoint_tolerates_trailing_slash() {
        let url = PanelClient::query_endpoint("https://api.wearebasis.io/").expect("valid URL");
        assert_eq!(url.as_str(), "https://api.wearebasis.io/query");
    }
}
