// ── GraphQL wire plumbing ──
//
// Hand-crafted request/response envelope plus the four operation
// documents. No schema codegen: the documents are small and fixed, and
// the typed result records in `types` carry the defaulting rules.

use serde::{Deserialize, Serialize};

/// A GraphQL request body: a query document plus its variables.
#[derive(Debug, Serialize)]
pub(crate) struct GraphqlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

/// The standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct GraphqlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

/// One entry of the `errors` array.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<serde_json::Value>>,
}

impl GraphqlError {
    /// Render the error path as a dotted string, if present.
    pub fn path_string(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        let parts: Vec<String> = path
            .iter()
            .map(|segment| match segment {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        Some(parts.join("."))
    }
}

/// Empty variables for operations that take none.
#[derive(Debug, Serialize)]
pub(crate) struct NoVariables {}

pub(crate) const NO_VARIABLES: NoVariables = NoVariables {};

// ── Operation documents ─────────────────────────────────────────────

/// Discover all switchboards visible to the authenticated account.
pub(crate) const DISCOVER_SWITCHBOARDS: &str = r#"
query {
    sites(input: { query: "" }) {
        sites {
            id
            switchboards {
                serial
                connectivity {
                    connected
                }
            }
        }
    }
}"#;

/// Full live snapshot of one switchboard and its subcircuits.
pub(crate) const GET_SWITCHBOARD: &str = r"
query GetSwitchboardData($serial: String!) {
    switchboard(serial: $serial) {
        serial
        model
        version
        connectivity {
            connected
            updatedTimestamp
            disconnectReason
        }
        liveState {
            power
            powerUsage {
                importPower
                exportPower
            }
            primaryCurrent
            updatedTimestamp
        }
        subcircuits {
            serial
            number
            config {
                label
                standbyLocked
                version
            }
            liveState {
                state
                power
                primaryCurrent
                phaseVoltage
                updatedTimestamp
            }
        }
    }
}";

/// Cumulative energy usage for the window [startTime, now).
pub(crate) const GET_ENERGY_USAGE: &str = r"
query GetSwitchboardEnergyUsage($serial: String!, $startTime: Time!) {
    switchboard(serial: $serial) {
        totalSwitchboardEnergyUsage(input: { startTime: $startTime }) {
            importKwh
            exportKwh
        }
    }
}";

/// Toggle a subcircuit's standby state.
pub(crate) const UPDATE_SUBCIRCUIT_STANDBY: &str = r"
mutation UpdateSubcircuitStandby($input: UpdateSubcircuitStandbyStateInput!) {
    updateSubcircuitStandbyState(input: $input) {
        serial
        liveState {
            state
        }
    }
}";
