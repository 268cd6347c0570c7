// ── Wire types for the Basis GraphQL API ──
//
// One record per response node, camelCase on the wire. Defaulting rules:
// every field is optional except the serials that identify entities --
// a missing serial fails deserialization, everything else decodes to a
// default and is resolved by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Discovery ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct SitesData {
    #[serde(default)]
    pub sites: Option<SitesNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SitesNode {
    #[serde(default)]
    pub sites: Vec<SiteNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SiteNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub switchboards: Vec<SwitchboardOverview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SwitchboardOverview {
    pub serial: String,
    #[serde(default)]
    pub connectivity: Option<ConnectivityStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConnectivityStatus {
    #[serde(default)]
    pub connected: bool,
}

/// One switchboard from the discovery operation, flattened across sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredBoard {
    pub serial: String,
    pub site_id: Option<String>,
    pub connected: bool,
}

// ── Switchboard snapshot ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct SwitchboardData {
    #[serde(default)]
    pub switchboard: Option<SwitchboardDetail>,
}

/// Full nested switchboard snapshot as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchboardDetail {
    pub serial: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub connectivity: Option<Connectivity>,
    #[serde(default)]
    pub live_state: Option<BoardLiveState>,
    #[serde(default)]
    pub subcircuits: Vec<Subcircuit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connectivity {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub updated_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub disconnect_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardLiveState {
    #[serde(default)]
    pub power: Option<f64>,
    #[serde(default)]
    pub power_usage: Option<PowerUsage>,
    #[serde(default)]
    pub primary_current: Option<f64>,
    #[serde(default)]
    pub updated_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerUsage {
    #[serde(default)]
    pub import_power: Option<f64>,
    #[serde(default)]
    pub export_power: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcircuit {
    pub serial: String,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub config: Option<SubcircuitConfig>,
    #[serde(default)]
    pub live_state: Option<SubcircuitLiveState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcircuitConfig {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub standby_locked: bool,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcircuitLiveState {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub power: Option<f64>,
    #[serde(default)]
    pub primary_current: Option<f64>,
    #[serde(default)]
    pub phase_voltage: Option<f64>,
    #[serde(default)]
    pub updated_timestamp: Option<DateTime<Utc>>,
}

// ── Energy usage ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct EnergyData {
    #[serde(default)]
    pub switchboard: Option<EnergyNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnergyNode {
    #[serde(default)]
    pub total_switchboard_energy_usage: Option<EnergyUsage>,
}

/// Import/export totals for one query window.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyUsage {
    #[serde(default)]
    pub import_kwh: Option<f64>,
    #[serde(default)]
    pub export_kwh: Option<f64>,
}

// ── Standby mutation ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateStandbyVariables {
    pub input: UpdateStandbyInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateStandbyInput {
    pub switchboard_serial: String,
    pub subcircuit_serial: String,
    pub activate_standby: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateStandbyData {
    #[serde(default)]
    pub update_subcircuit_standby_state: Option<StandbyUpdate>,
}

/// Updated subcircuit state returned by the standby mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandbyUpdate {
    pub serial: String,
    #[serde(default)]
    pub live_state: Option<SubcircuitLiveState>,
}
