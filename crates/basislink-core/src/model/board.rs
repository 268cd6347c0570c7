// ── Switchboard domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::label::CircuitLabel;

/// A subcircuit's on/standby state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Live,
    Standby,
    #[default]
    Unknown,
}

impl CircuitState {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Parse the wire string, treating anything unrecognized as unknown.
    pub fn from_wire(raw: Option<&str>) -> Self {
        raw.map(|s| s.parse().unwrap_or_default()).unwrap_or_default()
    }
}

/// Cloud-connection status of a switchboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connectivity {
    pub connected: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub disconnect_reason: Option<String>,
}

/// One controllable/monitorable branch circuit within a switchboard.
///
/// The serial is stable across polls of the same board and is the join
/// key entities use to locate current live data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcircuit {
    pub serial: String,
    /// 1-based position, used for display ordering and zero-padded labels.
    pub number: u32,
    pub label: CircuitLabel,
    pub standby_locked: bool,
    pub config_version: Option<String>,
    pub state: CircuitState,
    pub power: Option<f64>,
    pub current: Option<f64>,
    pub phase_voltage: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Subcircuit {
    /// `[NN] {friendly name}` display prefix.
    pub fn display_label(&self) -> String {
        format!("[{:02}] {}", self.number, self.label.display_name())
    }
}

/// A physical switchboard: connectivity, aggregate live power, and its
/// ordered child subcircuits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Switchboard {
    pub serial: String,
    pub model: Option<String>,
    pub firmware_version: Option<String>,
    pub connectivity: Connectivity,
    pub power: Option<f64>,
    pub import_power: Option<f64>,
    pub export_power: Option<f64>,
    pub primary_current: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
    pub subcircuits: Vec<Subcircuit>,
}

impl Switchboard {
    /// Look up a subcircuit by its serial (the stable join key).
    pub fn subcircuit(&self, serial: &str) -> Option<&Subcircuit> {
        self.subcircuits.iter().find(|sub| sub.serial == serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_state_parses_wire_values() {
        assert_eq!(CircuitState::from_wire(Some("LIVE")), CircuitState::Live);
        assert_eq!(
            CircuitState::from_wire(Some("STANDBY")),
            CircuitState::Standby
        );
    }

    #[test]
    fn circuit_state_unrecognized_is_unknown() {
        assert_eq!(
            CircuitState::from_wire(Some("SOMETHING_NEW")),
            CircuitState::Unknown
        );
        assert_eq!(CircuitState::from_wire(None), CircuitState::Unknown);
    }

    #[test]
    fn display_label_zero_pads_position() {
        let sub = Subcircuit {
            serial: "SC-1".into(),
            number: 3,
            label: CircuitLabel::new("hwc"),
            standby_locked: false,
            config_version: None,
            state: CircuitState::Live,
            power: None,
            current: None,
            phase_voltage: None,
            updated_at: None,
        };
        assert_eq!(sub.display_label(), "[03] Hot Water Cylinder");
    }
}
