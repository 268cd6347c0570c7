// ── Subcircuit labels ──
//
// The API reports an enum-like string key per subcircuit. Known keys map
// to a human name and an icon; unrecognized keys fall back to the raw
// string and a generic icon so new labels degrade gracefully.

use serde::{Deserialize, Serialize};

/// Generic icon for circuits without a recognized label.
pub const FALLBACK_ICON: &str = "mdi:power-socket";

/// The label key reserved for unconfigured circuits. Spare circuits are
/// excluded from subcircuit entities and standby control.
const SPARE: &str = "spare";

/// A subcircuit's configured label key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CircuitLabel(String);

impl CircuitLabel {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_spare(&self) -> bool {
        self.0 == SPARE
    }

    /// Human-readable name; unrecognized keys pass through verbatim.
    pub fn display_name(&self) -> &str {
        match self.0.as_str() {
            "spare" => "Spare",
            "power" => "Power",
            "lights" => "Lights",
            "range" => "Range",
            "oven" => "Oven",
            "hob" => "Hob",
            "airCon" => "Air Conditioning",
            "hvac" => "HVAC",
            "hwc" => "Hot Water Cylinder",
            "ufh" => "Underfloor Heating",
            "evCharger" => "EV Charger",
            "pool" => "Pool",
            "spa" => "Spa",
            "waterPump" => "Water Pump",
            "septicPump" => "Septic Pump",
            "alarm" => "Alarm",
            "solar" => "Solar",
            other => other,
        }
    }

    /// Material Design icon name for the label.
    pub fn icon(&self) -> &'static str {
        match self.0.as_str() {
            "spare" => "mdi:help-circle",
            "power" => "mdi:flash",
            "lights" => "mdi:lightbulb",
            "range" | "oven" => "mdi:stove",
            "hob" => "mdi:pot-steam",
            "airCon" => "mdi:snowflake",
            "hvac" => "mdi:air-conditioner",
            "hwc" => "mdi:water-boiler",
            "ufh" => "mdi:radiator",
            "evCharger" => "mdi:ev-station",
            "pool" => "mdi:pool",
            "spa" => "mdi:hot-tub",
            "waterPump" => "mdi:water-pump",
            "septicPump" => "mdi:pump",
            "alarm" => "mdi:alarm-light",
            "solar" => "mdi:solar-power",
            _ => FALLBACK_ICON,
        }
    }
}

impl From<&str> for CircuitLabel {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl std::fmt::Display for CircuitLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_label_maps_to_name_and_icon() {
        let label = CircuitLabel::new("hwc");
        assert_eq!(label.display_name(), "Hot Water Cylinder");
        assert_eq!(label.icon(), "mdi:water-boiler");
    }

    #[test]
    fn unknown_label_falls_back_to_raw_and_generic_icon() {
        let label = CircuitLabel::new("heatedTowelRail");
        assert_eq!(label.display_name(), "heatedTowelRail");
        assert_eq!(label.icon(), FALLBACK_ICON);
    }

    #[test]
    fn spare_is_detected() {
        assert!(CircuitLabel::new("spare").is_spare());
        assert!(!CircuitLabel::new("lights").is_spare());
    }
}
