// ── Wire → domain conversion ──
//
// All defaulting for optional wire fields happens here, once, at the
// API-client boundary.

use basislink_api::types as wire;

use crate::model::{
    CircuitLabel, CircuitState, Connectivity, EnergyWindow, Subcircuit, Switchboard,
};

impl From<wire::Connectivity> for Connectivity {
    fn from(raw: wire::Connectivity) -> Self {
        Self {
            connected: raw.connected,
            last_update: raw.updated_timestamp,
            disconnect_reason: raw.disconnect_reason,
        }
    }
}

impl From<wire::Subcircuit> for Subcircuit {
    fn from(raw: wire::Subcircuit) -> Self {
        let config = raw.config.unwrap_or_default();
        let live = raw.live_state.unwrap_or_default();

        Self {
            serial: raw.serial,
            number: raw.number,
            // An absent label stays empty: only a literal "spare" excludes
            // the circuit from entities, matching the remote semantics.
            label: CircuitLabel::new(config.label.unwrap_or_default()),
            standby_locked: config.standby_locked,
            config_version: config.version,
            state: CircuitState::from_wire(live.state.as_deref()),
            power: live.power,
            current: live.primary_current,
            phase_voltage: live.phase_voltage,
            updated_at: live.updated_timestamp,
        }
    }
}

impl From<wire::SwitchboardDetail> for Switchboard {
    fn from(raw: wire::SwitchboardDetail) -> Self {
        let live = raw.live_state.unwrap_or_default();
        let usage = live.power_usage.unwrap_or_default();

        Self {
            serial: raw.serial,
            model: raw.model,
            firmware_version: raw.version,
            connectivity: raw.connectivity.map(Connectivity::from).unwrap_or_default(),
            power: live.power,
            import_power: usage.import_power,
            export_power: usage.export_power,
            primary_current: live.primary_current,
            updated_at: live.updated_timestamp,
            subcircuits: raw.subcircuits.into_iter().map(Subcircuit::from).collect(),
        }
    }
}

impl From<wire::EnergyUsage> for EnergyWindow {
    fn from(raw: wire::EnergyUsage) -> Self {
        Self {
            import_kwh: raw.import_kwh,
            export_kwh: raw.export_kwh,
        }
    }
}
