// ── Energy totals ──

use serde::{Deserialize, Serialize};

/// Import/export kWh for one window. `None` means the API reported no
/// value for the window, not zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyWindow {
    pub import_kwh: Option<f64>,
    pub export_kwh: Option<f64>,
}

/// Cumulative energy totals for a switchboard, recomputed fully on
/// every poll (not incremental).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyTotals {
    /// Since local midnight.
    pub today: EnergyWindow,
    /// Since the first of the month, local time.
    pub month: EnergyWindow,
}
