// ── Domain model ──
//
// Canonical representations of Basis entities, decoded once at the API
// boundary. The rest of the system never handles raw wire maps.

pub mod board;
pub mod energy;
pub mod label;

pub use board::{CircuitState, Connectivity, Subcircuit, Switchboard};
pub use energy::{EnergyTotals, EnergyWindow};
pub use label::CircuitLabel;
