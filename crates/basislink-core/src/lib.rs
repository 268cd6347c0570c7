// basislink-core: Reconciliation, polling, and entity layer between
// basislink-api and the host home-automation runtime.

pub mod bridge;
pub mod config;
pub mod convert;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod model;
pub mod registry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::{PanelBridge, ReconcilePlan};
pub use config::BridgeConfig;
pub use coordinator::{DiscoveryCoordinator, EnergyCoordinator, LiveCoordinator};
pub use entity::{Entity, PanelEntities};
pub use error::CoreError;
pub use registry::{DEFAULT_MODEL, DeviceRecord, DeviceRegistry};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    CircuitLabel, CircuitState, Connectivity, EnergyTotals, EnergyWindow, Subcircuit, Switchboard,
};
