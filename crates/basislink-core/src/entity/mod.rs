// ── Entity presentation layer ──
//
// Typed read/write entities projected from the coordinators' latest
// snapshots. Every getter is a direct field projection and nullable-safe:
// an absent snapshot or absent nested field yields `None`, never a panic.
// The set is rebuilt from scratch on every reconciliation; unique ids are
// stable serial-derived keys so identity survives rebuilds.

pub mod binary_sensor;
pub mod sensor;
pub mod switch;

use std::sync::Arc;

use basislink_api::PanelClient;
use tracing::warn;

use crate::coordinator::{EnergyCoordinator, LiveCoordinator};

pub use binary_sensor::ConnectivitySensor;
pub use sensor::{
    BoardMetric, BoardSensor, EnergyMetric, EnergySensor, SensorClass, StateClass,
    SubcircuitMetric, SubcircuitSensor, Unit,
};
pub use switch::CircuitSwitch;

/// Common surface shared by every entity kind.
pub trait Entity {
    /// Stable unique id, derived from the owning serials.
    fn unique_id(&self) -> String;
    /// Display name.
    fn name(&self) -> String;
    /// Serial of the switchboard device this entity belongs to.
    fn device_serial(&self) -> &str;
    /// Whether the entity currently has a live data source behind it.
    fn available(&self) -> bool;
}

/// The full entity set for one bridge instance.
#[derive(Default)]
pub struct PanelEntities {
    pub board_sensors: Vec<BoardSensor>,
    pub energy_sensors: Vec<EnergySensor>,
    pub subcircuit_sensors: Vec<SubcircuitSensor>,
    pub connectivity_sensors: Vec<ConnectivitySensor>,
    pub switches: Vec<CircuitSwitch>,
}

impl PanelEntities {
    pub fn len(&self) -> usize {
        self.board_sensors.len()
            + self.energy_sensors.len()
            + self.subcircuit_sensors.len()
            + self.connectivity_sensors.len()
            + self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the complete entity set for the given boards from their
/// coordinators' current snapshots.
///
/// Subcircuits labelled "spare" yield no subcircuit sensors and no
/// switch; standby-locked subcircuits additionally yield no switch.
/// A board whose live coordinator has no data yet contributes nothing.
pub fn build_entities<'a, I>(api: &Arc<PanelClient>, boards: I) -> PanelEntities
where
    I: IntoIterator<Item = (&'a Arc<LiveCoordinator>, &'a Arc<EnergyCoordinator>)>,
{
    let mut entities = PanelEntities::default();

    for (live, energy) in boards {
        let Some(board) = live.board() else {
            warn!(serial = %live.serial(), "no data for switchboard, skipping entities");
            continue;
        };

        for metric in BoardMetric::ALL {
            entities
                .board_sensors
                .push(BoardSensor::new(Arc::clone(live), metric));
        }

        for metric in EnergyMetric::ALL {
            entities
                .energy_sensors
                .push(EnergySensor::new(Arc::clone(energy), metric));
        }

        entities
            .connectivity_sensors
            .push(ConnectivitySensor::new(Arc::clone(live)));

        for sub in &board.subcircuits {
            if sub.label.is_spare() {
                continue;
            }

            for metric in SubcircuitMetric::ALL {
                entities.subcircuit_sensors.push(SubcircuitSensor::new(
                    Arc::clone(live),
                    &sub.serial,
                    sub.number,
                    metric,
                ));
            }

            if !sub.standby_locked {
                entities.switches.push(CircuitSwitch::new(
                    Arc::clone(api),
                    Arc::clone(live),
                    &sub.serial,
                    sub.number,
                ));
            }
        }
    }

    entities
}
