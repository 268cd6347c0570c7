// ── Sensor entities ──

use std::sync::Arc;

use crate::coordinator::{EnergyCoordinator, LiveCoordinator};
use crate::model::{EnergyTotals, Subcircuit, Switchboard};

use super::Entity;

/// Host-runtime device class of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorClass {
    Power,
    Current,
    Voltage,
    Energy,
}

/// Host-runtime state class of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateClass {
    /// Instantaneous reading.
    Measurement,
    /// Monotonic total that may reset.
    Total,
}

/// Native unit of a sensor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Watt,
    Ampere,
    Volt,
    KilowattHour,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Watt => "W",
            Self::Ampere => "A",
            Self::Volt => "V",
            Self::KilowattHour => "kWh",
        }
    }
}

// ── Board-level sensors ──────────────────────────────────────────────

/// Switchboard-level live measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardMetric {
    /// Net panel power.
    Power,
    ImportPower,
    ExportPower,
    PrimaryCurrent,
}

impl BoardMetric {
    pub const ALL: [Self; 4] = [
        Self::Power,
        Self::ImportPower,
        Self::ExportPower,
        Self::PrimaryCurrent,
    ];

    fn project(self, board: &Switchboard) -> Option<f64> {
        match self {
            Self::Power => board.power,
            Self::ImportPower => board.import_power,
            Self::ExportPower => board.export_power,
            Self::PrimaryCurrent => board.primary_current,
        }
    }
}

/// Sensor for one switchboard-level measurement.
pub struct BoardSensor {
    coordinator: Arc<LiveCoordinator>,
    metric: BoardMetric,
}

impl BoardSensor {
    pub(crate) fn new(coordinator: Arc<LiveCoordinator>, metric: BoardMetric) -> Self {
        Self {
            coordinator,
            metric,
        }
    }

    pub fn metric(&self) -> BoardMetric {
        self.metric
    }

    pub fn device_class(&self) -> SensorClass {
        match self.metric {
            BoardMetric::PrimaryCurrent => SensorClass::Current,
            _ => SensorClass::Power,
        }
    }

    pub fn state_class(&self) -> StateClass {
        StateClass::Measurement
    }

    pub fn unit(&self) -> Unit {
        match self.metric {
            BoardMetric::PrimaryCurrent => Unit::Ampere,
            _ => Unit::Watt,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self.metric {
            BoardMetric::Power => "mdi:home-lightning-bolt",
            BoardMetric::ImportPower => "mdi:transmission-tower-import",
            BoardMetric::ExportPower => "mdi:transmission-tower-export",
            BoardMetric::PrimaryCurrent => "mdi:current-ac",
        }
    }

    /// Current reading, or `None` while no snapshot exists.
    pub fn value(&self) -> Option<f64> {
        self.coordinator
            .board()
            .and_then(|board| self.metric.project(&board))
    }
}

impl Entity for BoardSensor {
    fn unique_id(&self) -> String {
        let serial = self.coordinator.serial();
        match self.metric {
            BoardMetric::Power => format!("basis_power_panel_{serial}"),
            BoardMetric::ImportPower => format!("basis_import_power_{serial}"),
            BoardMetric::ExportPower => format!("basis_export_power_{serial}"),
            BoardMetric::PrimaryCurrent => format!("basis_current_{serial}"),
        }
    }

    fn name(&self) -> String {
        match self.metric {
            BoardMetric::Power => "Current Power",
            BoardMetric::ImportPower => "Import Power",
            BoardMetric::ExportPower => "Export Power",
            BoardMetric::PrimaryCurrent => "Primary Current",
        }
        .to_owned()
    }

    fn device_serial(&self) -> &str {
        self.coordinator.serial()
    }

    fn available(&self) -> bool {
        self.coordinator.is_healthy()
    }
}

// ── Energy sensors ───────────────────────────────────────────────────

/// One window/direction of the cumulative energy totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyMetric {
    TodayImport,
    TodayExport,
    MonthImport,
    MonthExport,
}

impl EnergyMetric {
    pub const ALL: [Self; 4] = [
        Self::TodayImport,
        Self::TodayExport,
        Self::MonthImport,
        Self::MonthExport,
    ];

    fn project(self, totals: &EnergyTotals) -> Option<f64> {
        match self {
            Self::TodayImport => totals.today.import_kwh,
            Self::TodayExport => totals.today.export_kwh,
            Self::MonthImport => totals.month.import_kwh,
            Self::MonthExport => totals.month.export_kwh,
        }
    }
}

/// Sensor for one energy total.
pub struct EnergySensor {
    coordinator: Arc<EnergyCoordinator>,
    metric: EnergyMetric,
}

impl EnergySensor {
    pub(crate) fn new(coordinator: Arc<EnergyCoordinator>, metric: EnergyMetric) -> Self {
        Self {
            coordinator,
            metric,
        }
    }

    pub fn metric(&self) -> EnergyMetric {
        self.metric
    }

    pub fn device_class(&self) -> SensorClass {
        SensorClass::Energy
    }

    pub fn state_class(&self) -> StateClass {
        StateClass::Total
    }

    pub fn unit(&self) -> Unit {
        Unit::KilowattHour
    }

    pub fn icon(&self) -> &'static str {
        match self.metric {
            EnergyMetric::TodayImport | EnergyMetric::MonthImport => "mdi:lightning-bolt",
            EnergyMetric::TodayExport | EnergyMetric::MonthExport => "mdi:solar-power",
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.coordinator
            .totals()
            .and_then(|totals| self.metric.project(&totals))
    }
}

impl Entity for EnergySensor {
    fn unique_id(&self) -> String {
        let serial = self.coordinator.serial();
        match self.metric {
            EnergyMetric::TodayImport => format!("basis_energy_today_import_{serial}"),
            EnergyMetric::TodayExport => format!("basis_energy_today_export_{serial}"),
            EnergyMetric::MonthImport => format!("basis_energy_month_import_{serial}"),
            EnergyMetric::MonthExport => format!("basis_energy_month_export_{serial}"),
        }
    }

    fn name(&self) -> String {
        match self.metric {
            EnergyMetric::TodayImport => "Energy Today Import",
            EnergyMetric::TodayExport => "Energy Today Export",
            EnergyMetric::MonthImport => "Energy This Month Import",
            EnergyMetric::MonthExport => "Energy This Month Export",
        }
        .to_owned()
    }

    fn device_serial(&self) -> &str {
        self.coordinator.serial()
    }

    fn available(&self) -> bool {
        self.coordinator.is_healthy()
    }
}

// ── Subcircuit sensors ───────────────────────────────────────────────

/// Per-subcircuit live measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubcircuitMetric {
    Power,
    Current,
    Voltage,
}

impl SubcircuitMetric {
    pub const ALL: [Self; 3] = [Self::Power, Self::Current, Self::Voltage];

    fn project(self, sub: &Subcircuit) -> Option<f64> {
        match self {
            Self::Power => sub.power,
            Self::Current => sub.current,
            Self::Voltage => sub.phase_voltage,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Power => "Power",
            Self::Current => "Current",
            Self::Voltage => "Voltage",
        }
    }
}

/// Sensor for one subcircuit measurement, joined to live data by the
/// subcircuit serial.
pub struct SubcircuitSensor {
    coordinator: Arc<LiveCoordinator>,
    subcircuit_serial: String,
    number: u32,
    metric: SubcircuitMetric,
}

impl SubcircuitSensor {
    pub(crate) fn new(
        coordinator: Arc<LiveCoordinator>,
        subcircuit_serial: &str,
        number: u32,
        metric: SubcircuitMetric,
    ) -> Self {
        Self {
            coordinator,
            subcircuit_serial: subcircuit_serial.to_owned(),
            number,
            metric,
        }
    }

    pub fn metric(&self) -> SubcircuitMetric {
        self.metric
    }

    pub fn subcircuit_serial(&self) -> &str {
        &self.subcircuit_serial
    }

    pub fn device_class(&self) -> SensorClass {
        match self.metric {
            SubcircuitMetric::Power => SensorClass::Power,
            SubcircuitMetric::Current => SensorClass::Current,
            SubcircuitMetric::Voltage => SensorClass::Voltage,
        }
    }

    pub fn state_class(&self) -> StateClass {
        StateClass::Measurement
    }

    pub fn unit(&self) -> Unit {
        match self.metric {
            SubcircuitMetric::Power => Unit::Watt,
            SubcircuitMetric::Current => Unit::Ampere,
            SubcircuitMetric::Voltage => Unit::Volt,
        }
    }

    /// The power sensor carries the label icon; current and voltage use
    /// fixed class icons.
    pub fn icon(&self) -> &'static str {
        match self.metric {
            SubcircuitMetric::Power => self
                .subcircuit()
                .map_or("mdi:flash", |sub| sub.label.icon()),
            SubcircuitMetric::Current => "mdi:current-ac",
            SubcircuitMetric::Voltage => "mdi:sine-wave",
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.subcircuit().and_then(|sub| self.metric.project(&sub))
    }

    fn subcircuit(&self) -> Option<Subcircuit> {
        self.coordinator
            .board()
            .and_then(|board| board.subcircuit(&self.subcircuit_serial).cloned())
    }
}

impl Entity for SubcircuitSensor {
    fn unique_id(&self) -> String {
        let board = self.coordinator.serial();
        let sub = &self.subcircuit_serial;
        match self.metric {
            SubcircuitMetric::Power => format!("basis_power_{board}_{sub}"),
            SubcircuitMetric::Current => format!("basis_current_{board}_{sub}"),
            SubcircuitMetric::Voltage => format!("basis_voltage_{board}_{sub}"),
        }
    }

    fn name(&self) -> String {
        match self.subcircuit() {
            Some(sub) => format!("{} {}", sub.display_label(), self.metric.suffix()),
            None => format!("[{:02}] {}", self.number, self.metric.suffix()),
        }
    }

    fn device_serial(&self) -> &str {
        self.coordinator.serial()
    }

    fn available(&self) -> bool {
        self.coordinator.is_healthy()
    }
}
