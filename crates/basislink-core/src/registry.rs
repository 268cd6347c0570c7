// ── Device registry ──
//
// In-memory registry of device records for one bridge instance, keyed
// by switchboard serial. Upserts are idempotent; removal of an unknown
// serial is an anomaly that is logged, never raised.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Manufacturer attached to every registered device.
pub const BRAND: &str = "Basis NZ Ltd.";

/// Model used when the API reports no model, or reports it as unknown.
pub const DEFAULT_MODEL: &str = "GEN1";

/// One registered switchboard device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub serial: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub sw_version: Option<String>,
    pub hw_version: Option<String>,
}

impl DeviceRecord {
    /// Build a record from the board's current live snapshot fields.
    ///
    /// `hw_version` carries the subcircuit config version, matching how
    /// the board reports its hardware revision.
    pub fn new(
        serial: impl Into<String>,
        model: Option<&str>,
        sw_version: Option<&str>,
        hw_version: Option<&str>,
    ) -> Self {
        let serial = serial.into();
        let model = match model {
            Some("unknown") | None => DEFAULT_MODEL,
            Some(other) => other,
        };
        Self {
            name: format!("Basis Panel {serial}"),
            serial,
            manufacturer: BRAND.to_owned(),
            model: model.to_owned(),
            sw_version: sw_version.map(str::to_owned),
            hw_version: hw_version.map(str::to_owned),
        }
    }
}

/// Registry of device records for one bridge instance.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: DashMap<String, Arc<DeviceRecord>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for its serial. Idempotent.
    pub fn upsert(&self, record: DeviceRecord) -> Arc<DeviceRecord> {
        let record = Arc::new(record);
        self.devices
            .insert(record.serial.clone(), Arc::clone(&record));
        debug!(serial = %record.serial, model = %record.model, "registered device");
        record
    }

    /// Remove the record for a serial.
    ///
    /// A missing record means registry and poller state already agree --
    /// logged as an anomaly, treated as consistent.
    pub fn remove(&self, serial: &str) -> Option<Arc<DeviceRecord>> {
        match self.devices.remove(serial) {
            Some((_, record)) => {
                debug!(serial, "removed device");
                Some(record)
            }
            None => {
                warn!(serial, "no device record found during removal");
                None
            }
        }
    }

    pub fn get(&self, serial: &str) -> Option<Arc<DeviceRecord>> {
        self.devices.get(serial).map(|r| Arc::clone(r.value()))
    }

    /// All currently registered serials.
    pub fn serials(&self) -> HashSet<String> {
        self.devices.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
