// ── Binary sensor entities ──

use std::sync::Arc;

use crate::coordinator::LiveCoordinator;

use super::Entity;

/// Cloud-connectivity status of a switchboard.
///
/// Stays available while polling succeeds even when the board itself is
/// disconnected -- reporting the disconnected state is its job.
pub struct ConnectivitySensor {
    coordinator: Arc<LiveCoordinator>,
}

impl ConnectivitySensor {
    pub(crate) fn new(coordinator: Arc<LiveCoordinator>) -> Self {
        Self { coordinator }
    }

    /// `Some(true)` when the board is connected, `None` while no
    /// snapshot exists.
    pub fn is_on(&self) -> Option<bool> {
        self.coordinator
            .board()
            .map(|board| board.connectivity.connected)
    }

    /// Extra state attributes: last-seen timestamp and disconnect reason,
    /// when present.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let Some(board) = self.coordinator.board() else {
            return Vec::new();
        };

        let mut attrs = Vec::new();
        if let Some(last_update) = board.connectivity.last_update {
            attrs.push(("last_seen", last_update.to_rfc3339()));
        }
        if let Some(ref reason) = board.connectivity.disconnect_reason {
            attrs.push(("disconnect_reason", reason.clone()));
        }
        attrs
    }
}

impl Entity for ConnectivitySensor {
    fn unique_id(&self) -> String {
        format!("basis_connectivity_{}", self.coordinator.serial())
    }

    fn name(&self) -> String {
        "Connectivity".to_owned()
    }

    fn device_serial(&self) -> &str {
        self.coordinator.serial()
    }

    fn available(&self) -> bool {
        self.coordinator.is_healthy()
    }
}
