// ── Switch entities ──

use std::sync::Arc;

use tracing::debug;

use basislink_api::PanelClient;

use crate::coordinator::LiveCoordinator;
use crate::error::CoreError;
use crate::model::Subcircuit;

use super::Entity;

/// Controls one subcircuit's standby state.
///
/// Turning the circuit on deactivates standby; turning it off activates
/// standby. After the mutation an immediate out-of-band poll
/// resynchronizes the snapshot instead of waiting for the next tick.
pub struct CircuitSwitch {
    api: Arc<PanelClient>,
    coordinator: Arc<LiveCoordinator>,
    subcircuit_serial: String,
    number: u32,
}

impl CircuitSwitch {
    pub(crate) fn new(
        api: Arc<PanelClient>,
        coordinator: Arc<LiveCoordinator>,
        subcircuit_serial: &str,
        number: u32,
    ) -> Self {
        Self {
            api,
            coordinator,
            subcircuit_serial: subcircuit_serial.to_owned(),
            number,
        }
    }

    pub fn subcircuit_serial(&self) -> &str {
        &self.subcircuit_serial
    }

    /// `Some(true)` when the circuit is live, `None` while no snapshot
    /// exists or the subcircuit is absent from it.
    pub fn is_on(&self) -> Option<bool> {
        self.subcircuit().map(|sub| sub.state.is_live())
    }

    pub fn icon(&self) -> &'static str {
        self.subcircuit()
            .map_or("mdi:power-socket", |sub| sub.label.icon())
    }

    /// Turn the circuit on (deactivate standby).
    pub async fn turn_on(&self) -> Result<(), CoreError> {
        self.set_standby(false).await
    }

    /// Turn the circuit off (activate standby).
    pub async fn turn_off(&self) -> Result<(), CoreError> {
        self.set_standby(true).await
    }

    async fn set_standby(&self, standby: bool) -> Result<(), CoreError> {
        self.api
            .set_subcircuit_standby(
                self.coordinator.serial(),
                &self.subcircuit_serial,
                standby,
            )
            .await?;

        // Resynchronize immediately; a failed refresh keeps the previous
        // snapshot and is recovered by the scheduled poll.
        if let Err(e) = self.coordinator.refresh().await {
            debug!(
                serial = %self.coordinator.serial(),
                subcircuit = %self.subcircuit_serial,
                error = %e,
                "post-mutation refresh failed"
            );
        }
        Ok(())
    }

    fn subcircuit(&self) -> Option<Subcircuit> {
        self.coordinator
            .board()
            .and_then(|board| board.subcircuit(&self.subcircuit_serial).cloned())
    }
}

impl Entity for CircuitSwitch {
    fn unique_id(&self) -> String {
        format!(
            "basis_switch_{}_{}",
            self.coordinator.serial(),
            self.subcircuit_serial
        )
    }

    fn name(&self) -> String {
        match self.subcircuit() {
            Some(sub) => sub.display_label(),
            None => format!("[{:02}] Circuit", self.number),
        }
    }

    fn device_serial(&self) -> &str {
        self.coordinator.serial()
    }

    /// Available only while polling succeeds *and* the board reports
    /// itself connected -- commands cannot reach a disconnected board.
    fn available(&self) -> bool {
        if !self.coordinator.is_healthy() {
            return false;
        }
        self.coordinator
            .board()
            .is_some_and(|board| board.connectivity.connected)
    }
}
