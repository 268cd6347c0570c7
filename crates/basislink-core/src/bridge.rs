// ── Bridge lifecycle and reconciliation ──
//
// Full lifecycle management for one bridge instance: discovery,
// reconciliation of boards against registered devices and live pollers,
// per-board poll tasks, and the published entity set.
//
// Reconciliation is deliberately stop-the-world: on any change the whole
// entity set is torn down and rebuilt, so consumers never observe a
// half-migrated state (a device with entities for a poller that no
// longer exists, or vice versa).

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use basislink_api::{PanelClient, TokenProvider, TransportConfig};

use crate::config::BridgeConfig;
use crate::coordinator::{DiscoveryCoordinator, EnergyCoordinator, LiveCoordinator};
use crate::entity::{PanelEntities, build_entities};
use crate::error::CoreError;
use crate::model::Switchboard;
use crate::registry::{DeviceRecord, DeviceRegistry};

// ── ReconcilePlan ────────────────────────────────────────────────────

/// The set diff driving one reconciliation pass.
///
/// Sorted sets so teardown and setup run in a deterministic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Discovered by the API but backed by no poller yet.
    pub added: BTreeSet<String>,
    /// Present as a device record but no longer reported by the API.
    pub removed: BTreeSet<String>,
}

impl ReconcilePlan {
    /// `removed = registered − discovered`, `added = discovered − pollers`.
    pub fn compute(
        discovered: &HashSet<String>,
        registered: &HashSet<String>,
        pollers: &HashSet<String>,
    ) -> Self {
        Self {
            added: discovered.difference(pollers).cloned().collect(),
            removed: registered.difference(discovered).cloned().collect(),
        }
    }

    /// Nothing to do -- skip the teardown/rebuild entirely.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

// ── PanelBridge ──────────────────────────────────────────────────────

/// Both pollers for one board plus their cancellation scope.
struct BoardHandles {
    live: Arc<LiveCoordinator>,
    energy: Arc<EnergyCoordinator>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// The main entry point: one instance per configured account.
///
/// Cheaply cloneable via `Arc`. Owns the API client, the discovery
/// loop, per-board pollers, the device registry, and the published
/// entity set.
#[derive(Clone)]
pub struct PanelBridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    config: BridgeConfig,
    api: Arc<PanelClient>,
    registry: DeviceRegistry,
    discovery: DiscoveryCoordinator,
    /// Serial → poller pair. Held for the whole reconcile sequence.
    boards: Mutex<HashMap<String, BoardHandles>>,
    entities: watch::Sender<Arc<PanelEntities>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl PanelBridge {
    /// Create a bridge from configuration and a token provider.
    /// Does NOT poll -- call [`start()`](Self::start).
    pub fn new(config: BridgeConfig, auth: Arc<dyn TokenProvider>) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config.tls.clone(),
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let api = Arc::new(PanelClient::new(config.api_url.as_str(), auth, &transport)?);
        Ok(Self::from_client(config, api))
    }

    /// Create a bridge around an existing client (tests, custom transports).
    pub fn from_client(config: BridgeConfig, api: Arc<PanelClient>) -> Self {
        let (entities, _) = watch::channel(Arc::new(PanelEntities::default()));
        Self {
            inner: Arc::new(BridgeInner {
                config,
                discovery: DiscoveryCoordinator::new(Arc::clone(&api)),
                api,
                registry: DeviceRegistry::new(),
                boards: Mutex::new(HashMap::new()),
                entities,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// First discovery refresh, initial reconciliation, and background
    /// task spawn. First-refresh-or-fail: any failure here aborts
    /// startup.
    pub async fn start(&self) -> Result<(), CoreError> {
        self.resync().await?;

        let bridge = self.clone();
        let cancel = self.inner.cancel.clone();
        let period = self.inner.config.discovery_interval;
        self.inner
            .task_handles
            .lock()
            .await
            .push(tokio::spawn(discovery_task(bridge, period, cancel)));

        info!(boards = self.inner.registry.len(), "bridge started");
        Ok(())
    }

    /// Stop all background tasks and clear the published entity set.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        for handle in self.inner.task_handles.lock().await.drain(..) {
            let _ = handle.await;
        }

        let mut boards = self.inner.boards.lock().await;
        for (_, handles) in boards.drain() {
            handles.cancel.cancel();
            for task in handles.tasks {
                let _ = task.await;
            }
        }

        self.inner
            .entities
            .send_modify(|e| *e = Arc::new(PanelEntities::default()));
        debug!("bridge shut down");
    }

    /// Refresh discovery and reconcile against it.
    ///
    /// This is the scheduled path and also serves as an on-demand resync
    /// for hosts that want to trigger one out of band.
    pub async fn resync(&self) -> Result<(), CoreError> {
        self.inner.discovery.refresh().await?;
        self.reconcile().await
    }

    // ── Reconciliation (the core) ────────────────────────────────────

    /// Align pollers and device records with the discovered board set.
    ///
    /// Runs as one uninterrupted sequence under the board-map lock:
    /// teardown, setup (with synchronous first refreshes), device
    /// re-registration, entity rebuild. A no-op diff returns before any
    /// teardown happens.
    async fn reconcile(&self) -> Result<(), CoreError> {
        let mut boards = self.inner.boards.lock().await;

        let discovered = self.inner.discovery.serials();
        let registered = self.inner.registry.serials();
        let pollers: HashSet<String> = boards.keys().cloned().collect();

        let plan = ReconcilePlan::compute(&discovered, &registered, &pollers);
        if plan.is_noop() {
            debug!(boards = pollers.len(), "reconcile: nothing to do");
            return Ok(());
        }

        info!(added = ?plan.added, removed = ?plan.removed, "reconciling switchboards");

        // Full stop: the entity set is not designed for fine-grained
        // patching, so tear it all down before touching board state.
        self.inner
            .entities
            .send_modify(|e| *e = Arc::new(PanelEntities::default()));

        for serial in &plan.removed {
            if let Some(handles) = boards.remove(serial) {
                handles.cancel.cancel();
                for task in handles.tasks {
                    let _ = task.await;
                }
                info!(serial = %serial, "discarded pollers");
            }
            // Logs a warning internally when the record is already gone.
            self.inner.registry.remove(serial);
        }

        let mut setup_failure: Option<CoreError> = None;
        for serial in &plan.added {
            match self.setup_board(serial).await {
                Ok(handles) => {
                    boards.insert(serial.clone(), handles);
                }
                Err(e) => {
                    warn!(serial = %serial, error = %e, "switchboard setup failed");
                    if setup_failure.is_none() {
                        setup_failure = Some(CoreError::BoardSetupFailed {
                            serial: serial.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        // Re-register the full current set (idempotent upsert by serial)
        // from each board's just-fetched live snapshot.
        for (serial, handles) in boards.iter() {
            if let Some(board) = handles.live.board() {
                let hw_version = board
                    .subcircuits
                    .first()
                    .and_then(|sub| sub.config_version.as_deref());
                self.inner.registry.upsert(DeviceRecord::new(
                    serial,
                    board.model.as_deref(),
                    board.firmware_version.as_deref(),
                    hw_version,
                ));
            }
        }

        // Rebuild every entity from scratch and publish atomically.
        let entities = build_entities(
            &self.inner.api,
            boards.values().map(|h| (&h.live, &h.energy)),
        );
        info!(entities = entities.len(), "rebuilt entity set");
        self.inner.entities.send_modify(|e| *e = Arc::new(entities));

        match setup_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Create both pollers for a board, run their first refresh
    /// synchronously, then spawn the poll loops.
    ///
    /// The synchronous first refresh gives the ordering guarantee that
    /// reconciliation completes before any scheduled tick publishes into
    /// a freshly-created poller -- and surfaces a dead board as a setup
    /// failure instead of silently skipping it.
    async fn setup_board(&self, serial: &str) -> Result<BoardHandles, CoreError> {
        debug!(serial, "setting up switchboard");

        let live = Arc::new(LiveCoordinator::new(Arc::clone(&self.inner.api), serial));
        live.refresh().await?;

        let energy = Arc::new(EnergyCoordinator::new(Arc::clone(&self.inner.api), serial));
        energy.refresh().await?;

        let cancel = self.inner.cancel.child_token();
        let tasks = vec![
            tokio::spawn(Arc::clone(&live).run(self.inner.config.live_interval, cancel.clone())),
            tokio::spawn(
                Arc::clone(&energy).run(self.inner.config.energy_interval, cancel.clone()),
            ),
        ];

        Ok(BoardHandles {
            live,
            energy,
            cancel,
            tasks,
        })
    }

    // ── State observation ────────────────────────────────────────────

    /// The currently published entity set.
    pub fn entities(&self) -> Arc<PanelEntities> {
        self.inner.entities.borrow().clone()
    }

    /// Subscribe to entity set changes.
    pub fn subscribe_entities(&self) -> watch::Receiver<Arc<PanelEntities>> {
        self.inner.entities.subscribe()
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.inner.registry
    }

    pub fn discovery(&self) -> &DiscoveryCoordinator {
        &self.inner.discovery
    }

    pub fn api(&self) -> &Arc<PanelClient> {
        &self.inner.api
    }

    /// Serials currently backed by live pollers.
    pub async fn poller_serials(&self) -> HashSet<String> {
        self.inner.boards.lock().await.keys().cloned().collect()
    }

    /// Latest live snapshot for one board, if its poller exists and has
    /// published data.
    pub async fn board_snapshot(&self, serial: &str) -> Option<Arc<Switchboard>> {
        self.inner
            .boards
            .lock()
            .await
            .get(serial)
            .and_then(|handles| handles.live.board())
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodic discovery + reconcile. A failed pass keeps last-known state
/// and is retried on the next tick; reconciliation re-running is also
/// what retries boards whose setup previously failed.
async fn discovery_task(bridge: PanelBridge, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = bridge.resync().await {
                    warn!(error = %e, "scheduled resync failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(serials: &[&str]) -> HashSet<String> {
        serials.iter().map(|s| (*s).to_owned()).collect()
    }

    fn sorted(serials: &[&str]) -> BTreeSet<String> {
        serials.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn plan_is_noop_when_all_sets_agree() {
        let plan = ReconcilePlan::compute(&set(&["A", "B"]), &set(&["A", "B"]), &set(&["A", "B"]));
        assert!(plan.is_noop());
    }

    #[test]
    fn plan_adds_board_without_poller() {
        // Discovery reports {A, B}; registry has {A}; pollers exist for {A}.
        let plan = ReconcilePlan::compute(&set(&["A", "B"]), &set(&["A"]), &set(&["A"]));
        assert_eq!(plan.added, sorted(&["B"]));
        assert!(plan.removed.is_empty());
    }

    #[test]
    fn plan_removes_board_no_longer_discovered() {
        // Discovery reports {A}; registry has {A, B}; pollers for {A, B}.
        let plan = ReconcilePlan::compute(&set(&["A"]), &set(&["A", "B"]), &set(&["A", "B"]));
        assert!(plan.added.is_empty());
        assert_eq!(plan.removed, sorted(&["B"]));
    }

    #[test]
    fn plan_readds_board_whose_setup_failed() {
        // A previous pass failed to set up B: it is discovered and may
        // even be registered, but has no poller -- it must be re-added.
        let plan = ReconcilePlan::compute(&set(&["A", "B"]), &set(&["A"]), &set(&["A"]));
        assert_eq!(plan.added, sorted(&["B"]));
    }

    #[test]
    fn plan_handles_simultaneous_add_and_remove() {
        let plan = ReconcilePlan::compute(&set(&["B"]), &set(&["A"]), &set(&["A"]));
        assert_eq!(plan.added, sorted(&["B"]));
        assert_eq!(plan.removed, sorted(&["A"]));
    }

    #[test]
    fn plan_empty_discovery_removes_everything() {
        let plan = ReconcilePlan::compute(&set(&[]), &set(&["A", "B"]), &set(&["A", "B"]));
        assert!(plan.added.is_empty());
        assert_eq!(plan.removed, sorted(&["A", "B"]));
    }
}
