// ── Polling coordinators ──
//
// Scheduled fetch-and-publish for each data category. Snapshots are
// published whole through `watch` channels: readers observe either the
// previous snapshot or the complete new one, never a partial update.
// A failed poll retains the last good snapshot and clears the health
// flag; it never clears data.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, NaiveDate};
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use basislink_api::PanelClient;
use basislink_api::types::DiscoveredBoard;

use crate::error::CoreError;
use crate::model::{EnergyTotals, Switchboard};

// ── PollCell ─────────────────────────────────────────────────────────

/// Snapshot cell shared by all coordinators: latest data plus a health
/// flag, both observable through `watch` channels.
pub(crate) struct PollCell<T> {
    data: watch::Sender<Option<Arc<T>>>,
    healthy: watch::Sender<bool>,
}

impl<T> PollCell<T> {
    fn new() -> Self {
        let (data, _) = watch::channel(None);
        let (healthy, _) = watch::channel(false);
        Self { data, healthy }
    }

    /// Publish a complete new snapshot and mark the cell healthy.
    fn publish(&self, value: T) {
        self.data.send_modify(|d| *d = Some(Arc::new(value)));
        self.healthy.send_modify(|h| *h = true);
    }

    /// Record a failed poll: data is retained, health is cleared.
    fn mark_failed(&self) {
        self.healthy.send_modify(|h| *h = false);
    }

    fn snapshot(&self) -> Option<Arc<T>> {
        self.data.borrow().clone()
    }

    fn is_healthy(&self) -> bool {
        *self.healthy.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Arc<T>>> {
        self.data.subscribe()
    }
}

// ── Discovery ────────────────────────────────────────────────────────

/// Periodically lists the switchboards visible to the account and
/// publishes the full list. The known-serial set exists only to log
/// newcomers -- reconciliation recomputes its own sets from registry and
/// poller state.
pub struct DiscoveryCoordinator {
    api: Arc<PanelClient>,
    cell: PollCell<Vec<DiscoveredBoard>>,
    known_serials: Mutex<HashSet<String>>,
}

impl DiscoveryCoordinator {
    pub fn new(api: Arc<PanelClient>) -> Self {
        Self {
            api,
            cell: PollCell::new(),
            known_serials: Mutex::new(HashSet::new()),
        }
    }

    /// Fetch the switchboard list and publish it.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let boards = match self.api.discover_switchboards().await {
            Ok(boards) => boards,
            Err(e) => {
                self.cell.mark_failed();
                return Err(e.into());
            }
        };

        let current: HashSet<String> = boards.iter().map(|b| b.serial.clone()).collect();
        {
            let mut known = self.known_serials.lock().await;
            let newcomers: Vec<&String> = current.difference(&known).collect();
            if !newcomers.is_empty() {
                info!(serials = ?newcomers, "discovered new switchboards");
            }
            *known = current;
        }

        self.cell.publish(boards);
        Ok(())
    }

    /// The most recently published board list.
    pub fn boards(&self) -> Option<Arc<Vec<DiscoveredBoard>>> {
        self.cell.snapshot()
    }

    /// Serial set of the most recently published list.
    pub fn serials(&self) -> HashSet<String> {
        self.cell
            .snapshot()
            .map(|boards| boards.iter().map(|b| b.serial.clone()).collect())
            .unwrap_or_default()
    }

    pub fn is_healthy(&self) -> bool {
        self.cell.is_healthy()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Vec<DiscoveredBoard>>>> {
        self.cell.subscribe()
    }
}

// ── Live state ───────────────────────────────────────────────────────

/// Per-board poller for the full switchboard + subcircuit snapshot.
/// Short interval (~5 s).
pub struct LiveCoordinator {
    api: Arc<PanelClient>,
    serial: String,
    cell: PollCell<Switchboard>,
}

impl LiveCoordinator {
    pub fn new(api: Arc<PanelClient>, serial: impl Into<String>) -> Self {
        Self {
            api,
            serial: serial.into(),
            cell: PollCell::new(),
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Fetch and publish one snapshot.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        match self.api.get_switchboard(&self.serial).await {
            Ok(raw) => {
                self.cell.publish(Switchboard::from(raw));
                Ok(())
            }
            Err(e) => {
                self.cell.mark_failed();
                Err(e.into())
            }
        }
    }

    /// The last successfully published snapshot.
    pub fn board(&self) -> Option<Arc<Switchboard>> {
        self.cell.snapshot()
    }

    pub fn is_healthy(&self) -> bool {
        self.cell.is_healthy()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Switchboard>>> {
        self.cell.subscribe()
    }

    pub(crate) async fn run(self: Arc<Self>, period: Duration, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // first refresh ran synchronously during setup

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(e) = self.refresh().await {
                        warn!(serial = %self.serial, error = %e, "live poll failed");
                    }
                }
            }
        }
    }
}

// ── Energy totals ────────────────────────────────────────────────────

/// Per-board poller for cumulative energy usage (today and this month).
/// Longer interval (~5 min); both windows are recomputed from scratch
/// at every poll, in local time at poll time.
pub struct EnergyCoordinator {
    api: Arc<PanelClient>,
    serial: String,
    cell: PollCell<EnergyTotals>,
}

impl EnergyCoordinator {
    pub fn new(api: Arc<PanelClient>, serial: impl Into<String>) -> Self {
        Self {
            api,
            serial: serial.into(),
            cell: PollCell::new(),
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Fetch both windows and publish the totals.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let now = Local::now();

        let today = self
            .api
            .get_energy_usage(&self.serial, &start_of_today(now))
            .await;
        let today = match today {
            Ok(usage) => usage,
            Err(e) => {
                self.cell.mark_failed();
                return Err(e.into());
            }
        };

        let month = self
            .api
            .get_energy_usage(&self.serial, &start_of_month(now))
            .await;
        let month = match month {
            Ok(usage) => usage,
            Err(e) => {
                self.cell.mark_failed();
                return Err(e.into());
            }
        };

        self.cell.publish(EnergyTotals {
            today: today.into(),
            month: month.into(),
        });
        Ok(())
    }

    /// The last successfully published totals.
    pub fn totals(&self) -> Option<Arc<EnergyTotals>> {
        self.cell.snapshot()
    }

    pub fn is_healthy(&self) -> bool {
        self.cell.is_healthy()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<EnergyTotals>>> {
        self.cell.subscribe()
    }

    pub(crate) async fn run(self: Arc<Self>, period: Duration, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // first refresh ran synchronously during setup

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(e) = self.refresh().await {
                        warn!(serial = %self.serial, error = %e, "energy poll failed");
                    }
                }
            }
        }
    }
}

// ── Window boundaries ────────────────────────────────────────────────

/// Local midnight of the current day. Falls back to `now` on the
/// degenerate DST cases where midnight does not exist locally.
fn start_of_today(now: DateTime<Local>) -> DateTime<Local> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .unwrap_or(now)
}

/// Local midnight of the first of the current month.
fn start_of_month(now: DateTime<Local>) -> DateTime<Local> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn poll_cell_retains_data_on_failure() {
        let cell: PollCell<u32> = PollCell::new();
        assert!(cell.snapshot().is_none());
        assert!(!cell.is_healthy());

        cell.publish(7);
        assert_eq!(*cell.snapshot().unwrap(), 7);
        assert!(cell.is_healthy());

        cell.mark_failed();
        assert_eq!(*cell.snapshot().unwrap(), 7);
        assert!(!cell.is_healthy());
    }

    #[test]
    fn poll_cell_publish_restores_health() {
        let cell: PollCell<u32> = PollCell::new();
        cell.publish(1);
        cell.mark_failed();
        cell.publish(2);
        assert_eq!(*cell.snapshot().unwrap(), 2);
        assert!(cell.is_healthy());
    }

    #[test]
    fn start_of_today_is_local_midnight() {
        let start = start_of_today(Local::now());
        assert_eq!(start.hour(), 0);
        assert_eq!(start.minute(), 0);
        assert_eq!(start.second(), 0);
    }

    #[test]
    fn start_of_month_is_first_day_midnight() {
        let now = Local::now();
        let start = start_of_month(now);
        assert_eq!(start.day(), 1);
        assert_eq!(start.month(), now.month());
        assert_eq!(start.hour(), 0);
    }
}
