// Coordinator behavior against a mock GraphQL endpoint: atomic snapshot
// publication, last-known-good retention on failure, and the entity
// projections layered on top.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use basislink_api::{PanelClient, StaticToken, TokenProvider};
use basislink_core::coordinator::{DiscoveryCoordinator, EnergyCoordinator, LiveCoordinator};
use basislink_core::entity::{Entity, build_entities};
use basislink_core::{CircuitState, CoreError};

// ── Helpers ─────────────────────────────────────────────────────────

fn make_client(server: &MockServer) -> Arc<PanelClient> {
    let auth: Arc<dyn TokenProvider> = Arc::new(StaticToken::new("test-token"));
    Arc::new(PanelClient::from_reqwest(&server.uri(), reqwest::Client::new(), auth).unwrap())
}

fn graphql_ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

fn board_json(serial: &str, hwc_state: &str) -> serde_json::Value {
    json!({
        "switchboard": {
            "serial": serial,
            "model": "GEN2",
            "version": "1.4.2",
            "connectivity": { "connected": true },
            "liveState": {
                "power": 1500.0,
                "powerUsage": { "importPower": 1600.0, "exportPower": 100.0 },
                "primaryCurrent": 6.5
            },
            "subcircuits": [
                {
                    "serial": format!("{serial}-SC1"),
                    "number": 1,
                    "config": { "label": "hwc", "standbyLocked": false, "version": "7" },
                    "liveState": { "state": hwc_state, "power": 800.0, "primaryCurrent": 3.3, "phaseVoltage": 239.8 }
                },
                {
                    "serial": format!("{serial}-SC2"),
                    "number": 2,
                    "config": { "label": "spare", "standbyLocked": false, "version": "7" },
                    "liveState": { "state": "STANDBY", "power": 0.0 }
                },
                {
                    "serial": format!("{serial}-SC3"),
                    "number": 3,
                    "config": { "label": "lights", "standbyLocked": true, "version": "7" },
                    "liveState": { "state": "LIVE", "power": 120.0 }
                }
            ]
        }
    })
}

async fn mount_board(server: &MockServer, serial: &str, hwc_state: &str) {
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("GetSwitchboardData"))
        .and(body_string_contains(serial))
        .respond_with(graphql_ok(board_json(serial, hwc_state)))
        .mount(server)
        .await;
}

async fn mount_energy(server: &MockServer, serial: &str, import: f64, export: f64) {
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("GetSwitchboardEnergyUsage"))
        .and(body_string_contains(serial))
        .respond_with(graphql_ok(json!({
            "switchboard": {
                "totalSwitchboardEnergyUsage": { "importKwh": import, "exportKwh": export }
            }
        })))
        .mount(server)
        .await;
}

// ── Discovery coordinator ───────────────────────────────────────────

#[tokio::test]
async fn discovery_publishes_full_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(graphql_ok(json!({
            "sites": {
                "sites": [{
                    "id": "site-1",
                    "switchboards": [
                        { "serial": "SB-A", "connectivity": { "connected": true } },
                        { "serial": "SB-B", "connectivity": { "connected": false } },
                    ]
                }]
            }
        })))
        .mount(&server)
        .await;

    let discovery = DiscoveryCoordinator::new(make_client(&server));
    assert!(discovery.boards().is_none());

    discovery.refresh().await.unwrap();

    let boards = discovery.boards().unwrap();
    assert_eq!(boards.len(), 2);
    assert!(discovery.is_healthy());
    assert!(discovery.serials().contains("SB-A"));
    assert!(discovery.serials().contains("SB-B"));
}

#[tokio::test]
async fn discovery_failure_retains_previous_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(graphql_ok(json!({
            "sites": { "sites": [{ "id": "s", "switchboards": [{ "serial": "SB-A" }] }] }
        })))
        .mount(&server)
        .await;

    let discovery = DiscoveryCoordinator::new(make_client(&server));
    discovery.refresh().await.unwrap();

    server.reset().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = discovery.refresh().await;
    assert!(result.is_err());
    // Last-known-good list survives; only the health flag flips.
    assert_eq!(discovery.serials().len(), 1);
    assert!(!discovery.is_healthy());
}

// ── Live coordinator ────────────────────────────────────────────────

#[tokio::test]
async fn live_refresh_publishes_snapshot() {
    let server = MockServer::start().await;
    mount_board(&server, "SB-A", "LIVE").await;

    let live = LiveCoordinator::new(make_client(&server), "SB-A");
    assert!(live.board().is_none());
    assert!(!live.is_healthy());

    live.refresh().await.unwrap();

    let board = live.board().unwrap();
    assert_eq!(board.serial, "SB-A");
    assert_eq!(board.power, Some(1500.0));
    assert_eq!(board.subcircuits.len(), 3);
    assert_eq!(board.subcircuit("SB-A-SC1").unwrap().state, CircuitState::Live);
    assert!(live.is_healthy());
}

#[tokio::test]
async fn live_failure_after_success_retains_snapshot() {
    let server = MockServer::start().await;
    mount_board(&server, "SB-A", "LIVE").await;

    let live = LiveCoordinator::new(make_client(&server), "SB-A");
    live.refresh().await.unwrap();
    live.refresh().await.unwrap();
    live.refresh().await.unwrap();

    server.reset().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = live.refresh().await;
    assert!(result.is_err());

    // The previous snapshot is still readable; only availability drops.
    let board = live.board().unwrap();
    assert_eq!(board.power, Some(1500.0));
    assert!(!live.is_healthy());
}

#[tokio::test]
async fn live_first_refresh_failure_leaves_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let live = LiveCoordinator::new(make_client(&server), "SB-A");
    assert!(live.refresh().await.is_err());
    assert!(live.board().is_none());
    assert!(!live.is_healthy());
}

// ── Energy coordinator ──────────────────────────────────────────────

#[tokio::test]
async fn energy_refresh_queries_both_windows() {
    let server = MockServer::start().await;
    mount_energy(&server, "SB-A", 12.5, 3.25).await;

    let energy = EnergyCoordinator::new(make_client(&server), "SB-A");
    energy.refresh().await.unwrap();

    let totals = energy.totals().unwrap();
    assert_eq!(totals.today.import_kwh, Some(12.5));
    assert_eq!(totals.today.export_kwh, Some(3.25));
    assert_eq!(totals.month.import_kwh, Some(12.5));

    // One range query per window.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    // A later poll over the same windows with unchanged remote data
    // returns identical totals.
    energy.refresh().await.unwrap();
    assert_eq!(*energy.totals().unwrap(), *totals);
}

#[tokio::test]
async fn energy_failure_retains_previous_totals() {
    let server = MockServer::start().await;
    mount_energy(&server, "SB-A", 12.5, 3.25).await;

    let energy = EnergyCoordinator::new(make_client(&server), "SB-A");
    energy.refresh().await.unwrap();

    server.reset().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = energy.refresh().await;
    assert!(matches!(result, Err(CoreError::Api { .. })));
    assert_eq!(energy.totals().unwrap().today.import_kwh, Some(12.5));
    assert!(!energy.is_healthy());
}

// ── Entity projections ──────────────────────────────────────────────

#[tokio::test]
async fn entities_project_current_snapshot_values() {
    let server = MockServer::start().await;
    mount_board(&server, "SB-A", "LIVE").await;
    mount_energy(&server, "SB-A", 12.5, 3.25).await;

    let api = make_client(&server);
    let live = Arc::new(LiveCoordinator::new(Arc::clone(&api), "SB-A"));
    let energy = Arc::new(EnergyCoordinator::new(Arc::clone(&api), "SB-A"));
    live.refresh().await.unwrap();
    energy.refresh().await.unwrap();

    let entities = build_entities(&api, [(&live, &energy)]);

    // 4 board + 4 energy + 6 subcircuit (two non-spare circuits) +
    // 1 connectivity + 1 switch (hwc only: spare and locked excluded).
    assert_eq!(entities.board_sensors.len(), 4);
    assert_eq!(entities.energy_sensors.len(), 4);
    assert_eq!(entities.subcircuit_sensors.len(), 6);
    assert_eq!(entities.connectivity_sensors.len(), 1);
    assert_eq!(entities.switches.len(), 1);
    assert_eq!(entities.len(), 16);

    let power = &entities.board_sensors[0];
    assert_eq!(power.value(), Some(1500.0));
    assert_eq!(power.unique_id(), "basis_power_panel_SB-A");
    assert!(power.available());

    let today_import = &entities.energy_sensors[0];
    assert_eq!(today_import.value(), Some(12.5));

    let hwc_power = &entities.subcircuit_sensors[0];
    assert_eq!(hwc_power.value(), Some(800.0));
    assert_eq!(hwc_power.name(), "[01] Hot Water Cylinder Power");
    assert_eq!(hwc_power.icon(), "mdi:water-boiler");

    let switch = &entities.switches[0];
    assert_eq!(switch.subcircuit_serial(), "SB-A-SC1");
    assert_eq!(switch.is_on(), Some(true));
    assert!(switch.available());

    let connectivity = &entities.connectivity_sensors[0];
    assert_eq!(connectivity.is_on(), Some(true));
}

#[tokio::test]
async fn spare_circuits_never_yield_entities() {
    let server = MockServer::start().await;
    mount_board(&server, "SB-A", "LIVE").await;
    mount_energy(&server, "SB-A", 0.0, 0.0).await;

    let api = make_client(&server);
    let live = Arc::new(LiveCoordinator::new(Arc::clone(&api), "SB-A"));
    let energy = Arc::new(EnergyCoordinator::new(Arc::clone(&api), "SB-A"));
    live.refresh().await.unwrap();
    energy.refresh().await.unwrap();

    let entities = build_entities(&api, [(&live, &energy)]);

    // The spare circuit (SC2) is excluded from everything, regardless of
    // its live state; the locked circuit (SC3) gets sensors but no switch.
    assert!(
        entities
            .subcircuit_sensors
            .iter()
            .all(|s| !s.subcircuit_serial().ends_with("SC2"))
    );
    assert!(
        entities
            .switches
            .iter()
            .all(|s| s.subcircuit_serial() == "SB-A-SC1")
    );
}

#[tokio::test]
async fn entity_availability_follows_poll_health() {
    let server = MockServer::start().await;
    mount_board(&server, "SB-A", "LIVE").await;
    mount_energy(&server, "SB-A", 1.0, 0.0).await;

    let api = make_client(&server);
    let live = Arc::new(LiveCoordinator::new(Arc::clone(&api), "SB-A"));
    let energy = Arc::new(EnergyCoordinator::new(Arc::clone(&api), "SB-A"));
    live.refresh().await.unwrap();
    energy.refresh().await.unwrap();

    let entities = build_entities(&api, [(&live, &energy)]);

    server.reset().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let _ = live.refresh().await;

    // Values still come from the retained snapshot; availability is off.
    let power = &entities.board_sensors[0];
    assert_eq!(power.value(), Some(1500.0));
    assert!(!power.available());
    assert!(!entities.switches[0].available());
}
