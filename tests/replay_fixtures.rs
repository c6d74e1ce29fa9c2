use std::time::Duration;

use rwlc::command::Dialect;
use rwlc::config::PollerConfig;
use rwlc::controller::Controller;
use rwlc::dispatch::poll_access_points;
use rwlc::error::WlcError;
use rwlc::models::{AccessPoint, ApState};
use rwlc::pool::ConnectionPool;
use rwlc::session::{ReplayLog, ReplaySession};

const CONTROLLER_FIXTURE: &str = include_str!("fixtures/controller_replay.jsonl");

fn replay_controller(index: usize) -> Controller<ReplaySession> {
    let session = ReplaySession::from_jsonl(&format!("wlc-{index}"), CONTROLLER_FIXTURE)
        .expect("load fixture")
        .with_latency(Duration::from_millis(5));
    Controller::new(session, Dialect::Aos8)
}

fn config(pool_size: usize) -> PollerConfig {
    PollerConfig {
        pool_size,
        connect_timeout_secs: 1,
        ..PollerConfig::default()
    }
}

#[tokio::test]
async fn inventory_then_poll_round_over_replayed_controller() {
    let pool = ConnectionPool::connect(&config(2), replay_controller)
        .await
        .expect("pool");

    let aps = {
        let mut lease = pool.acquire().await.expect("lease");
        lease.ap_database().await.expect("ap database")
    };
    assert_eq!(aps.len(), 3);
    assert_eq!(aps[2].status, ApState::Down);

    let report = poll_access_points(&pool, &aps).await;
    assert_eq!(report.len(), 3);

    let lobby = report.find("ap105-lobby").expect("ap105-lobby");
    assert_eq!(lobby.mac_addr, "ac:a3:1e:c1:22:10");
    assert_eq!(lobby.interface.status, "up");
    assert_eq!(lobby.interface.link_summary(), "1 Gb/s-FULL");
    assert_eq!(lobby.interface.tx_bytes, 1_834_467_120);
    let neighbor = lobby.neighbor.as_ref().expect("lobby neighbor");
    assert_eq!(neighbor.remote_switch, "idf2-sw01");
    assert_eq!(neighbor.remote_port, "Gi1/0/14");

    let hall = report.find("ap106-hall").expect("ap106-hall");
    assert_eq!(hall.interface.speed, "100 Mb/s");
    assert_eq!(hall.interface.duplex, "half");
    assert_eq!(hall.interface.rx_bytes, 40962);
    assert_eq!(
        hall.neighbor.as_ref().map(|n| n.remote_port.as_str()),
        Some("Gi1/0/15")
    );

    let lab = report.find("ap212-lab").expect("ap212-lab");
    assert!(lab.interface.is_empty());
    assert_eq!(lab.neighbor, None);

    pool.shutdown().await;
}

#[tokio::test]
async fn pool_never_exceeds_its_size_and_frees_every_session() {
    let pool = ConnectionPool::connect(&config(2), replay_controller)
        .await
        .expect("pool");
    let template = AccessPoint {
        name: "ap105-lobby".to_string(),
        mac_addr: "ac:a3:1e:c1:22:10".to_string(),
        ..AccessPoint::default()
    };
    let aps = vec![template; 9];

    let report = poll_access_points(&pool, &aps).await;

    assert_eq!(report.len(), 9);
    let stats = pool.stats();
    assert!(stats.peak_busy >= 1 && stats.peak_busy <= 2, "{stats:?}");
    assert_eq!(stats.busy, 0);
    assert_eq!(stats.idle, 2);
}

#[tokio::test]
async fn lease_fallback_to_ap_name_without_wired_mac() {
    let session = ReplaySession::new("wlc-0")
        .with_output(
            "show ap port status ap-name ap301-annex",
            "AP with name ap301-annex not found.\n",
        )
        .with_output("show ap lldp neighbors ap-name ap301-annex", "AP is down\n");
    let log = session.log();
    let mut sessions = Some(session);
    let pool = ConnectionPool::connect(&config(1), |_| {
        Controller::new(sessions.take().expect("one session"), Dialect::Aos6)
    })
    .await
    .expect("pool");

    let ap = AccessPoint {
        name: "ap301-annex".to_string(),
        ..AccessPoint::default()
    };
    let report = poll_access_points(&pool, &[ap]).await;

    assert_eq!(report.len(), 1);
    assert!(report.statuses[0].interface.is_empty());
    assert_eq!(
        log.commands().expect("log"),
        vec![
            "show ap port status ap-name ap301-annex".to_string(),
            "show ap lldp neighbors ap-name ap301-annex".to_string(),
        ]
    );
}

#[tokio::test]
async fn shutdown_closes_every_replayed_session_once() {
    let mut logs: Vec<ReplayLog> = Vec::new();
    let pool = ConnectionPool::connect(&config(3), |i| {
        let controller = replay_controller(i);
        logs.push(controller.session().log());
        controller
    })
    .await
    .expect("pool");

    let aps = pool
        .acquire()
        .await
        .expect("lease")
        .ap_database()
        .await
        .expect("ap database");
    poll_access_points(&pool, &aps).await;
    pool.shutdown().await;

    for log in &logs {
        assert_eq!(log.connects().expect("connects"), 1);
        assert_eq!(log.disconnects().expect("disconnects"), 1);
    }
    assert!(matches!(pool.acquire().await, Err(WlcError::PoolClosed)));
}

#[test]
fn fixture_entries_parse() {
    let session = ReplaySession::from_jsonl("wlc-0", CONTROLLER_FIXTURE);
    assert!(session.is_ok());
}
