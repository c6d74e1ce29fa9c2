use rwlc::command::Dialect;
use rwlc::extract;
use rwlc::models::{ApState, InterfaceStats, UNKNOWN_DEVICE_TYPE, WirelessClient};

const AP_DATABASE_AOS8: &str = include_str!("fixtures/ap_database_aos8.txt");
const AP_DATABASE_AOS6: &str = include_str!("fixtures/ap_database_aos6.txt");
const PORT_STATUS: &str = include_str!("fixtures/port_status.txt");
const PORT_STATUS_NOT_FOUND: &str = include_str!("fixtures/port_status_not_found.txt");
const LLDP_NEIGHBORS: &str = include_str!("fixtures/lldp_neighbors.txt");
const USER_TABLE: &str = include_str!("fixtures/user_table.txt");
const CLIENT_ASSOCIATION: &str = include_str!("fixtures/client_association.txt");
const LICENSE: &str = include_str!("fixtures/license.txt");
const ESSID_CONFIG: &str = include_str!("fixtures/essid_config.txt");

#[test]
fn aos8_database_rows_keep_leading_columns() {
    let aps = extract::ap_database(AP_DATABASE_AOS8, Dialect::Aos8);
    let names: Vec<&str> = aps.iter().map(|ap| ap.name.as_str()).collect();
    assert_eq!(names, vec!["ap105-lobby", "ap106-hall", "ap212-lab"]);

    let hall = &aps[1];
    assert_eq!(hall.group, "default");
    assert_eq!(hall.model, "325");
    assert_eq!(hall.ip_addr, "10.1.20.12");
    assert_eq!(hall.status, ApState::Up);
    assert_eq!(hall.primary_controller, "10.1.1.5");
    assert_eq!(hall.standby_controller, "10.1.1.6");
    assert_eq!(hall.mac_addr, "ac:a3:1e:c1:22:11");
    assert_eq!(hall.serial, "CNF7J0T124");

    assert_eq!(aps[2].group, "lab");
    assert_eq!(aps[2].status, ApState::Down);
}

#[test]
fn aos6_database_uses_positional_columns() {
    let aps = extract::ap_database(AP_DATABASE_AOS6, Dialect::Aos6);
    assert_eq!(aps.len(), 2);

    assert_eq!(aps[0].status, ApState::Up);
    assert_eq!(aps[0].primary_controller, "10.2.0.2");
    assert_eq!(aps[0].standby_controller, "0.0.0.0");
    assert_eq!(aps[0].mac_addr, "00:0b:86:aa:01:01");
    assert_eq!(aps[0].serial, "BT0012345");

    assert_eq!(aps[1].status, ApState::Down);
    assert_eq!(aps[1].mac_addr, "00:0b:86:aa:01:02");
    assert_eq!(aps[1].serial, "BT0012346");
}

#[test]
fn database_without_ap_rows_is_empty() {
    let headers_only: String = AP_DATABASE_AOS8
        .lines()
        .filter(|line| !line.starts_with("ap"))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(extract::ap_database(&headers_only, Dialect::Aos8).is_empty());
}

#[test]
fn port_status_fixture_yields_uplink_counters() {
    let stats = extract::interface_stats(PORT_STATUS);
    assert_eq!(
        stats,
        InterfaceStats {
            status: "up".to_string(),
            speed: "1 Gb/s".to_string(),
            duplex: "full".to_string(),
            tx_bytes: 1_834_467_120,
            rx_bytes: 2_957_002_311,
        }
    );
}

#[test]
fn not_found_sentinel_wins_over_port_rows() {
    assert!(extract::interface_stats(PORT_STATUS_NOT_FOUND).is_empty());

    let mixed = format!("{PORT_STATUS}{PORT_STATUS_NOT_FOUND}");
    assert!(extract::interface_stats(&mixed).is_empty());
}

#[test]
fn lldp_fixture_yields_neighbor() {
    let neighbor = extract::neighbor_info(LLDP_NEIGHBORS).expect("neighbor");
    assert_eq!(neighbor.remote_switch, "idf2-sw01");
    assert_eq!(neighbor.remote_port, "Gi1/0/14");
}

#[test]
fn user_table_device_types_follow_layout() {
    let clients = extract::wireless_clients(USER_TABLE);
    let types: Vec<&str> = clients.iter().map(|c| c.device_type.as_str()).collect();
    assert_eq!(types, vec!["Android", "Win 10", "OS X", UNKNOWN_DEVICE_TYPE]);

    assert_eq!(clients[2].ssid, "Guest WiFi");
    assert_eq!(clients[2].bssid, "ac:a3:1e:c2:00:11");
    assert_eq!(clients[2].ap_name, "ap106-hall");
    assert_eq!(clients[3].ip_addr, "10.6.0.32");
}

#[test]
fn association_details_enrich_user_table_entry() {
    let mut client: WirelessClient = extract::wireless_clients(USER_TABLE)
        .into_iter()
        .next()
        .expect("first client");
    extract::client_detail(CLIENT_ASSOCIATION).apply(&mut client);

    assert_eq!(client.mac_addr, "f0:18:98:aa:bb:01");
    assert_eq!(client.channel, 149);
    assert_eq!(client.tx_bytes, 88_213_334);
    assert_eq!(client.rx_bytes, 1_928_371);
}

#[test]
fn license_fixture_yields_every_entry() {
    let entries = extract::licenses(LICENSE);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].installed, "2020-06-15 08:00:00");
    assert_eq!(entries[1].expires, "2021-06-15 08:00:00");
    assert_eq!(entries[2].service, "RF Protect Module: 32");
}

#[test]
fn essid_fixture_is_deduplicated() {
    assert_eq!(
        extract::ssids(ESSID_CONFIG),
        vec!["CorpWiFi", "Guest WiFi", "IoT"]
    );
}

#[test]
fn extraction_is_repeatable() {
    assert_eq!(
        extract::ap_database(AP_DATABASE_AOS8, Dialect::Aos8),
        extract::ap_database(AP_DATABASE_AOS8, Dialect::Aos8)
    );
    assert_eq!(
        extract::interface_stats(PORT_STATUS),
        extract::interface_stats(PORT_STATUS)
    );
    assert_eq!(
        extract::neighbor_info(LLDP_NEIGHBORS),
        extract::neighbor_info(LLDP_NEIGHBORS)
    );
    assert_eq!(
        extract::wireless_clients(USER_TABLE),
        extract::wireless_clients(USER_TABLE)
    );
    assert_eq!(extract::licenses(LICENSE), extract::licenses(LICENSE));
    assert_eq!(extract::ssids(ESSID_CONFIG), extract::ssids(ESSID_CONFIG));
}
