//! Typed inventory records produced from controller CLI output.
//!
//! Every record is best-effort: fields the controller did not report stay at
//! their zero value (empty string or `0`).

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Device type reported when the client-table layout is not recognized.
pub const UNKNOWN_DEVICE_TYPE: &str = "Unknown";

/// Operational state of an access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApState {
    Up,
    Down,
    #[default]
    Unknown,
}

impl ApState {
    /// Parses the status column of the AP database (case-insensitive).
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "up" => ApState::Up,
            "down" => ApState::Down,
            _ => ApState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApState::Up => "up",
            ApState::Down => "down",
            ApState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ApState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the AP database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AccessPoint {
    /// Wired MAC address.
    pub mac_addr: String,
    pub name: String,
    pub group: String,
    pub model: String,
    pub serial: String,
    pub ip_addr: String,
    /// Controller the AP terminates on.
    pub primary_controller: String,
    /// Standby controller, if any.
    pub standby_controller: String,
    pub status: ApState,
}

/// Uplink port state and counters of one AP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InterfaceStats {
    pub status: String,
    pub speed: String,
    pub duplex: String,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
}

impl InterfaceStats {
    /// True when nothing was extracted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Speed and duplex in the `1 Gb/s-FULL` form used in poll reports.
    pub fn link_summary(&self) -> String {
        format!("{}-{}", self.speed, self.duplex.to_ascii_uppercase())
    }
}

/// Switch and port an AP uplink is attached to, from LLDP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NeighborInfo {
    pub remote_switch: String,
    pub remote_port: String,
}

/// A station associated to the WLAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WirelessClient {
    pub mac_addr: String,
    pub ip_addr: String,
    pub ap_name: String,
    pub ssid: String,
    pub bssid: String,
    pub device_type: String,
    /// Filled in by [`ClientDetail::apply`].
    pub channel: u32,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
}

impl Default for WirelessClient {
    fn default() -> Self {
        Self {
            mac_addr: String::new(),
            ip_addr: String::new(),
            ap_name: String::new(),
            ssid: String::new(),
            bssid: String::new(),
            device_type: UNKNOWN_DEVICE_TYPE.to_string(),
            channel: 0,
            tx_bytes: 0,
            rx_bytes: 0,
        }
    }
}

/// Radio channel and traffic counters of one client association.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClientDetail {
    pub channel: u32,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
}

impl ClientDetail {
    /// Copies the detail counters onto `client`, leaving identity fields alone.
    pub fn apply(&self, client: &mut WirelessClient) {
        client.channel = self.channel;
        client.tx_bytes = self.tx_bytes;
        client.rx_bytes = self.rx_bytes;
    }
}

/// One row of the license table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LicenseEntry {
    pub key: String,
    /// Install timestamp as printed by the controller.
    pub installed: String,
    /// `Never`, `Expired`, or an expiry timestamp.
    pub expires: String,
    pub flags: String,
    /// Service type and capacity, e.g. `Access Points: 64`.
    pub service: String,
}

/// Composite status of one AP produced by a poll round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ApStatus {
    pub ap_name: String,
    pub mac_addr: String,
    pub interface: InterfaceStats,
    pub neighbor: Option<NeighborInfo>,
}

impl ApStatus {
    /// Zero-valued status for an AP whose queries could not run.
    pub fn unreachable(ap: &AccessPoint) -> Self {
        Self {
            ap_name: ap.name.clone(),
            mac_addr: ap.mac_addr.clone(),
            ..Self::default()
        }
    }
}

/// Aggregated results of one poll round, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PollReport {
    pub statuses: Vec<ApStatus>,
}

impl PollReport {
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Looks up the status of an AP by name.
    pub fn find(&self, ap_name: &str) -> Option<&ApStatus> {
        self.statuses.iter().find(|s| s.ap_name == ap_name)
    }
}
