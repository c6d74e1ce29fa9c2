use super::{AP_NAME_RE, token, tokens};
use crate::models::NeighborInfo;

const AP_DOWN: &str = "AP is down";

const MIN_NEIGHBOR_TOKENS: usize = 5;

/// Extracts the uplink neighbor from `show ap lldp neighbors ap-name <name>`.
///
/// The last AP row wins. A row too short to hold the neighbor columns ends
/// extraction with no neighbor.
pub fn neighbor_info(raw: &str) -> Option<NeighborInfo> {
    if raw.contains(AP_DOWN) {
        return None;
    }

    let mut neighbor = None;
    for line in raw.lines().filter(|line| AP_NAME_RE.is_match(line)) {
        let row = tokens(line);
        if row.len() < MIN_NEIGHBOR_TOKENS {
            return None;
        }
        neighbor = Some(NeighborInfo {
            remote_switch: token(&row, 3),
            remote_port: token(&row, 4),
        });
    }
    neighbor
}
