use once_cell::sync::Lazy;
use regex::Regex;

use super::{MAC_RE, compile, token, tokens};
use crate::models::InterfaceStats;

/// Controller answers that mean the AP has no port data.
static NOT_FOUND_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"AP with (?:MAC address|name) \S+ not found"));

const NO_INFORMATION: &str = "No information available for this AP";

/// Port rows are wide; shorter lines are wrapped or truncated output.
const MIN_PORT_TOKENS: usize = 18;

/// Extracts the uplink port of one AP from `show ap port status`.
///
/// Returns the zero record when the AP is unknown, has no data, or its port is
/// down.
pub fn interface_stats(raw: &str) -> InterfaceStats {
    if NOT_FOUND_RE.is_match(raw) || raw.contains(NO_INFORMATION) {
        return InterfaceStats::default();
    }

    raw.lines()
        .filter(|line| {
            MAC_RE.is_match(line)
                && !line.contains("show")
                && !line.contains("wired-mac")
                && !line.contains("down")
        })
        .map(tokens)
        .find(|row| row.len() >= MIN_PORT_TOKENS)
        .map(|row| InterfaceStats {
            status: token(&row, 5),
            speed: format!("{} {}", row[6], row[7]),
            duplex: token(&row, 8),
            tx_bytes: row[15].parse().unwrap_or_default(),
            rx_bytes: row[17].parse().unwrap_or_default(),
        })
        .unwrap_or_default()
}
