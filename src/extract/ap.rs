use once_cell::sync::Lazy;
use regex::Regex;

use super::{MAC_RE, compile, is_ipv4, token, tokens};
use crate::command::Dialect;
use crate::models::{AccessPoint, ApState};

/// AP rows start with an AP name or, for unprovisioned APs, the wired MAC.
static AP_ROW_RE: Lazy<Regex> = Lazy::new(|| compile(r"^(?:ap\d+\S+|(?:\w+:){5}\w+)"));

/// Serial numbers are a run of at least seven word characters.
static SERIAL_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\w{7,}$"));

/// Rows with fewer tokens cannot carry name, group, model, IP and status.
const MIN_ROW_TOKENS: usize = 5;

/// Extracts every AP row of `show ap database long`.
///
/// Name, group and model are always the first three columns and the status is
/// the fifth. The position of the remaining columns depends on the dialect.
pub fn ap_database(raw: &str, dialect: Dialect) -> Vec<AccessPoint> {
    raw.lines()
        .filter(|line| AP_ROW_RE.is_match(line))
        .filter_map(|line| {
            let row = tokens(line);
            if row.len() < MIN_ROW_TOKENS {
                return None;
            }
            let mut ap = AccessPoint {
                name: token(&row, 0),
                group: token(&row, 1),
                model: token(&row, 2),
                status: ApState::from_token(&row[4]),
                ..AccessPoint::default()
            };
            if is_ipv4(&row[3]) {
                ap.ip_addr = row[3].clone();
            }
            match dialect {
                Dialect::Aos6 => fill_positional(&mut ap, &row),
                Dialect::Aos8 => fill_scanned(&mut ap, line, &row),
            }
            Some(ap)
        })
        .collect()
}

/// 6.x layout: an `Up` status carries an uptime token, shifting every column
/// after it by one.
fn fill_positional(ap: &mut AccessPoint, row: &[String]) {
    let base = match ap.status {
        ApState::Up => 7,
        ApState::Down => 6,
        ApState::Unknown => return,
    };
    ap.primary_controller = token(row, base);
    ap.standby_controller = token(row, base + 1);
    ap.mac_addr = token(row, base + 2);
    ap.serial = token(row, base + 3);
}

/// 8.x layout: the flags column may be empty, so the trailing fields are found
/// by shape instead of position.
fn fill_scanned(ap: &mut AccessPoint, line: &str, row: &[String]) {
    if let Some(mac) = MAC_RE.find(line) {
        ap.mac_addr = mac.as_str().to_string();
    }

    let primary = row
        .iter()
        .enumerate()
        .take(8)
        .skip(5)
        .find(|(_, t)| is_ipv4(t));
    if let Some((index, ip)) = primary {
        ap.primary_controller = ip.clone();
        if let Some(standby) = row.iter().skip(index + 1).find(|t| is_ipv4(t)) {
            ap.standby_controller = standby.clone();
        }
    }

    if let Some(serial) = row.iter().skip(7).find(|t| SERIAL_RE.is_match(t)) {
        ap.serial = serial.clone();
    }
}
