//! Conversion of controller CLI output into typed records.
//!
//! Each record kind has its own extraction policy, but they share the same
//! steps: pick candidate lines with a kind-specific pattern, collapse runs of
//! whitespace (the CLI pads columns to variable widths), split on single spaces
//! and read the positionally stable tokens.
//!
//! Extraction never fails. Unexpected text degrades to an empty result or to
//! zero-valued fields, so every record must be treated as best-effort. All
//! functions are pure: the same input always yields the same records.

use once_cell::sync::Lazy;
use regex::Regex;

mod ap;
mod client;
mod license;
mod lldp;
mod port;
mod ssid;

pub use ap::ap_database;
pub use client::{client_detail, wireless_clients};
pub use license::licenses;
pub use lldp::neighbor_info;
pub use port::interface_stats;
pub use ssid::ssids;

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => panic!("invalid extraction regex {pattern:?}: {err}"),
    }
}

/// Colon-separated MAC address anywhere in a line.
static MAC_RE: Lazy<Regex> = Lazy::new(|| compile(r"(?:\w+:){5}\w+"));

/// Dotted-quad IPv4 address anywhere in a line.
static IPV4_RE: Lazy<Regex> = Lazy::new(|| compile(r"(?:\d+\.){3}\d+"));

/// Leading AP name (`ap105-lobby`).
static AP_NAME_RE: Lazy<Regex> = Lazy::new(|| compile(r"^ap\d+\S+"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| compile(r"\s+"));

/// Collapses every run of whitespace into one space.
fn normalize(line: &str) -> String {
    WHITESPACE_RE.replace_all(line, " ").into_owned()
}

/// Normalizes a line and splits it into tokens.
///
/// Leading and trailing whitespace is dropped so that token 0 is always the
/// first column.
fn tokens(line: &str) -> Vec<String> {
    normalize(line.trim())
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn token(tokens: &[String], index: usize) -> String {
    tokens.get(index).cloned().unwrap_or_default()
}

fn is_ipv4(token: &str) -> bool {
    IPV4_RE
        .find(token)
        .is_some_and(|m| m.start() == 0 && m.end() == token.len())
}

/// Reads the digits that follow a labeled-value regex with one capture group.
///
/// A missing label or an unparsable number yields zero.
fn labeled_number<T>(re: &Regex, text: &str) -> T
where
    T: std::str::FromStr + Default,
{
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_default()
}
