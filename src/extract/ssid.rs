use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::compile;

static ESSID_RE: Lazy<Regex> = Lazy::new(|| compile(r#"essid\s+"([^"]*)""#));

/// Extracts the configured SSIDs from `show configuration ... | include essid`.
///
/// The same SSID usually appears in several profiles; each name is returned
/// once, in first-seen order.
pub fn ssids(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    ESSID_RE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|ssid| !ssid.is_empty() && seen.insert(ssid.clone()))
        .collect()
}
