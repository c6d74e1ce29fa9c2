use once_cell::sync::Lazy;
use regex::Regex;

use super::{compile, tokens};
use crate::models::LicenseEntry;

/// License rows start with a long key followed by the install date.
static LICENSE_ROW_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\s*\S{20,}\s+\d{4}-\d{2}-\d{2}\s"));

static DATE_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\d{4}-\d{2}-\d{2}$"));

/// The flags column holds one status letter (`E` enabled, `R` reboot
/// required). Longer upper-case words belong to the service name.
static FLAGS_RE: Lazy<Regex> = Lazy::new(|| compile(r"^[A-Z]$"));

/// Extracts the license table of `show license`.
pub fn licenses(raw: &str) -> Vec<LicenseEntry> {
    raw.lines()
        .filter(|line| LICENSE_ROW_RE.is_match(line))
        .filter_map(|line| {
            let row = tokens(line);
            // key, install date and time, then at least the expiry column.
            if row.len() < 4 {
                return None;
            }
            let mut entry = LicenseEntry {
                key: row[0].clone(),
                installed: format!("{} {}", row[1], row[2]),
                ..LicenseEntry::default()
            };

            let mut rest = row[3..].iter().peekable();
            if let Some(expires) = rest.next() {
                entry.expires = if DATE_RE.is_match(expires) {
                    match rest.next_if(|t| t.contains(':')) {
                        Some(time) => format!("{expires} {time}"),
                        None => expires.clone(),
                    }
                } else {
                    expires.clone()
                };
            }
            if let Some(flags) = rest.next_if(|t| FLAGS_RE.is_match(t)) {
                entry.flags = flags.clone();
            }
            entry.service = rest.map(String::as_str).collect::<Vec<_>>().join(" ");
            Some(entry)
        })
        .collect()
}
