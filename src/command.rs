//! Controller CLI dialects and the command strings they accept.
//!
//! Both supported controller generations share most `show` commands; they
//! differ in how the effective configuration is printed, whether mutating
//! commands must be wrapped in `configure terminal` / `exit`, and in the
//! column layout of the AP database.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::WlcError;

/// Built-in dialect names.
pub const BUILTIN_DIALECTS: &[&str] = &["aos6", "aos8"];

/// Controller CLI generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Standalone/master controllers on 6.x firmware.
    Aos6,
    /// Mobility conductor/managed controllers on 8.x firmware.
    #[default]
    Aos8,
}

/// Capability tags describing dialect differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DialectCapability {
    /// Mutating commands need explicit `configure terminal` / `exit`.
    ConfigBracketing,
    /// `show configuration effective` is available.
    EffectiveConfig,
    /// AP database columns shift with the AP status.
    PositionalApDatabase,
}

/// Metadata for a built-in dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DialectMetadata {
    pub name: String,
    pub vendor: String,
    pub family: String,
    pub capabilities: Vec<DialectCapability>,
}

/// How an AP is addressed in `show ap port status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApLookup {
    WiredMac(String),
    Name(String),
}

impl ApLookup {
    /// Prefers the wired MAC and falls back to the AP name when it is empty.
    pub fn for_ap(mac_addr: &str, name: &str) -> Self {
        if mac_addr.is_empty() {
            ApLookup::Name(name.to_string())
        } else {
            ApLookup::WiredMac(mac_addr.to_string())
        }
    }
}

impl Dialect {
    /// Looks up a dialect by name (case-insensitive).
    pub fn by_name(name: &str) -> Result<Self, WlcError> {
        match name.to_ascii_lowercase().as_str() {
            "aos6" => Ok(Dialect::Aos6),
            "aos8" => Ok(Dialect::Aos8),
            _ => Err(WlcError::UnknownDialect(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Aos6 => "aos6",
            Dialect::Aos8 => "aos8",
        }
    }

    pub fn metadata(&self) -> DialectMetadata {
        let (family, capabilities) = match self {
            Dialect::Aos6 => (
                "ArubaOS 6.x",
                vec![
                    DialectCapability::ConfigBracketing,
                    DialectCapability::PositionalApDatabase,
                ],
            ),
            Dialect::Aos8 => ("ArubaOS 8.x", vec![DialectCapability::EffectiveConfig]),
        };
        DialectMetadata {
            name: self.name().to_string(),
            vendor: "Aruba".to_string(),
            family: family.to_string(),
            capabilities,
        }
    }

    pub fn has_capability(&self, capability: DialectCapability) -> bool {
        self.metadata().capabilities.contains(&capability)
    }

    pub fn ap_database(&self) -> String {
        "show ap database long".to_string()
    }

    pub fn ap_port_status(&self, lookup: &ApLookup) -> String {
        match lookup {
            ApLookup::WiredMac(mac) => {
                format!("show ap port status wired-mac {}", mac_arg(mac))
            }
            ApLookup::Name(name) => format!("show ap port status ap-name {name}"),
        }
    }

    pub fn ap_lldp_neighbors(&self, ap_name: &str) -> String {
        format!("show ap lldp neighbors ap-name {ap_name}")
    }

    pub fn user_table(&self) -> String {
        "show user-table".to_string()
    }

    pub fn user_table_for_ssid(&self, ssid: &str) -> String {
        format!("show user-table essid \"{ssid}\"")
    }

    pub fn client_association(&self, client_mac: &str) -> String {
        format!(
            "sh ap association client-mac {} | beg Parameter",
            mac_arg(client_mac)
        )
    }

    pub fn ssid_config(&self) -> String {
        if self.has_capability(DialectCapability::EffectiveConfig) {
            "show configuration effective | include essid".to_string()
        } else {
            "show configuration | include essid".to_string()
        }
    }

    pub fn license(&self) -> String {
        "show license".to_string()
    }

    /// Command sequence that renames the AP with the given wired MAC.
    pub fn ap_rename(&self, wired_mac: &str, new_name: &str) -> Vec<String> {
        self.bracket(format!(
            "ap-rename wired-mac {} {new_name}",
            mac_arg(wired_mac)
        ))
    }

    /// Command sequence that moves the AP with the given wired MAC to a group.
    pub fn ap_regroup(&self, wired_mac: &str, new_group: &str) -> Vec<String> {
        self.bracket(format!(
            "ap-regroup wired-mac {} {new_group}",
            mac_arg(wired_mac)
        ))
    }

    fn bracket(&self, command: String) -> Vec<String> {
        if self.has_capability(DialectCapability::ConfigBracketing) {
            vec![
                "configure terminal".to_string(),
                command,
                "exit".to_string(),
            ]
        } else {
            vec![command]
        }
    }
}

/// Normalizes a MAC address to lower-case colon notation.
///
/// Accepts 12 hex digits with or without `:`, `-` or `.` separators
/// (`ACA31EC12210`, `ac-a3-1e-c1-22-10`, `aca3.1ec1.2210`).
pub fn normalize_mac(raw: &str) -> Option<String> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();
    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let lower = digits.to_ascii_lowercase();
    let octets: Vec<&str> = (0..12).step_by(2).map(|i| &lower[i..i + 2]).collect();
    Some(octets.join(":"))
}

fn mac_arg(raw: &str) -> String {
    normalize_mac(raw).unwrap_or_else(|| raw.trim().to_string())
}
