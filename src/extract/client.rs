use once_cell::sync::Lazy;
use regex::Regex;

use super::{IPV4_RE, compile, labeled_number, token, tokens};
use crate::models::{ClientDetail, UNKNOWN_DEVICE_TYPE, WirelessClient};

/// `ssid/bssid/phy` triple; the SSID part may contain spaces.
static SSID_TRIPLE_RE: Lazy<Regex> = Lazy::new(|| compile(r"(?:.*/){2}\S+"));

/// Two words joined by a space right before a slash: an SSID with a space.
static SPACED_SSID_RE: Lazy<Regex> = Lazy::new(|| compile(r"(\w+\s\w+)/"));

static CHANNEL_RE: Lazy<Regex> = Lazy::new(|| compile(r"Channel\s+(\d+)"));
static TX_BYTES_RE: Lazy<Regex> = Lazy::new(|| compile(r"Client\sTx\sBytes\s+(\d+)"));
static RX_BYTES_RE: Lazy<Regex> = Lazy::new(|| compile(r"Client\sRx\sBytes\s+(\d+)"));

/// Index of the first token of the `ssid/bssid/phy ... type ...` segment.
const TRAILING_START: usize = 6;

/// Extracts every station from `show user-table`.
///
/// IP, MAC and AP name are positional. The trailing segment holds SSID, BSSID
/// and device type, but both SSIDs and device types may contain spaces, so
/// the device type is picked from an enumerated table of observed layouts.
pub fn wireless_clients(raw: &str) -> Vec<WirelessClient> {
    raw.lines()
        .filter_map(|line| {
            let ip = IPV4_RE.find(line)?.as_str().to_string();
            let row = tokens(line);
            if row.len() <= TRAILING_START {
                return None;
            }
            let trailing = &row[TRAILING_START..];
            let (ssid, bssid) = ssid_and_bssid(trailing);
            Some(WirelessClient {
                mac_addr: token(&row, 1),
                ip_addr: ip,
                ap_name: token(&row, 4),
                ssid,
                bssid,
                device_type: device_type(trailing),
                ..WirelessClient::default()
            })
        })
        .collect()
}

fn ssid_and_bssid(trailing: &[String]) -> (String, String) {
    let joined = trailing.join(" ");
    let Some(triple) = SSID_TRIPLE_RE.find(&joined) else {
        return (String::new(), String::new());
    };
    let mut parts = triple.as_str().split('/');
    let ssid = parts.next().unwrap_or_default().to_string();
    let bssid = parts.next().unwrap_or_default().to_string();
    (ssid, bssid)
}

/// Device type by trailing token count and whether the SSID has a space.
///
/// | tokens | spaced SSID | device type        |
/// |--------|-------------|--------------------|
/// | 5      | no          | `t[3]`             |
/// | 6      | no          | `t[3] t[4]`        |
/// | 6      | yes         | `t[5]`             |
/// | 7      | yes         | `t[4] t[5]`        |
///
/// Any other layout is `Unknown`. A 5-token row with a spaced SSID cannot be
/// told apart from a row missing its device type, so it stays `Unknown`.
fn device_type(trailing: &[String]) -> String {
    let spaced_ssid = SPACED_SSID_RE.is_match(&trailing.join(" "));
    match (trailing.len(), spaced_ssid) {
        (5, false) => trailing[3].clone(),
        (6, false) => format!("{} {}", trailing[3], trailing[4]),
        (6, true) => trailing[5].clone(),
        (7, true) => format!("{} {}", trailing[4], trailing[5]),
        _ => UNKNOWN_DEVICE_TYPE.to_string(),
    }
}

/// Extracts channel and byte counters from `sh ap association client-mac`.
pub fn client_detail(raw: &str) -> ClientDetail {
    ClientDetail {
        channel: labeled_number(&CHANNEL_RE, raw),
        tx_bytes: labeled_number(&TX_BYTES_RE, raw),
        rx_bytes: labeled_number(&RX_BYTES_RE, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(trailing: &str) -> String {
        format!("10.5.0.21  f0:18:98:aa:bb:01  authenticated  00:01:12  ap105-lobby  802.1x  {trailing}\n")
    }

    fn single(trailing: &str) -> WirelessClient {
        let clients = wireless_clients(&row(trailing));
        assert_eq!(clients.len(), 1, "expected one client for {trailing:?}");
        clients.into_iter().next().expect("client")
    }

    #[test]
    fn positional_fields_are_extracted() {
        let client = single("CorpWiFi/ac:a3:1e:c2:00:10/5GHz-VHT  corp-aaa  tunnel  Android  pixel-7");
        assert_eq!(client.ip_addr, "10.5.0.21");
        assert_eq!(client.mac_addr, "f0:18:98:aa:bb:01");
        assert_eq!(client.ap_name, "ap105-lobby");
        assert_eq!(client.ssid, "CorpWiFi");
        assert_eq!(client.bssid, "ac:a3:1e:c2:00:10");
    }

    #[test]
    fn five_tokens_plain_ssid_uses_fourth_token() {
        let client = single("CorpWiFi/ac:a3:1e:c2:00:10/5GHz-VHT  corp-aaa  tunnel  Android  pixel-7");
        assert_eq!(client.device_type, "Android");
    }

    #[test]
    fn six_tokens_plain_ssid_joins_two_word_type() {
        let client = single("CorpWiFi/ac:a3:1e:c2:00:10/5GHz-VHT  corp-aaa  tunnel  Win 10  DESKTOP-7Q");
        assert_eq!(client.device_type, "Win 10");
    }

    #[test]
    fn six_tokens_spaced_ssid_uses_last_token() {
        let client = single("Guest WiFi/ac:a3:1e:c2:00:11/2.4GHz-HT  guest-prof  tunnel  -  iPhone");
        assert_eq!(client.ssid, "Guest WiFi");
        assert_eq!(client.bssid, "ac:a3:1e:c2:00:11");
        assert_eq!(client.device_type, "iPhone");
    }

    #[test]
    fn seven_tokens_spaced_ssid_joins_two_word_type() {
        let client = single("Guest WiFi/ac:a3:1e:c2:00:11/2.4GHz-HT  guest-prof  tunnel  OS X  macbook");
        assert_eq!(client.device_type, "OS X");
    }

    #[test]
    fn unmatched_layout_is_unknown() {
        let client = single("Guest WiFi/ac:a3:1e:c2:00:11/2.4GHz-HT  guest-prof  tunnel  iPhone");
        assert_eq!(client.device_type, UNKNOWN_DEVICE_TYPE);

        let client = single("CorpWiFi/ac:a3:1e:c2:00:10/5GHz-VHT  corp-aaa");
        assert_eq!(client.device_type, UNKNOWN_DEVICE_TYPE);
    }

    #[test]
    fn lines_without_ip_are_ignored() {
        let raw = "Users\n-----\n    IP    MAC    Role\nUser Entries: 0/0\n";
        assert!(wireless_clients(raw).is_empty());
    }

    #[test]
    fn missing_ssid_triple_leaves_ssid_empty() {
        let client = single("CorpWiFi  corp-aaa  tunnel  Android  pixel-7");
        assert_eq!(client.ssid, "");
        assert_eq!(client.bssid, "");
        assert_eq!(client.device_type, "Android");
    }

    #[test]
    fn client_detail_reads_labeled_values() {
        let raw = "\
Parameter                 Value
---------                 -----
Channel                   149
Client Tx Bytes           88213334
Client Rx Bytes           1928371
";
        let detail = client_detail(raw);
        assert_eq!(detail.channel, 149);
        assert_eq!(detail.tx_bytes, 88_213_334);
        assert_eq!(detail.rx_bytes, 1_928_371);
    }

    #[test]
    fn client_detail_missing_labels_are_zero() {
        let detail = client_detail("Channel    44\n");
        assert_eq!(detail.channel, 44);
        assert_eq!(detail.tx_bytes, 0);
        assert_eq!(detail.rx_bytes, 0);
        assert_eq!(client_detail(""), ClientDetail::default());
    }
}
