//! Typed queries against one controller.
//!
//! [`Controller`] composes a [`Session`], the command strings of its
//! [`Dialect`] and the record extractors. Read-only queries are best-effort:
//! a command that fails at the transport level is logged and yields the zero
//! value of its record, exactly as if the controller had printed nothing.

use std::time::Duration;

use log::{debug, warn};

use crate::command::{ApLookup, Dialect};
use crate::error::WlcError;
use crate::extract;
use crate::models::{
    AccessPoint, ApStatus, InterfaceStats, LicenseEntry, NeighborInfo, WirelessClient,
};
use crate::session::Session;

/// A wireless controller reached through one session.
pub struct Controller<S> {
    session: S,
    dialect: Dialect,
}

impl<S: Session> Controller<S> {
    pub fn new(session: S, dialect: Dialect) -> Self {
        Self { session, dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn target(&self) -> &str {
        self.session.target()
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub async fn connect(&mut self, timeout: Duration) -> Result<(), WlcError> {
        self.session.connect(timeout).await
    }

    pub async fn disconnect(&mut self) {
        self.session.disconnect().await
    }

    /// Runs a read-only command, turning transport failures into empty output.
    async fn show(&mut self, command: &str) -> String {
        match self.session.send_command(command).await {
            Ok(output) => output,
            Err(e) => {
                warn!("{} '{}' failed: {}", self.session.target(), command, e);
                String::new()
            }
        }
    }

    /// Lists every AP known to the controller.
    ///
    /// Unlike the other queries this one reports transport failures, since an
    /// empty inventory would otherwise look like a controller without APs.
    pub async fn ap_database(&mut self) -> Result<Vec<AccessPoint>, WlcError> {
        let output = self
            .session
            .send_command(&self.dialect.ap_database())
            .await?;
        let aps = extract::ap_database(&output, self.dialect);
        debug!("{} AP database: {} rows", self.session.target(), aps.len());
        Ok(aps)
    }

    pub async fn ap_interface(&mut self, lookup: &ApLookup) -> InterfaceStats {
        let command = self.dialect.ap_port_status(lookup);
        extract::interface_stats(&self.show(&command).await)
    }

    pub async fn ap_neighbor(&mut self, ap_name: &str) -> Option<NeighborInfo> {
        let command = self.dialect.ap_lldp_neighbors(ap_name);
        extract::neighbor_info(&self.show(&command).await)
    }

    pub async fn wireless_clients(&mut self) -> Vec<WirelessClient> {
        let command = self.dialect.user_table();
        extract::wireless_clients(&self.show(&command).await)
    }

    pub async fn wireless_clients_for_ssid(&mut self, ssid: &str) -> Vec<WirelessClient> {
        let command = self.dialect.user_table_for_ssid(ssid);
        extract::wireless_clients(&self.show(&command).await)
    }

    /// Fetches channel and counters for `client` and copies them onto it.
    pub async fn client_details(&mut self, client: &mut WirelessClient) {
        let command = self.dialect.client_association(&client.mac_addr);
        extract::client_detail(&self.show(&command).await).apply(client);
    }

    pub async fn licenses(&mut self) -> Vec<LicenseEntry> {
        let command = self.dialect.license();
        extract::licenses(&self.show(&command).await)
    }

    pub async fn ssids(&mut self) -> Vec<String> {
        let command = self.dialect.ssid_config();
        extract::ssids(&self.show(&command).await)
    }

    pub async fn set_ap_name(&mut self, wired_mac: &str, new_name: &str) -> Result<(), WlcError> {
        let commands = self.dialect.ap_rename(wired_mac, new_name);
        self.configure(&commands).await
    }

    pub async fn set_ap_group(&mut self, wired_mac: &str, new_group: &str) -> Result<(), WlcError> {
        let commands = self.dialect.ap_regroup(wired_mac, new_group);
        self.configure(&commands).await
    }

    async fn configure(&mut self, commands: &[String]) -> Result<(), WlcError> {
        for command in commands {
            debug!("{} config command: {}", self.session.target(), command);
            self.session.send_command(command).await?;
        }
        Ok(())
    }

    /// Port status and LLDP neighbor of one AP, queried back to back.
    pub async fn poll_status(&mut self, ap: &AccessPoint) -> ApStatus {
        let interface = self
            .ap_interface(&ApLookup::for_ap(&ap.mac_addr, &ap.name))
            .await;
        let neighbor = self.ap_neighbor(&ap.name).await;
        ApStatus {
            ap_name: ap.name.clone(),
            mac_addr: ap.mac_addr.clone(),
            interface,
            neighbor,
        }
    }
}
