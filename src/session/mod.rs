//! Interactive command sessions to a controller.
//!
//! The rest of the crate only needs three primitives from a session: connect
//! within a timeout, send one command and get its text output back, and
//! disconnect. [`Session`] captures them; [`SshSession`] implements them over
//! SSH and [`ReplaySession`] serves recorded outputs without a network.
//!
//! # Main Components
//!
//! - [`Session`] - Capability consumed by [`crate::controller::Controller`]
//! - [`SshSession`] - PTY shell session with prompt detection and paging
//! - [`ReplaySession`] - Offline session backed by captured outputs
//! - [`ConnectionSecurityOptions`] - SSH algorithm policy

use std::time::Duration;

use async_trait::async_trait;

use crate::error::WlcError;

pub use replay::{ReplayEntry, ReplayLog, ReplaySession};
pub use security::{ConnectionSecurityOptions, SecurityLevel};
pub use ssh::{SshSession, SshTarget};

/// An authenticated interactive command channel to one controller.
#[async_trait]
pub trait Session: Send {
    /// Opens the session; must reach a usable prompt within `timeout`.
    async fn connect(&mut self, timeout: Duration) -> Result<(), WlcError>;

    /// Sends one command and returns its output without echo or prompt.
    async fn send_command(&mut self, command: &str) -> Result<String, WlcError>;

    /// Closes the session. Closing an unconnected session is a no-op.
    async fn disconnect(&mut self);

    /// Human-readable endpoint, used in log lines.
    fn target(&self) -> &str;
}

mod replay;
mod security;
mod ssh;
