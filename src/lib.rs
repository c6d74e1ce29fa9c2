//! # rwlc - Wireless LAN Controller Inventory Poller
//!
//! `rwlc` talks to wireless LAN controllers over interactive CLI sessions,
//! issues `show` commands and turns the free-form terminal output into typed
//! inventory records: access points, wireless clients, uplink port counters,
//! LLDP neighbors, licenses and SSIDs.
//!
//! ## Features
//!
//! - **Connection Pooling**: A fixed set of pre-connected sessions with exclusive leases
//! - **Concurrent Polling**: Per-AP status queries fanned out under a hard concurrency cap
//! - **Record Extraction**: Heuristic parsers for whitespace-aligned CLI tables
//! - **Two CLI Dialects**: Command strings for `Aos6` and `Aos8` controllers
//! - **Replay Sessions**: Offline sessions backed by captured outputs for tests and dry runs
//! - **Legacy SSH Compatibility**: Algorithm profiles for older controller firmware
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rwlc::command::Dialect;
//! use rwlc::config::PollerConfig;
//! use rwlc::controller::Controller;
//! use rwlc::dispatch::poll_access_points;
//! use rwlc::pool::ConnectionPool;
//! use rwlc::session::{ConnectionSecurityOptions, SshSession, SshTarget};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PollerConfig::default();
//!     let target = SshTarget::new("admin", "10.0.0.2", "password");
//!
//!     let pool = ConnectionPool::connect(&config, |_| {
//!         let session = SshSession::new(
//!             target.clone(),
//!             ConnectionSecurityOptions::for_level(config.security),
//!         )
//!         .with_command_timeout(config.command_timeout());
//!         Controller::new(session, Dialect::Aos8)
//!     })
//!     .await?;
//!
//!     let aps = pool.acquire().await?.ap_database().await?;
//!     let report = poll_access_points(&pool, &aps).await;
//!     for status in &report.statuses {
//!         println!("{} {}", status.ap_name, status.interface.link_summary());
//!     }
//!
//!     pool.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Main Components
//!
//! - [`pool::ConnectionPool`] - Bounded pool of connected controller sessions
//! - [`dispatch::poll_access_points`] - Concurrent per-AP status polling
//! - [`controller::Controller`] - Typed queries against one controller
//! - [`extract`] - CLI output to record extraction
//! - [`command::Dialect`] - CLI command strings per controller generation
//! - [`error::WlcError`] - Error type for sessions, pool and configuration
//! - [`config`] - Poller settings and SSH algorithm tables

pub mod command;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod models;
pub mod pool;
pub mod session;
