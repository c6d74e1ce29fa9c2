//! Error types for controller sessions, the connection pool and replay fixtures.
//!
//! Extraction of records from CLI text never produces an error; only transport,
//! pool and configuration problems surface here.

use thiserror::Error;
use tokio::sync::mpsc::error::SendError;

/// Errors that can occur while talking to a wireless controller.
#[derive(Error, Debug)]
pub enum WlcError {
    /// The session did not become ready within the connect timeout.
    #[error("connect timeout after {0}s")]
    ConnectTimeout(u64),

    /// A command was issued on a session that is not connected.
    #[error("session not connected")]
    NotConnected,

    /// The SSH channel was disconnected while waiting for a prompt.
    #[error("channel disconnect on wait prompt")]
    ChannelDisconnect,

    /// Command execution timed out.
    ///
    /// The error contains the partial output received before the timeout.
    #[error("exec command timeout: {0}")]
    ExecTimeout(String),

    /// The controller answered a command with an error line.
    #[error("command rejected: {0}")]
    CommandRejected(String),

    /// A pooled session failed to connect, so the pool was not built.
    #[error("pool session {index} failed to connect: {source}")]
    PoolInit {
        index: usize,
        #[source]
        source: Box<WlcError>,
    },

    /// The pool has been shut down.
    #[error("connection pool closed")]
    PoolClosed,

    /// Poller configuration is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// No dialect is registered under the given name.
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),

    /// A replay session has no recorded output for a command.
    #[error("replay mismatch: {0}")]
    ReplayMismatch(String),

    /// Shared bookkeeping could not be accessed.
    #[error("internal error: {0}")]
    Internal(String),

    /// A replay fixture could not be decoded.
    #[error("replay format error: {0}")]
    ReplayFormat(#[from] serde_json::Error),

    /// An error occurred in the async-ssh2-tokio library.
    #[error("async ssh2 error: {0}")]
    Ssh2Error(#[from] async_ssh2_tokio::Error),

    /// An error occurred in the russh library.
    #[error("russh error: {0}")]
    RusshError(#[from] russh::Error),

    /// Failed to send data through the channel.
    #[error("Failed to send data: {0}")]
    SendDataError(#[from] SendError<String>),
}
