use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Session;
use crate::error::WlcError;

/// One captured command and the text the controller printed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReplayEntry {
    pub command: String,
    pub output: String,
}

impl ReplayEntry {
    /// Parses one entry per non-empty line.
    pub fn parse_jsonl(jsonl: &str) -> Result<Vec<Self>, WlcError> {
        jsonl
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|line| serde_json::from_str(line).map_err(WlcError::from))
            .collect()
    }
}

/// Shared record of what a replay session was asked to do.
///
/// Cloned handles observe the same log, so it stays readable after the
/// session has been moved into a pool.
#[derive(Debug, Clone, Default)]
pub struct ReplayLog {
    inner: Arc<Mutex<LogState>>,
}

#[derive(Debug, Default)]
struct LogState {
    commands: Vec<String>,
    connects: usize,
    disconnects: usize,
}

impl ReplayLog {
    fn update(&self, f: impl FnOnce(&mut LogState)) -> Result<(), WlcError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| WlcError::Internal(format!("replay log lock error: {e}")))?;
        f(&mut guard);
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&LogState) -> T) -> Result<T, WlcError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| WlcError::Internal(format!("replay log lock error: {e}")))?;
        Ok(f(&guard))
    }

    /// Commands sent so far, in order.
    pub fn commands(&self) -> Result<Vec<String>, WlcError> {
        self.read(|state| state.commands.clone())
    }

    /// Number of successful connects.
    pub fn connects(&self) -> Result<usize, WlcError> {
        self.read(|state| state.connects)
    }

    /// Number of disconnects of a connected session.
    pub fn disconnects(&self) -> Result<usize, WlcError> {
        self.read(|state| state.disconnects)
    }
}

/// Offline session that answers commands from captured outputs.
///
/// When a command was captured several times the outputs are served in order
/// and the last one repeats, so one capture can back a whole poll round.
pub struct ReplaySession {
    target: String,
    outputs: HashMap<String, Vec<String>>,
    served: HashMap<String, usize>,
    connected: bool,
    refuse_connect: bool,
    latency: Duration,
    log: ReplayLog,
}

impl ReplaySession {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            outputs: HashMap::new(),
            served: HashMap::new(),
            connected: false,
            refuse_connect: false,
            latency: Duration::ZERO,
            log: ReplayLog::default(),
        }
    }

    /// Builds a session from JSONL lines of [`ReplayEntry`].
    pub fn from_jsonl(target: &str, jsonl: &str) -> Result<Self, WlcError> {
        Ok(Self::from_entries(target, &ReplayEntry::parse_jsonl(jsonl)?))
    }

    pub fn from_entries(target: &str, entries: &[ReplayEntry]) -> Self {
        entries.iter().fold(Self::new(target), |session, entry| {
            session.with_output(&entry.command, &entry.output)
        })
    }

    pub fn with_output(mut self, command: &str, output: &str) -> Self {
        self.outputs
            .entry(command.to_string())
            .or_default()
            .push(output.to_string());
        self
    }

    /// Makes `connect` fail, as an unreachable controller would.
    pub fn refusing_connect(mut self) -> Self {
        self.refuse_connect = true;
        self
    }

    /// Delays every command, to exercise concurrency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Handle to this session's command log.
    pub fn log(&self) -> ReplayLog {
        self.log.clone()
    }
}

#[async_trait]
impl Session for ReplaySession {
    async fn connect(&mut self, timeout: Duration) -> Result<(), WlcError> {
        if self.refuse_connect {
            return Err(WlcError::ConnectTimeout(timeout.as_secs()));
        }
        if !self.connected {
            self.connected = true;
            self.log.update(|state| state.connects += 1)?;
        }
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<String, WlcError> {
        if !self.connected {
            return Err(WlcError::NotConnected);
        }
        self.log
            .update(|state| state.commands.push(command.to_string()))?;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let outputs = self.outputs.get(command).ok_or_else(|| {
            WlcError::ReplayMismatch(format!("no replayable output found for command '{command}'"))
        })?;
        let served = self.served.entry(command.to_string()).or_default();
        let index = (*served).min(outputs.len().saturating_sub(1));
        *served += 1;
        debug!("{} replaying '{}' #{}", self.target, command, index);
        Ok(outputs[index].clone())
    }

    async fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        if let Err(e) = self.log.update(|state| state.disconnects += 1) {
            debug!("{} {}", self.target, e);
        }
    }

    fn target(&self) -> &str {
        &self.target
    }
}
