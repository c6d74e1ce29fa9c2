use std::time::Duration;

use async_ssh2_tokio::Config;
use async_ssh2_tokio::client::{AuthMethod, Client};
use async_trait::async_trait;
use log::{debug, trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use russh::ChannelMsg;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::time::Instant;

use super::{ConnectionSecurityOptions, Session};
use crate::error::WlcError;

/// Controller prompts: `(wlc1) >`, `(wlc1) #`, `(wlc1) (config) #`,
/// `(MM) [mynode] #`.
static PROMPT_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\([^)]+\)\s*.*[>#]\s*$"));

static PASSWORD_RE: Lazy<Regex> = Lazy::new(|| compile(r"(?i)password:\s*$"));

static MORE_RE: Lazy<Regex> = Lazy::new(|| compile(r"--More--"));

/// Lines the CLI prints when it refuses a command.
static ERROR_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^%\s*(?:Invalid input|Parse error|Incomplete command)"));

/// Carriage returns and backspaces the pager leaves at the start of lines.
static CONTROL_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"^(\r+(\s+\r+)*)|(\u{8}+(\s+\u{8}+)*)"));

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => panic!("invalid session regex {pattern:?}: {err}"),
    }
}

/// Credentials and endpoint of one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub user: String,
    pub addr: String,
    pub port: u16,
    pub password: String,
    pub enable_password: Option<String>,
}

impl SshTarget {
    pub fn new(user: &str, addr: &str, password: &str) -> Self {
        Self {
            user: user.to_string(),
            addr: addr.to_string(),
            port: 22,
            password: password.to_string(),
            enable_password: None,
        }
    }

    pub fn with_enable_password(mut self, enable_password: &str) -> Self {
        self.enable_password = Some(enable_password.to_string());
        self
    }
}

/// PTY shell session to a controller over SSH.
///
/// Connecting waits for the CLI prompt, enters enable mode when an enable
/// password is configured and turns paging off. Each command returns the text
/// between its echo and the next prompt.
///
/// A command that times out or loses the channel closes the shell, since the
/// rest of its output would otherwise be read as the answer to the next
/// command. Later commands fail with [`WlcError::NotConnected`].
pub struct SshSession {
    target: SshTarget,
    device_addr: String,
    security_options: ConnectionSecurityOptions,
    command_timeout: Duration,
    shell: Option<Shell>,
}

struct Shell {
    /// `None` for shells driven directly through their channels.
    client: Option<Client>,
    sender: Sender<String>,
    recv: Receiver<String>,
    prompt: String,
}

/// Outcome of reading up to a prompt.
struct Exchange {
    rejected: Option<String>,
}

impl SshSession {
    pub fn new(target: SshTarget, security_options: ConnectionSecurityOptions) -> Self {
        let device_addr = format!("{}@{}:{}", target.user, target.addr, target.port);
        Self {
            target,
            device_addr,
            security_options,
            command_timeout: Duration::from_secs(60),
            shell: None,
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Checks if the underlying SSH connection is still active.
    pub fn is_connected(&self) -> bool {
        self.shell
            .as_ref()
            .and_then(|shell| shell.client.as_ref())
            .is_some_and(|client| !client.is_closed())
    }

    /// Prompt seen after the last command.
    pub fn prompt(&self) -> Option<&str> {
        self.shell.as_ref().map(|shell| shell.prompt.as_str())
    }

    async fn close_shell(&mut self) {
        if let Some(shell) = self.shell.take() {
            shell.close(&self.device_addr).await;
        }
    }

    /// Connects, starts the shell and prepares the CLI, all before `deadline`.
    ///
    /// Once the SSH connection is up, any later failure closes it again.
    async fn open(&self, deadline: Instant, timeout: Duration) -> Result<Shell, WlcError> {
        let config = Config {
            preferred: self.security_options.preferred(),
            inactivity_timeout: Some(Duration::from_secs(60)),
            ..Default::default()
        };

        let connecting = Client::connect_with_config(
            (self.target.addr.clone(), self.target.port),
            &self.target.user,
            AuthMethod::with_password(&self.target.password),
            self.security_options.server_check.clone(),
            config,
        );
        let client = match tokio::time::timeout_at(deadline, connecting).await {
            Ok(result) => result?,
            Err(_) => return Err(WlcError::ConnectTimeout(timeout.as_secs())),
        };
        debug!("{} TCP connection successful", self.device_addr);

        let (sender, recv) = match tokio::time::timeout_at(deadline, self.start_shell(&client)).await
        {
            Ok(Ok(channels)) => channels,
            Ok(Err(err)) => {
                disconnect_client(&client, &self.device_addr).await;
                return Err(err);
            }
            Err(_) => {
                disconnect_client(&client, &self.device_addr).await;
                return Err(WlcError::ConnectTimeout(timeout.as_secs()));
            }
        };

        let shell = Shell {
            client: Some(client),
            sender,
            recv,
            prompt: String::new(),
        };
        self.finish_open(shell, deadline, timeout).await
    }

    async fn start_shell(
        &self,
        client: &Client,
    ) -> Result<(Sender<String>, Receiver<String>), WlcError> {
        let mut channel = client.get_channel().await?;
        channel
            .request_pty(false, "xterm", 800, 600, 0, 0, &[])
            .await?;
        channel.request_shell(false).await?;
        debug!("{} Shell request successful", self.device_addr);

        let (sender_to_shell, mut receiver_from_user) = mpsc::channel::<String>(256);
        let (sender_to_user, receiver_from_shell) = mpsc::channel::<String>(256);

        let io_task_device_addr = self.device_addr.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(data) = receiver_from_user.recv() => {
                        if let Err(e) = channel.data(data.as_bytes()).await {
                            debug!("{} Failed to send data to shell: {:?}", io_task_device_addr, e);
                            break;
                        }
                    },
                    Some(msg) = channel.wait() => {
                        match msg {
                            ChannelMsg::Data { ref data } => {
                                if let Ok(s) = std::str::from_utf8(data)
                                    && sender_to_user.send(s.to_string()).await.is_err() {
                                        debug!("{} Shell output receiver dropped. Closing task.", io_task_device_addr);
                                        break;
                                    }
                            }
                            ChannelMsg::ExitStatus { exit_status } => {
                                debug!("{} Shell exited with status code: {}", io_task_device_addr, exit_status);
                                let _ = channel.eof().await;
                                break;
                            }
                            ChannelMsg::Eof => {
                                debug!("{} Shell sent EOF.", io_task_device_addr);
                                break;
                            }
                            _ => {}
                        }
                    }
                    else => break,
                }
            }
            debug!("{} SSH I/O task ended.", io_task_device_addr);
        });

        Ok((sender_to_shell, receiver_from_shell))
    }

    /// Prepares the CLI of a started shell, closing the shell on failure.
    async fn finish_open(
        &self,
        mut shell: Shell,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<Shell, WlcError> {
        let result = match tokio::time::timeout_at(deadline, self.prepare(&mut shell)).await {
            Ok(result) => result,
            Err(_) => Err(WlcError::ConnectTimeout(timeout.as_secs())),
        };
        match result {
            Ok(()) => Ok(shell),
            Err(err) => {
                debug!("{} shell setup failed: {}", self.device_addr, err);
                shell.close(&self.device_addr).await;
                Err(err)
            }
        }
    }

    /// Waits for the first prompt, enters enable mode and turns paging off.
    async fn prepare(&self, shell: &mut Shell) -> Result<(), WlcError> {
        let mut banner = String::new();
        shell.read_until_prompt(&mut banner, None).await?;
        debug!("{} initial prompt {:?}", self.device_addr, shell.prompt);

        if let Some(enable) = self.target.enable_password.as_deref()
            && shell.prompt.ends_with('>')
        {
            let mut output = String::new();
            shell.sender.send("enable\n".to_string()).await?;
            shell.read_until_prompt(&mut output, Some(enable)).await?;
            if !shell.prompt.ends_with('#') {
                return Err(WlcError::CommandRejected(format!(
                    "enable refused on {}",
                    self.device_addr
                )));
            }
        }

        let mut output = String::new();
        shell.sender.send("no paging\n".to_string()).await?;
        shell.read_until_prompt(&mut output, None).await?;
        Ok(())
    }
}

async fn disconnect_client(client: &Client, device_addr: &str) {
    if let Err(e) = client.disconnect().await {
        warn!("{} disconnect error: {:?}", device_addr, e);
    }
}

impl Shell {
    /// Reads shell output into `output` until a prompt arrives.
    ///
    /// Pagers are answered with a space; a password prompt is answered with
    /// `password` when one is given.
    async fn read_until_prompt(
        &mut self,
        output: &mut String,
        password: Option<&str>,
    ) -> Result<Exchange, WlcError> {
        let mut line_buffer = String::new();
        let mut rejected = None;

        loop {
            let Some(data) = self.recv.recv().await else {
                return Err(WlcError::ChannelDisconnect);
            };
            trace!("{:?}", data);
            line_buffer.push_str(&data);

            while let Some(newline_pos) = line_buffer.find('\n') {
                let line = line_buffer.drain(..=newline_pos).collect::<String>();
                let line = CONTROL_PREFIX_RE.replace(&line, "");
                let trimmed_line = line.trim_end();
                if MORE_RE.is_match(trimmed_line) {
                    continue;
                }
                if rejected.is_none() && ERROR_RE.is_match(trimmed_line) {
                    rejected = Some(trimmed_line.to_string());
                }
                output.push_str(trimmed_line);
                output.push('\n');
            }

            if line_buffer.is_empty() {
                continue;
            }
            if MORE_RE.is_match(&line_buffer) {
                line_buffer.clear();
                self.sender.send(" ".to_string()).await?;
                continue;
            }

            let pending = CONTROL_PREFIX_RE.replace(&line_buffer, "").into_owned();
            if PROMPT_RE.is_match(pending.trim_end()) {
                self.prompt = pending.trim().to_string();
                return Ok(Exchange { rejected });
            }
            if let Some(password) = password
                && PASSWORD_RE.is_match(&pending)
            {
                line_buffer.clear();
                trace!("Input required: password");
                self.sender.send(format!("{password}\n")).await?;
            }
        }
    }

    /// Sends `exit`, then disconnects the SSH client.
    async fn close(mut self, device_addr: &str) {
        debug!("Safely closing SSH connection {}...", device_addr);

        self.recv.close();
        if self.client.as_ref().is_none_or(|client| !client.is_closed()) {
            if let Err(e) = self.sender.send("exit\n".to_string()).await {
                debug!("Failed to send exit command: {:?}", e);
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        if let Some(client) = self.client.take() {
            disconnect_client(&client, device_addr).await;
        }
        debug!("SSH connection {} closed", device_addr);
    }
}

#[async_trait]
impl Session for SshSession {
    async fn connect(&mut self, timeout: Duration) -> Result<(), WlcError> {
        if self.is_connected() {
            return Ok(());
        }
        self.close_shell().await;

        let deadline = Instant::now() + timeout;
        let shell = self.open(deadline, timeout).await?;
        debug!("{} session ready", self.device_addr);
        self.shell = Some(shell);
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<String, WlcError> {
        let timeout = self.command_timeout;
        let shell = self.shell.as_mut().ok_or(WlcError::NotConnected)?;

        // Drop anything left over from the previous command.
        while shell.recv.try_recv().is_ok() {}

        if let Err(e) = shell.sender.send(format!("{command}\n")).await {
            self.close_shell().await;
            return Err(e.into());
        }

        let mut output = String::new();
        let result =
            tokio::time::timeout(timeout, shell.read_until_prompt(&mut output, None)).await;
        let exchange = match result {
            Ok(Ok(exchange)) => exchange,
            Ok(Err(err)) => {
                self.close_shell().await;
                return Err(err);
            }
            Err(_) => {
                warn!("{} '{}' timed out, closing shell", self.device_addr, command);
                self.close_shell().await;
                return Err(WlcError::ExecTimeout(output));
            }
        };
        if let Some(line) = exchange.rejected {
            return Err(WlcError::CommandRejected(format!("{command}: {line}")));
        }

        // Remove the echoed command from the beginning of the output
        let content = match output.split_once('\n') {
            Some((first, rest)) if first.trim() == command.trim() => rest,
            _ => output.as_str(),
        };
        Ok(content.to_string())
    }

    async fn disconnect(&mut self) {
        self.close_shell().await;
    }

    fn target(&self) -> &str {
        &self.device_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_pattern_matches_controller_prompts() {
        for prompt in ["(wlc1) >", "(wlc1) #", "(wlc1) (config) #", "(MM) [mynode] #"] {
            assert!(PROMPT_RE.is_match(prompt), "{prompt}");
        }
        assert!(!PROMPT_RE.is_match("Name  Group  AP Type"));
    }

    #[test]
    fn error_pattern_matches_rejections() {
        assert!(ERROR_RE.is_match("% Invalid input detected at '^' marker."));
        assert!(ERROR_RE.is_match("% Parse error"));
        assert!(!ERROR_RE.is_match("AP is down"));
    }

    #[test]
    fn control_prefix_is_stripped() {
        assert_eq!(CONTROL_PREFIX_RE.replace("\r\rap1 up", ""), "ap1 up");
        assert_eq!(CONTROL_PREFIX_RE.replace("\u{8}\u{8}ap1", ""), "ap1");
    }

    #[test]
    fn target_names_user_host_and_port() {
        let session = SshSession::new(
            SshTarget::new("admin", "10.1.1.5", "secret").with_enable_password("enable"),
            ConnectionSecurityOptions::default(),
        );
        assert_eq!(session.target(), "admin@10.1.1.5:22");
        assert!(!session.is_connected());
        assert_eq!(session.prompt(), None);
    }

    #[tokio::test]
    async fn send_command_requires_connection() {
        let mut session = SshSession::new(
            SshTarget::new("admin", "10.1.1.5", "secret"),
            ConnectionSecurityOptions::default(),
        );
        assert!(matches!(
            session.send_command("show ap database long").await,
            Err(WlcError::NotConnected)
        ));
        session.disconnect().await;
    }

    /// Session whose shell runs over in-memory channels: the receiver sees
    /// what is typed and the sender plays the controller.
    fn session_with_channels(
        command_timeout: Duration,
    ) -> (SshSession, Receiver<String>, Sender<String>) {
        let (sender, typed) = mpsc::channel(16);
        let (output, recv) = mpsc::channel(16);
        let mut session = SshSession::new(
            SshTarget::new("admin", "10.1.1.5", "secret"),
            ConnectionSecurityOptions::default(),
        )
        .with_command_timeout(command_timeout);
        session.shell = Some(Shell {
            client: None,
            sender,
            recv,
            prompt: "(wlc1) #".to_string(),
        });
        (session, typed, output)
    }

    #[tokio::test]
    async fn command_output_excludes_echo_and_prompt() {
        let (mut session, mut typed, output) = session_with_channels(Duration::from_secs(1));
        let controller = tokio::spawn(async move {
            let command = typed.recv().await;
            output
                .send("show license\r\nLicense Table\r\n(wlc1) #".to_string())
                .await
                .expect("reply");
            (command, typed, output)
        });

        let content = session.send_command("show license").await.expect("output");
        assert_eq!(content, "License Table\n");
        assert_eq!(session.prompt(), Some("(wlc1) #"));

        let (command, _typed, _output) = controller.await.expect("join");
        assert_eq!(command.as_deref(), Some("show license\n"));
    }

    #[tokio::test]
    async fn timed_out_command_closes_the_shell() {
        let (mut session, mut typed, output) = session_with_channels(Duration::from_millis(50));
        let controller = tokio::spawn(async move {
            let command = typed.recv().await;
            output
                .send("show ap database long\r\nAP Database\r\n".to_string())
                .await
                .expect("partial output");
            let mut after = Vec::new();
            while let Some(data) = typed.recv().await {
                after.push(data);
            }
            (command, after, output)
        });

        match session.send_command("show ap database long").await {
            Err(WlcError::ExecTimeout(partial)) => assert!(partial.contains("AP Database")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(session.prompt(), None);
        assert!(matches!(
            session.send_command("show ap port status ap-name ap105-lobby").await,
            Err(WlcError::NotConnected)
        ));

        let (command, after, _output) = controller.await.expect("join");
        assert_eq!(command.as_deref(), Some("show ap database long\n"));
        assert_eq!(after, vec!["exit\n".to_string()]);
    }

    #[tokio::test]
    async fn lost_channel_during_setup_closes_the_shell() {
        let (mut session, mut typed, output) = session_with_channels(Duration::from_secs(1));
        let shell = session.shell.take().expect("shell");
        drop(output);

        let deadline = Instant::now() + Duration::from_secs(1);
        let result = session
            .finish_open(shell, deadline, Duration::from_secs(1))
            .await;

        assert!(matches!(result, Err(WlcError::ChannelDisconnect)));
        assert_eq!(typed.recv().await.as_deref(), Some("exit\n"));
        assert_eq!(typed.recv().await, None);
    }

    #[tokio::test]
    async fn setup_past_deadline_closes_the_shell() {
        let (mut session, mut typed, _output) = session_with_channels(Duration::from_secs(1));
        let shell = session.shell.take().expect("shell");

        let deadline = Instant::now() + Duration::from_millis(50);
        let result = session
            .finish_open(shell, deadline, Duration::from_secs(3))
            .await;

        assert!(matches!(result, Err(WlcError::ConnectTimeout(3))));
        assert_eq!(typed.recv().await.as_deref(), Some("exit\n"));
        assert_eq!(typed.recv().await, None);
    }
}
