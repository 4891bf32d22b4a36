//! SSH transport implementation using russh.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use russh::{Channel, ChannelMsg, Disconnect};
use secrecy::ExposeSecret;

use super::Transport;
use super::config::TransportConfig;
use super::prompt::{self, PromptBuffer};
use crate::error::{CommandError, ConnectionError, Result};

/// SSH transport: russh client with one interactive PTY shell channel.
pub struct SshTransport {
    config: TransportConfig,
    session: Option<Handle<ClientHandler>>,
    channel: Option<Channel<Msg>>,
    buffer: PromptBuffer,
    prompt: regex::bytes::Regex,
}

impl SshTransport {
    /// Prepare a transport. No I/O happens until [`Transport::connect`].
    pub fn new(config: TransportConfig) -> Result<Self> {
        let pattern = config
            .prompt_pattern
            .as_deref()
            .unwrap_or(prompt::DEFAULT_PROMPT_PATTERN);
        Ok(Self {
            prompt: prompt::compile_prompt(pattern)?,
            buffer: PromptBuffer::new(config.search_depth),
            session: None,
            channel: None,
            config,
        })
    }

    /// Accumulate channel output until the prompt shows in the buffer tail.
    async fn read_until_prompt(&mut self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let channel = self.channel.as_mut().ok_or(CommandError::NotConnected)?;

        loop {
            if self.buffer.tail_contains(&self.prompt) {
                return Ok(());
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Err(CommandError::Timeout(timeout).into());
            }
            let remaining = deadline - now;

            match tokio::time::timeout(remaining, channel.wait()).await {
                Err(_) => return Err(CommandError::Timeout(timeout).into()),
                Ok(None) => return Err(CommandError::SessionClosed.into()),
                Ok(Some(ChannelMsg::Data { ref data })) => self.buffer.extend(data),
                Ok(Some(ChannelMsg::ExtendedData { ref data, .. })) => self.buffer.extend(data),
                Ok(Some(ChannelMsg::Eof))
                | Ok(Some(ChannelMsg::Close))
                | Ok(Some(ChannelMsg::ExitStatus { .. })) => {
                    return Err(CommandError::SessionClosed.into());
                }
                Ok(Some(_)) => {}
            }
        }
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        self.session = None;
        self.channel = None;
        self.buffer.clear();

        // Idle lifetime belongs to the connection pool, so no russh
        // inactivity timeout here.
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: None,
            ..Default::default()
        });
        let handler = ClientHandler {
            host: self.config.host.clone(),
        };

        let mut session = tokio::time::timeout(
            self.config.connect_timeout,
            client::connect(
                ssh_config,
                (self.config.host.as_str(), self.config.port),
                handler,
            ),
        )
        .await
        .map_err(|_| ConnectionError::ConnectTimeout(self.config.connect_timeout))?
        .map_err(ConnectionError::Ssh)?;

        let authenticated = session
            .authenticate_password(&self.config.username, self.config.password.expose_secret())
            .await
            .map_err(ConnectionError::Ssh)?
            .success();
        if !authenticated {
            return Err(ConnectionError::AuthenticationFailed {
                user: self.config.username.clone(),
            }
            .into());
        }

        let channel = session
            .channel_open_session()
            .await
            .map_err(ConnectionError::Ssh)?;
        channel
            .request_pty(
                true,
                "xterm",
                self.config.terminal_width,
                self.config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(ConnectionError::Ssh)?;
        channel
            .request_shell(true)
            .await
            .map_err(ConnectionError::Ssh)?;

        self.session = Some(session);
        self.channel = Some(channel);

        // Swallow the login banner up to the first prompt.
        self.read_until_prompt(self.config.connect_timeout)
            .await
            .map_err(|_| ConnectionError::NoPrompt {
                host: self.config.host.clone(),
            })?;
        self.buffer.clear();

        debug!("{}: SSH session established", self.config.host);
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<String> {
        if !self.is_connected() {
            return Err(CommandError::NotConnected.into());
        }
        self.buffer.clear();

        let line = format!("{command}\n");
        self.channel
            .as_mut()
            .ok_or(CommandError::NotConnected)?
            .data(line.as_bytes())
            .await
            .map_err(CommandError::Ssh)?;

        self.read_until_prompt(self.config.command_timeout).await?;
        Ok(self.buffer.take_response(command, &self.prompt))
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.channel = None;
        if let Some(session) = self.session.take() {
            if let Err(e) = session
                .disconnect(Disconnect::ByApplication, "", "en")
                .await
            {
                debug!("{}: disconnect error ignored: {}", self.config.host, e);
            }
        }
        self.buffer.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.channel.is_some()
            && self
                .session
                .as_ref()
                .is_some_and(|session| !session.is_closed())
    }
}

/// russh client handler.
///
/// Host keys are accepted as presented; device identity is pinned by
/// management address in the device registry, not by key.
struct ClientHandler {
    host: String,
}

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        debug!("{}: accepting presented host key", self.host);
        Ok(true)
    }
}

impl std::fmt::Debug for SshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshTransport")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::device::Credentials;
    use crate::error::Error;

    use super::*;

    fn test_config() -> TransportConfig {
        TransportConfig::new("192.0.2.1", 22, Credentials::new("admin", "pw"))
    }

    #[test]
    fn test_new_is_pure_and_disconnected() {
        let transport = SshTransport::new(test_config()).unwrap();
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_bad_prompt_pattern_rejected_before_io() {
        let config = test_config().with_prompt_pattern("[unclosed");
        match SshTransport::new(config) {
            Err(Error::InvalidArgument { .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_before_connect_is_not_connected() {
        let mut transport = SshTransport::new(test_config()).unwrap();
        match transport.send_command("display board 0").await {
            Err(Error::Command(CommandError::NotConnected)) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
