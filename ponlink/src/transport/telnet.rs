//! Telnet transport over a plain TCP stream.
//!
//! Implements just enough of RFC 854 for OLT management shells: every
//! option the peer offers or demands is refused, subnegotiations are
//! skipped, and the remaining byte stream feeds the prompt buffer.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use log::debug;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use secrecy::ExposeSecret;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::Transport;
use super::config::TransportConfig;
use super::prompt::{self, PromptBuffer};
use crate::error::{CommandError, ConnectionError, Result};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

static USERNAME_PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(username|login)\s*:\s*$").expect("username prompt pattern"));
static PASSWORD_PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)password\s*:\s*$").expect("password prompt pattern"));

/// Telnet transport with username/password login-prompt handling.
pub struct TelnetTransport {
    config: TransportConfig,
    stream: Option<TcpStream>,
    buffer: PromptBuffer,
    prompt: Regex,
    negotiation: OptionRefuser,
}

impl TelnetTransport {
    /// Prepare a transport. No I/O happens until [`Transport::connect`].
    pub fn new(config: TransportConfig) -> Result<Self> {
        let pattern = config
            .prompt_pattern
            .as_deref()
            .unwrap_or(prompt::DEFAULT_PROMPT_PATTERN);
        Ok(Self {
            prompt: prompt::compile_prompt(pattern)?,
            buffer: PromptBuffer::new(config.search_depth),
            stream: None,
            negotiation: OptionRefuser::default(),
            config,
        })
    }

    /// Read until `pattern` shows in the buffer tail, answering telnet
    /// negotiations along the way.
    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut chunk = BytesMut::with_capacity(4096);

        loop {
            if self.buffer.tail_contains(pattern) {
                return Ok(());
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Err(CommandError::Timeout(timeout).into());
            }

            let stream = self.stream.as_mut().ok_or(CommandError::NotConnected)?;
            chunk.clear();
            let n = tokio::time::timeout(deadline - now, stream.read_buf(&mut chunk))
                .await
                .map_err(|_| CommandError::Timeout(timeout))?
                .map_err(CommandError::Io)?;
            if n == 0 {
                return Err(CommandError::SessionClosed.into());
            }

            let mut cleaned = Vec::with_capacity(n);
            let mut replies = Vec::new();
            self.negotiation.process(&chunk, &mut cleaned, &mut replies);
            if !replies.is_empty() {
                stream.write_all(&replies).await.map_err(CommandError::Io)?;
            }
            self.buffer.extend(&cleaned);
        }
    }

    async fn send_line(&mut self, line: &str) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(CommandError::NotConnected)?;
        stream
            .write_all(line.as_bytes())
            .await
            .map_err(CommandError::Io)?;
        stream.write_all(b"\r\n").await.map_err(CommandError::Io)?;
        Ok(())
    }

    /// Username/password dialogue up to the first CLI prompt.
    async fn login(&mut self) -> Result<()> {
        let timeout = self.config.connect_timeout;
        let host = self.config.host.clone();

        self.read_until(&USERNAME_PROMPT, timeout)
            .await
            .map_err(|_| ConnectionError::NoPrompt { host: host.clone() })?;
        let username = self.config.username.clone();
        self.send_line(&username).await?;

        self.read_until(&PASSWORD_PROMPT, timeout)
            .await
            .map_err(|_| ConnectionError::NoPrompt { host: host.clone() })?;
        let password = self.config.password.expose_secret().to_string();
        self.send_line(&password).await?;

        // A re-presented login prompt after the password means rejection;
        // ZTE shells just print it again instead of an error line.
        let prompt = self.prompt.clone();
        match self.read_until(&prompt, timeout).await {
            Ok(()) => {
                self.buffer.clear();
                Ok(())
            }
            Err(_) => {
                let rejected = self.buffer.tail_contains(&USERNAME_PROMPT)
                    || self.buffer.tail_contains(&PASSWORD_PROMPT);
                if rejected {
                    Err(ConnectionError::AuthenticationFailed {
                        user: self.config.username.clone(),
                    }
                    .into())
                } else {
                    Err(ConnectionError::NoPrompt { host }.into())
                }
            }
        }
    }
}

#[async_trait]
impl Transport for TelnetTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        self.stream = None;
        self.buffer.clear();
        self.negotiation = OptionRefuser::default();

        let stream = tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect((self.config.host.as_str(), self.config.port)),
        )
        .await
        .map_err(|_| ConnectionError::ConnectTimeout(self.config.connect_timeout))?
        .map_err(|e| ConnectionError::ConnectFailed {
            host: self.config.host.clone(),
            port: self.config.port,
            source: e,
        })?;
        self.stream = Some(stream);

        if let Err(e) = self.login().await {
            self.stream = None;
            self.buffer.clear();
            return Err(e);
        }

        debug!("{}: telnet session established", self.config.host);
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<String> {
        if !self.is_connected() {
            return Err(CommandError::NotConnected.into());
        }
        self.buffer.clear();
        self.send_line(command).await?;

        let prompt = self.prompt.clone();
        self.read_until(&prompt, self.config.command_timeout).await?;
        Ok(self.buffer.take_response(command, &prompt))
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("{}: shutdown error ignored: {}", self.config.host, e);
            }
        }
        self.buffer.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

#[derive(Debug, Default, Clone, Copy)]
enum TelnetState {
    #[default]
    Data,
    Command,
    Negotiate(u8),
    Subnegotiation,
    SubnegotiationCommand,
}

/// RFC 854 scanner that refuses every option.
///
/// State survives across reads, so sequences split over TCP segment
/// boundaries parse the same as contiguous ones.
#[derive(Debug, Default)]
struct OptionRefuser {
    state: TelnetState,
}

impl OptionRefuser {
    /// Feed raw bytes: plain data goes to `output`, refusals to `replies`.
    fn process(&mut self, input: &[u8], output: &mut Vec<u8>, replies: &mut Vec<u8>) {
        for &byte in input {
            self.state = match self.state {
                TelnetState::Data => match byte {
                    IAC => TelnetState::Command,
                    _ => {
                        output.push(byte);
                        TelnetState::Data
                    }
                },
                TelnetState::Command => match byte {
                    WILL | WONT | DO | DONT => TelnetState::Negotiate(byte),
                    SB => TelnetState::Subnegotiation,
                    IAC => {
                        // Escaped 0xff data byte.
                        output.push(IAC);
                        TelnetState::Data
                    }
                    _ => TelnetState::Data,
                },
                TelnetState::Negotiate(verb) => {
                    match verb {
                        WILL => replies.extend_from_slice(&[IAC, DONT, byte]),
                        DO => replies.extend_from_slice(&[IAC, WONT, byte]),
                        // WONT/DONT confirm a refusal; no answer needed.
                        _ => {}
                    }
                    TelnetState::Data
                }
                TelnetState::Subnegotiation => match byte {
                    IAC => TelnetState::SubnegotiationCommand,
                    _ => TelnetState::Subnegotiation,
                },
                TelnetState::SubnegotiationCommand => match byte {
                    SE => TelnetState::Data,
                    _ => TelnetState::Subnegotiation,
                },
            };
        }
    }
}

impl std::fmt::Debug for TelnetTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetTransport")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("connected", &self.is_connected())
            .finish()
    }
}
