//! Transport session configuration.

use std::time::Duration;

use secrecy::SecretString;

use crate::device::Credentials;

/// Configuration for one interactive CLI session.
///
/// Connect and per-command timeouts are first-class: device CLIs stall,
/// and every read loop in this crate runs against a deadline.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// Management port.
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Password; redacted in `Debug`, exposed only at the login exchange.
    pub password: SecretString,

    /// Timeout covering TCP/SSH establishment, login, and the first prompt.
    pub connect_timeout: Duration,

    /// Timeout for one command round-trip (send to prompt).
    pub command_timeout: Duration,

    /// Terminal width for PTY. Wide, so commands never wrap into the echo.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// How many bytes from the buffer tail to search for the prompt.
    pub search_depth: usize,

    /// Prompt pattern override; `None` uses the vendor-neutral default.
    pub prompt_pattern: Option<String>,
}

impl TransportConfig {
    /// Create a configuration with default timeouts and terminal geometry.
    pub fn new(host: impl Into<String>, port: u16, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            port,
            username: credentials.username,
            password: credentials.password,
            connect_timeout: Duration::from_secs(15),
            command_timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            search_depth: super::prompt::DEFAULT_SEARCH_DEPTH,
            prompt_pattern: None,
        }
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-command timeout.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Set the prompt search depth.
    pub fn with_search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }

    /// Set a vendor prompt pattern.
    pub fn with_prompt_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.prompt_pattern = Some(pattern.into());
        self
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
