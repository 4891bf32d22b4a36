//! Interactive CLI transports.
//!
//! This layer owns connection setup, authentication, and the
//! prompt-delimited request/response cycle. Vendor adapters sit on top and
//! only ever see cleaned command output.

pub mod config;
pub mod prompt;
mod ssh;
mod telnet;

#[cfg(test)]
pub(crate) mod mock;

pub use config::TransportConfig;
pub use prompt::PromptBuffer;
pub use ssh::SshTransport;
pub use telnet::TelnetTransport;

use async_trait::async_trait;

use crate::error::Result;

/// One interactive CLI session to a device.
#[async_trait]
pub trait Transport: Send {
    /// Establish the session: connect, authenticate, wait for the first
    /// prompt. Idempotent; reconnects a dropped session.
    async fn connect(&mut self) -> Result<()>;

    /// Send one command and return its output with the echoed command,
    /// trailing prompt, and ANSI sequences removed.
    async fn send_command(&mut self, command: &str) -> Result<String>;

    /// Tear the session down. Safe to call when already disconnected.
    async fn disconnect(&mut self) -> Result<()>;

    /// Local view of session health. `false` is definitive; `true` can
    /// still fail at the next command (the pool handles that case).
    fn is_connected(&self) -> bool;
}
