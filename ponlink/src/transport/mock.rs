//! Scripted transport for adapter tests.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::Transport;
use crate::error::{CommandError, ConnectionError, Result};

/// Replays canned responses and records every command sent.
///
/// Responses are keyed by the exact command text, so adapter tests also
/// pin down template rendering end to end.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    connected: bool,
    fail_connect: bool,
    responses: HashMap<String, String>,
    default_response: String,
    sent: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Transport whose `connect` always fails.
    pub(crate) fn failing_connect() -> Self {
        Self {
            fail_connect: true,
            ..Self::default()
        }
    }

    pub(crate) fn with_response(
        mut self,
        command: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.responses.insert(command.into(), response.into());
        self
    }

    pub(crate) fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Shared handle to the command log; keep one before boxing the mock.
    pub(crate) fn sent_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.fail_connect {
            return Err(ConnectionError::ConnectFailed {
                host: "mock".to_string(),
                port: 0,
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "scripted failure"),
            }
            .into());
        }
        self.connected = true;
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<String> {
        if !self.connected {
            return Err(CommandError::NotConnected.into());
        }
        self.sent
            .lock()
            .expect("mock sent log lock")
            .push(command.to_string());
        Ok(self
            .responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone()))
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
