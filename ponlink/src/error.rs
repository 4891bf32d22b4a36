//! Error types for ponlink.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for ponlink operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Session establishment or reconnect failure
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Transport-level command failure
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// The vendor rejected provisioning, or the response could not be
    /// parsed as success
    #[error("provisioning error: {0}")]
    Provisioning(#[from] ProvisioningError),

    /// Command template lookup or formatting failure
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// The ONT does not exist within the addressed scope of this OLT
    #[error("ONT '{ont_id}' not found")]
    OntNotFound { ont_id: String },

    /// The vendor name did not match any supported adapter
    #[error("unsupported vendor '{vendor}'")]
    UnsupportedVendor { vendor: String },

    /// The pool is at capacity; it fails fast rather than queuing
    #[error("connection pool exhausted ({active} of {max} connections in use)")]
    PoolExhausted { active: usize, max: usize },

    /// A caller-supplied argument failed validation before any transport I/O
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

/// Session establishment errors (connect, authenticate, reconnect).
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to reach the device
    #[error("connection failed to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication rejected
    #[error("authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Connect did not complete in time
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// The device never presented a recognizable prompt after login
    #[error("no CLI prompt from {host} after login")]
    NoPrompt { host: String },

    /// A leased session was not live and its single (re)connect attempt
    /// at the pool boundary failed
    #[error("reconnect to {host} failed")]
    ReconnectFailed { host: String },

    /// The pool was shut down via `close_all`
    #[error("connection pool is closed")]
    PoolClosed,
}

/// Command execution errors on an established session.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Operation requires a connected session
    #[error("not connected - call connect() first")]
    NotConnected,

    /// SSH protocol error while sending or reading
    #[error("SSH error: {0}")]
    Ssh(russh::Error),

    /// I/O error on the transport
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The prompt was not seen before the per-command deadline
    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    /// The session closed while a command was in flight
    #[error("session closed by peer")]
    SessionClosed,
}

/// Provisioning response grammar failures.
///
/// The add-ONT response is parsed strictly: an unrecognized response is
/// always an error, never assumed success.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningError {
    /// The device reported success but no ONT id marker was present,
    /// so the assigned id cannot be known
    #[error("response reported success but carried no ONT id: {response:?}")]
    MissingOntId { response: String },

    /// The device rejected the request, or the response matched neither
    /// the success grammar nor a known failure
    #[error("provisioning rejected: {response:?}")]
    Rejected { response: String },
}

/// Command template registry errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// No template with this name exists for the vendor
    #[error("unknown command '{name}' for vendor {vendor}")]
    UnknownCommand { vendor: String, name: String },

    /// A placeholder in the template had no supplied value.
    /// Placeholders are never silently blanked.
    #[error("no value supplied for placeholder '{placeholder}' in command '{name}'")]
    MissingPlaceholder { placeholder: String, name: String },
}

impl Error {
    /// HTTP status the REST boundary maps this error to.
    ///
    /// | category | status |
    /// |----------|--------|
    /// | `Connection` | 503 |
    /// | `PoolExhausted` | 503 |
    /// | `OntNotFound` | 404 |
    /// | `Provisioning`, `InvalidArgument` | 400 |
    /// | `Command`, `Template`, `UnsupportedVendor` | 500 |
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Connection(_) | Error::PoolExhausted { .. } => 503,
            Error::OntNotFound { .. } => 404,
            Error::Provisioning(_) | Error::InvalidArgument { .. } => 400,
            Error::Command(_) | Error::Template(_) | Error::UnsupportedVendor { .. } => 500,
        }
    }

    /// Convenience constructor for argument validation failures.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Result type alias using ponlink's Error.
pub type Result<T> = std::result::Result<T, Error>;
