//! Vendor adapter construction.
//!
//! Construction is pure: no I/O happens until [`Session::connect`] is
//! called on the returned adapter, so a factory error can never leave a
//! half-open session behind.

use std::time::Duration;

use crate::adapter::huawei::HuaweiAdapter;
use crate::adapter::zte::ZteAdapter;
use crate::adapter::OltAdapter;
use crate::device::{Addressing, Credentials, Vendor};
use crate::error::Result;
use crate::transport::{Transport, TransportConfig};

/// Optional knobs for [`create_adapter`]; the vendor default fills
/// anything left unset.
#[derive(Default)]
pub struct AdapterOptions {
    port: Option<u16>,
    model: Option<String>,
    addressing: Option<Addressing>,
    connect_timeout: Option<Duration>,
    command_timeout: Option<Duration>,
    transport: Option<Box<dyn Transport>>,
}

impl AdapterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = Some(addressing);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    /// Supply the transport instead of letting the vendor open SSH/telnet.
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

/// Vendor names [`create_adapter`] accepts, matched case-insensitively.
pub fn supported_vendors() -> &'static [&'static str] {
    &["huawei", "zte"]
}

/// Build the adapter for `vendor` (`UnsupportedVendor` when unknown).
pub fn create_adapter(
    vendor: &str,
    host: &str,
    credentials: Credentials,
    options: AdapterOptions,
) -> Result<Box<dyn OltAdapter>> {
    let vendor: Vendor = vendor.parse()?;

    let port = options.port.unwrap_or_else(|| vendor.default_port());
    let mut config = TransportConfig::new(host, port, credentials);
    if let Some(timeout) = options.connect_timeout {
        config = config.with_connect_timeout(timeout);
    }
    if let Some(timeout) = options.command_timeout {
        config = config.with_command_timeout(timeout);
    }

    match vendor {
        Vendor::Huawei => {
            let adapter = match options.transport {
                Some(transport) => HuaweiAdapter::with_transport(
                    transport,
                    host,
                    options.model,
                    options.addressing,
                ),
                None => HuaweiAdapter::over_ssh(config, options.model, options.addressing)?,
            };
            Ok(Box::new(adapter))
        }
        Vendor::Zte => {
            let adapter = match options.transport {
                Some(transport) => {
                    ZteAdapter::with_transport(transport, host, options.model, options.addressing)
                }
                None => ZteAdapter::over_telnet(config, options.model, options.addressing)?,
            };
            Ok(Box::new(adapter))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::adapter::Session;
    use crate::error::Error;
    use crate::transport::mock::MockTransport;

    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("admin", "pw")
    }

    #[test]
    fn test_vendor_matching_is_case_insensitive() {
        for name in ["huawei", "HUAWEI", "Zte", "zte"] {
            let adapter =
                create_adapter(name, "10.0.0.1", credentials(), AdapterOptions::new()).unwrap();
            assert!(!adapter.is_connected());
        }
    }

    #[test]
    fn test_unknown_vendor_is_rejected() {
        match create_adapter("cisco", "10.0.0.1", credentials(), AdapterOptions::new()) {
            Err(Error::UnsupportedVendor { vendor }) => assert_eq!(vendor, "cisco"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_supported_vendor_names_parse() {
        for name in supported_vendors() {
            assert!(name.parse::<Vendor>().is_ok());
        }
    }

    #[test]
    fn test_construction_reports_vendor_and_host() {
        let adapter =
            create_adapter("zte", "192.0.2.7", credentials(), AdapterOptions::new()).unwrap();
        assert_eq!(adapter.vendor(), Vendor::Zte);
        assert_eq!(adapter.host(), "192.0.2.7");
    }

    #[tokio::test]
    async fn test_transport_override_drives_the_adapter() {
        let options =
            AdapterOptions::new().with_transport(Box::new(MockTransport::new().with_response(
                "display board 0",
                "Board 0 online",
            )));
        let mut adapter = create_adapter("huawei", "10.0.0.1", credentials(), options).unwrap();

        assert!(adapter.connect().await);
        let output = adapter.execute_custom_command("display board 0").await.unwrap();
        assert_eq!(output, "Board 0 online");
    }
}
