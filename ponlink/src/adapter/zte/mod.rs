//! ZTE ZXA10 (C320 family) adapter, driven over telnet.
//!
//! ZXA10 addresses ONUs by gpon index (`rack/shelf/port`); frame/slot
//! addressing from a caller is rejected before any command is sent.

pub(crate) mod commands;
mod parse;

use indexmap::IndexMap;
use regex::Regex;

use crate::adapter::types::{OntAlert, OntInfo, OntStatus, SignalSample};
use crate::adapter::{CliAdapter, VendorProfile};
use crate::device::{Addressing, Vendor};
use crate::error::{Error, Result};
use crate::parse as shared;
use crate::template::{CommandParams, CommandTemplateRegistry};
use crate::transport::{TelnetTransport, Transport, TransportConfig};

/// Vendor hooks for ZTE ZXA10 OLTs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZteProfile;

impl VendorProfile for ZteProfile {
    fn vendor(&self) -> Vendor {
        Vendor::Zte
    }

    fn setup_commands(&self) -> &'static [&'static str] {
        parse::SETUP_COMMANDS
    }

    fn failed_when(&self) -> &'static [&'static str] {
        parse::FAILED_WHEN
    }

    fn not_found_when(&self) -> &'static [&'static str] {
        parse::NOT_FOUND_WHEN
    }

    fn addressing_params(&self, addressing: &Addressing) -> Result<CommandParams> {
        match addressing {
            Addressing::GponIndex { index } => Ok(CommandParams::new().set("index", index)),
            Addressing::FrameSlot { .. } => Err(Error::invalid_argument(
                "zte adapters address ONUs by gpon index, not frame/slot",
            )),
        }
    }

    fn provisioning_id_pattern(&self) -> &'static Regex {
        &parse::ONT_ID
    }

    fn provisioning_success_tokens(&self) -> &'static [&'static str] {
        parse::SUCCESS_TOKENS
    }

    fn parse_ont_list(&self, output: &str) -> Vec<OntInfo> {
        parse::parse_ont_list(output)
    }

    fn ont_from_fields(&self, ont_id: &str, fields: IndexMap<String, String>) -> OntInfo {
        parse::ont_from_fields(ont_id, fields)
    }

    fn parse_status(&self, ont_id: &str, output: &str) -> OntStatus {
        parse::parse_status(ont_id, output)
    }

    fn parse_signal_history(&self, output: &str) -> Vec<SignalSample> {
        shared::parse_signal_rows(output)
    }

    fn parse_alerts(&self, output: &str) -> Vec<OntAlert> {
        shared::parse_alert_rows(output)
    }
}

/// ZTE adapter: the generic CLI adapter with the ZXA10 profile.
pub type ZteAdapter = CliAdapter<ZteProfile>;

impl ZteAdapter {
    /// Adapter over telnet with the vendor defaults for anything not given.
    pub fn over_telnet(
        config: TransportConfig,
        model: Option<String>,
        addressing: Option<Addressing>,
    ) -> Result<Self> {
        let host = config.host.clone();
        let transport = TelnetTransport::new(config)?;
        Ok(Self::with_transport(
            Box::new(transport),
            host,
            model,
            addressing,
        ))
    }

    /// Adapter over a caller-supplied transport.
    pub fn with_transport(
        transport: Box<dyn Transport>,
        host: impl Into<String>,
        model: Option<String>,
        addressing: Option<Addressing>,
    ) -> Self {
        CliAdapter::new(
            ZteProfile,
            transport,
            host,
            model.unwrap_or_else(|| Vendor::Zte.default_model().to_string()),
            addressing.unwrap_or_else(|| Addressing::gpon_index("1/1/1")),
            CommandTemplateRegistry::shared(),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::adapter::Session;
    use crate::device::Credentials;

    use super::*;

    #[test]
    fn test_profile_rejects_frame_slot_addressing() {
        let wrong = Addressing::frame_slot("0", "1");
        match ZteProfile.addressing_params(&wrong) {
            Err(Error::InvalidArgument { .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_gpon_index_params() {
        let params = ZteProfile
            .addressing_params(&Addressing::gpon_index("1/2/3"))
            .unwrap();
        assert_eq!(params.get("index"), Some("1/2/3"));
    }

    #[test]
    fn test_over_telnet_defaults() {
        let config = TransportConfig::new("10.0.0.2", 23, Credentials::new("admin", "pw"));
        let adapter = ZteAdapter::over_telnet(config, None, None).unwrap();
        assert_eq!(adapter.model(), "C320");
        assert!(!adapter.is_connected());
    }
}
