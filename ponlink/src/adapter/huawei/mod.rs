//! Huawei SmartAX (MA5800 family) adapter, driven over SSH.
//!
//! SmartAX addresses ONTs by frame/slot; GPON-index addressing from a
//! caller is rejected before any command is sent.

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
use crate::transport::{SshTransport, Transport, TransportConfig};

/// Vendor hooks for Huawei SmartAX OLTs.
#[derive(Debug, Clone, Copy, Default)]
pub struct HuaweiProfile;

impl VendorProfile for HuaweiProfile {
    fn vendor(&self) -> Vendor {
        Vendor::Huawei
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
            Addressing::FrameSlot { frame, slot } => {
                Ok(CommandParams::new().set("frame", frame).set("slot", slot))
            }
            Addressing::GponIndex { .. } => Err(Error::invalid_argument(
                "huawei adapters address ONTs by frame/slot, not gpon index",
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

/// Huawei adapter: the generic CLI adapter with the SmartAX profile.
pub type HuaweiAdapter = CliAdapter<HuaweiProfile>;

impl HuaweiAdapter {
    /// Adapter over SSH with the vendor defaults for anything not given.
    pub fn over_ssh(
        config: TransportConfig,
        model: Option<String>,
        addressing: Option<Addressing>,
    ) -> Result<Self> {
        let host = config.host.clone();
        let transport = SshTransport::new(config)?;
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
            HuaweiProfile,
            transport,
            host,
            model.unwrap_or_else(|| Vendor::Huawei.default_model().to_string()),
            addressing.unwrap_or_else(|| Addressing::frame_slot("0", "0")),
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
    fn test_profile_rejects_gpon_index_addressing() {
        let wrong = Addressing::gpon_index("1/2/3");
        match HuaweiProfile.addressing_params(&wrong) {
            Err(Error::InvalidArgument { .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_frame_slot_params() {
        let params = HuaweiProfile
            .addressing_params(&Addressing::frame_slot("0", "2"))
            .unwrap();
        assert_eq!(params.get("frame"), Some("0"));
        assert_eq!(params.get("slot"), Some("2"));
    }

    #[test]
    fn test_over_ssh_defaults() {
        let config = TransportConfig::new("10.0.0.1", 22, Credentials::new("admin", "pw"));
        let adapter = HuaweiAdapter::over_ssh(config, None, None).unwrap();
        assert_eq!(adapter.model(), "MA5800");
        assert!(!adapter.is_connected());
    }
}
