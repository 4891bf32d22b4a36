//! Generic CLI adapter parameterized by a vendor profile.
//!
//! The operation flow (validate, render a template, send, decide) is the
//! same for every vendor; what differs is the command dialect, the
//! addressing scheme, the failure markers, and the output formats. A
//! [`VendorProfile`] supplies exactly those pieces, and [`CliAdapter`]
//! carries them through the full [`OltAdapter`] surface.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use log::{debug, warn};
use regex::Regex;
use secrecy::ExposeSecret;

use super::types::{
    AlertType, OltInfo, OntAlert, OntInfo, OntIpConfig, OntLocation, OntStatus, RoutingMode,
    SignalSample, Tr069Config, VlanMode,
};
use super::{OltAdapter, Session};
use crate::device::{Addressing, Vendor};
use crate::error::{Error, Result};
use crate::parse;
use crate::template::{CommandParams, CommandTemplateRegistry};
use crate::transport::Transport;

/// Vendor-specific hooks consumed by [`CliAdapter`].
pub trait VendorProfile: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Commands run right after login: privilege escalation, paging off.
    fn setup_commands(&self) -> &'static [&'static str];

    /// Substrings (matched case-insensitively) that mark a command
    /// response as failed.
    fn failed_when(&self) -> &'static [&'static str];

    /// Substrings that mark a response as "this ONT does not exist".
    fn not_found_when(&self) -> &'static [&'static str];

    /// Map an addressing value to template parameters. The other vendor's
    /// variant is an `InvalidArgument`, raised before any I/O.
    fn addressing_params(&self, addressing: &Addressing) -> Result<CommandParams>;

    /// Pattern whose first capture group is the device-assigned ONT id in
    /// a provisioning response.
    fn provisioning_id_pattern(&self) -> &'static Regex;

    /// Tokens that claim success in a provisioning response. Without the
    /// id marker they produce `MissingOntId`, never an inferred success.
    fn provisioning_success_tokens(&self) -> &'static [&'static str];

    fn parse_ont_list(&self, output: &str) -> Vec<OntInfo>;

    /// Build an [`OntInfo`] from merged detail fields; keys without a
    /// dedicated slot go to `extra`.
    fn ont_from_fields(&self, ont_id: &str, fields: IndexMap<String, String>) -> OntInfo;

    fn parse_status(&self, ont_id: &str, output: &str) -> OntStatus;

    fn parse_signal_history(&self, output: &str) -> Vec<SignalSample>;

    fn parse_alerts(&self, output: &str) -> Vec<OntAlert>;
}

/// CLI adapter driving one device through a vendor profile.
pub struct CliAdapter<P: VendorProfile> {
    profile: P,
    transport: Box<dyn Transport>,
    registry: Arc<CommandTemplateRegistry>,
    host: String,
    model: String,
    default_addressing: Addressing,
}

impl<P: VendorProfile> CliAdapter<P> {
    pub fn new(
        profile: P,
        transport: Box<dyn Transport>,
        host: impl Into<String>,
        model: impl Into<String>,
        default_addressing: Addressing,
        registry: Arc<CommandTemplateRegistry>,
    ) -> Self {
        Self {
            profile,
            transport,
            registry,
            host: host.into(),
            model: model.into(),
            default_addressing,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn base_params(&self, addressing: Option<&Addressing>) -> Result<CommandParams> {
        self.profile
            .addressing_params(addressing.unwrap_or(&self.default_addressing))
    }

    fn effective_addressing(&self, addressing: Option<&Addressing>) -> Addressing {
        addressing
            .cloned()
            .unwrap_or_else(|| self.default_addressing.clone())
    }

    /// Render one template and send it. Only the command name is logged;
    /// rendered text may carry secrets.
    async fn run(&mut self, command: &str, params: &CommandParams) -> Result<String> {
        let rendered =
            self.registry
                .get_command(self.profile.vendor(), &self.model, command, params)?;
        debug!("{}: running '{}'", self.host, command);
        self.transport.send_command(&rendered).await
    }

    async fn run_bool(&mut self, command: &str, params: &CommandParams) -> Result<bool> {
        let response = self.run(command, params).await?;
        Ok(self.response_ok(&response))
    }

    /// A response without any vendor failure marker counts as success.
    fn response_ok(&self, response: &str) -> bool {
        let lowered = response.to_ascii_lowercase();
        !self
            .profile
            .failed_when()
            .iter()
            .any(|marker| lowered.contains(&marker.to_ascii_lowercase()))
    }

    fn check_found(&self, ont_id: &str, response: &str) -> Result<()> {
        let lowered = response.to_ascii_lowercase();
        if self
            .profile
            .not_found_when()
            .iter()
            .any(|marker| lowered.contains(&marker.to_ascii_lowercase()))
        {
            return Err(Error::OntNotFound {
                ont_id: ont_id.to_string(),
            });
        }
        Ok(())
    }

    fn state_word(enabled: bool) -> &'static str {
        if enabled { "enable" } else { "disable" }
    }
}

#[async_trait]
impl<P: VendorProfile> Session for CliAdapter<P> {
    async fn connect(&mut self) -> bool {
        if let Err(e) = self.transport.connect().await {
            warn!("{}: connect failed: {}", self.host, e);
            return false;
        }
        for command in self.profile.setup_commands() {
            if let Err(e) = self.transport.send_command(command).await {
                warn!("{}: setup command '{}' failed: {}", self.host, command, e);
                if let Err(e) = self.transport.disconnect().await {
                    debug!("{}: teardown after failed setup: {}", self.host, e);
                }
                return false;
            }
        }
        debug!("{}: session ready", self.host);
        true
    }

    async fn disconnect(&mut self) {
        if let Err(e) = self.transport.disconnect().await {
            debug!("{}: disconnect error ignored: {}", self.host, e);
        }
    }

    fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }
}

#[async_trait]
impl<P: VendorProfile> OltAdapter for CliAdapter<P> {
    fn vendor(&self) -> Vendor {
        self.profile.vendor()
    }

    fn host(&self) -> &str {
        &self.host
    }

    async fn get_system_info(&mut self) -> Result<IndexMap<String, String>> {
        let params = CommandParams::new();
        let version = self.run("show_version", &params).await?;
        let system = self.run("show_system_info", &params).await?;

        let mut merged = parse::parse_kv_block(&version);
        // System-info wins key collisions.
        for (key, value) in parse::parse_kv_block(&system) {
            merged.insert(key, value);
        }
        Ok(merged)
    }

    async fn get_olts(&mut self) -> Result<Vec<OltInfo>> {
        let info = self.get_system_info().await?;
        let find = |needle: &str| {
            info.iter()
                .find(|(key, _)| key.to_ascii_lowercase().contains(needle))
                .map(|(_, value)| value.clone())
        };

        Ok(vec![OltInfo {
            id: "1".to_string(),
            name: find("sysname")
                .or_else(|| find("hostname"))
                .or_else(|| find("system name"))
                .unwrap_or_else(|| self.host.clone()),
            vendor: self.profile.vendor(),
            model: self.model.clone(),
            version: find("version"),
        }])
    }

    async fn get_onts(&mut self, addressing: Option<&Addressing>) -> Result<Vec<OntInfo>> {
        let params = self.base_params(addressing)?;
        let output = self.run("show_all_onts", &params).await?;

        let scope = self.effective_addressing(addressing);
        let mut onts = self.profile.parse_ont_list(&output);
        for ont in &mut onts {
            if ont.addressing.is_none() {
                ont.addressing = Some(scope.clone());
            }
        }
        Ok(onts)
    }

    async fn get_ont_details(
        &mut self,
        ont_id: &str,
        addressing: Option<&Addressing>,
    ) -> Result<OntInfo> {
        let params = self.base_params(addressing)?.set("ont_id", ont_id);

        let info = self.run("show_ont_info", &params).await?;
        self.check_found(ont_id, &info)?;
        let status = self.run("show_ont_status", &params).await?;
        let version = self.run("show_ont_version", &params).await?;

        let mut fields = parse::parse_kv_block(&info);
        for (key, value) in parse::parse_kv_block(&status) {
            fields.insert(key, value);
        }
        for (key, value) in parse::parse_kv_block(&version) {
            fields.insert(key, value);
        }
        if fields.is_empty() {
            return Err(Error::OntNotFound {
                ont_id: ont_id.to_string(),
            });
        }

        let mut ont = self.profile.ont_from_fields(ont_id, fields);
        if ont.addressing.is_none() {
            ont.addressing = Some(self.effective_addressing(addressing));
        }
        Ok(ont)
    }

    async fn provision_ont(
        &mut self,
        serial_number: &str,
        name: Option<&str>,
        description: Option<&str>,
        addressing: Option<&Addressing>,
    ) -> Result<OntInfo> {
        let desc = description.or(name);
        let params = self
            .base_params(addressing)?
            .set("serial", serial_number)
            .with_description(desc);
        let response = self.run("add_ont", &params).await?;

        let id = parse::parse_provisioning_response(
            &response,
            self.profile.provisioning_id_pattern(),
            self.profile.provisioning_success_tokens(),
        )?;
        debug!("{}: provisioned '{}' as ont {}", self.host, serial_number, id);

        let mut ont = OntInfo::new(id, serial_number);
        ont.description = desc.map(str::to_string);
        ont.addressing = Some(self.effective_addressing(addressing));
        Ok(ont)
    }

    async fn deprovision_ont(
        &mut self,
        ont_id: &str,
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        let params = self.base_params(addressing)?.set("ont_id", ont_id);
        self.run_bool("delete_ont", &params).await
    }

    async fn configure_ont_vlan(
        &mut self,
        ont_id: &str,
        interface_id: &str,
        mode: VlanMode,
        vlan_id: Option<u16>,
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        let params = self
            .base_params(addressing)?
            .set("ont_id", ont_id)
            .set("interface_id", interface_id)
            .with_vlan(mode, vlan_id);
        self.run_bool("configure_vlan", &params).await
    }

    async fn set_ont_ip_configuration(
        &mut self,
        ont_id: &str,
        config: &OntIpConfig,
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        if config.partial_static() {
            return Err(Error::invalid_argument(
                "static IP configuration requires ip, mask, and gateway together",
            ));
        }
        let base = self.base_params(addressing)?.set("ont_id", ont_id);

        let mut ok = true;
        if let Some(enabled) = config.dhcp_enabled {
            let params = base.clone().set("state", Self::state_word(enabled));
            ok &= self.run_bool("set_wan_dhcp", &params).await?;
        }
        if let Some((ip, mask, gateway)) = config.static_triple() {
            let params = base
                .clone()
                .set("ip", ip)
                .set("mask", mask)
                .set("gateway", gateway);
            ok &= self.run_bool("set_wan_static", &params).await?;
        }
        if let Some(enabled) = config.pppoe_enabled {
            let params = base.clone().set("state", Self::state_word(enabled));
            ok &= self.run_bool("set_wan_pppoe", &params).await?;
        }
        Ok(ok)
    }

    async fn enable_ont_port(
        &mut self,
        ont_id: &str,
        interface_id: &str,
        enabled: bool,
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        let params = self
            .base_params(addressing)?
            .set("ont_id", ont_id)
            .set("interface_id", interface_id);
        let command = if enabled { "enable_port" } else { "disable_port" };
        self.run_bool(command, &params).await
    }

    async fn reboot_ont(&mut self, ont_id: &str, addressing: Option<&Addressing>) -> Result<bool> {
        let params = self.base_params(addressing)?.set("ont_id", ont_id);
        self.run_bool("reboot_ont", &params).await
    }

    async fn restore_ont_factory_settings(
        &mut self,
        ont_id: &str,
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        let params = self.base_params(addressing)?.set("ont_id", ont_id);
        self.run_bool("restore_factory", &params).await
    }

    async fn get_ont_status(
        &mut self,
        ont_id: &str,
        addressing: Option<&Addressing>,
    ) -> Result<OntStatus> {
        let params = self.base_params(addressing)?.set("ont_id", ont_id);
        let output = self.run("show_ont_status", &params).await?;
        self.check_found(ont_id, &output)?;
        Ok(self.profile.parse_status(ont_id, &output))
    }

    async fn get_ont_performance_metrics(
        &mut self,
        ont_id: &str,
        metric_type: &str,
        window: Option<Duration>,
        addressing: Option<&Addressing>,
    ) -> Result<IndexMap<String, String>> {
        if !metric_type.eq_ignore_ascii_case("traffic") {
            return Err(Error::invalid_argument(format!(
                "unsupported metric type '{metric_type}' (only 'traffic')"
            )));
        }
        let params = self
            .base_params(addressing)?
            .set("ont_id", ont_id)
            .set("hours", parse::window_hours(window));
        let output = self.run("show_traffic", &params).await?;
        self.check_found(ont_id, &output)?;
        Ok(parse::parse_kv_block(&output))
    }

    async fn get_ont_signal_history(
        &mut self,
        ont_id: &str,
        window: Option<Duration>,
        addressing: Option<&Addressing>,
    ) -> Result<Vec<SignalSample>> {
        let params = self
            .base_params(addressing)?
            .set("ont_id", ont_id)
            .set("hours", parse::window_hours(window));
        let output = self.run("show_signal_history", &params).await?;
        self.check_found(ont_id, &output)?;
        Ok(self.profile.parse_signal_history(&output))
    }

    async fn get_ont_alerts(
        &mut self,
        ont_id: &str,
        window: Option<Duration>,
        addressing: Option<&Addressing>,
    ) -> Result<Vec<OntAlert>> {
        let params = self
            .base_params(addressing)?
            .set("ont_id", ont_id)
            .set("hours", parse::window_hours(window));
        let output = self.run("show_alerts", &params).await?;
        self.check_found(ont_id, &output)?;
        Ok(self.profile.parse_alerts(&output))
    }

    async fn configure_alerts(
        &mut self,
        ont_id: &str,
        alert_type: AlertType,
        threshold: f64,
        notification_methods: &[String],
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        let params = self
            .base_params(addressing)?
            .set("ont_id", ont_id)
            .set("alert_type", alert_type.as_str())
            .set("threshold", threshold)
            .with_notify_methods(notification_methods);
        self.run_bool("configure_alerts", &params).await
    }

    async fn get_ont_location(
        &mut self,
        ont_id: &str,
        addressing: Option<&Addressing>,
    ) -> Result<OntLocation> {
        let params = self.base_params(addressing)?.set("ont_id", ont_id);
        let output = self.run("show_location", &params).await?;
        self.check_found(ont_id, &output)?;
        Ok(parse::parse_location(&output))
    }

    async fn update_ont_location(
        &mut self,
        ont_id: &str,
        latitude: f64,
        longitude: f64,
        description: Option<&str>,
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        let params = self
            .base_params(addressing)?
            .set("ont_id", ont_id)
            .set("latitude", latitude)
            .set("longitude", longitude)
            .with_description(description);
        self.run_bool("update_location", &params).await
    }

    async fn set_ont_speed_limit(
        &mut self,
        ont_id: &str,
        download_kbps: Option<u32>,
        upload_kbps: Option<u32>,
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        let base = self.base_params(addressing)?.set("ont_id", ont_id);

        let mut ok = true;
        if let Some(kbps) = download_kbps {
            let params = base.clone().set("kbps", kbps);
            ok &= self.run_bool("set_speed_download", &params).await?;
        }
        if let Some(kbps) = upload_kbps {
            let params = base.clone().set("kbps", kbps);
            ok &= self.run_bool("set_speed_upload", &params).await?;
        }
        Ok(ok)
    }

    async fn configure_ont_dhcp(
        &mut self,
        ont_id: &str,
        enabled: bool,
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        let params = self
            .base_params(addressing)?
            .set("ont_id", ont_id)
            .set("state", Self::state_word(enabled));
        self.run_bool("set_lan_dhcp", &params).await
    }

    async fn configure_ont_triple_play(
        &mut self,
        ont_id: &str,
        internet: bool,
        iptv: bool,
        voice: bool,
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        let base = self.base_params(addressing)?.set("ont_id", ont_id);

        let mut ok = true;
        for (command, enabled) in [
            ("set_service_internet", internet),
            ("set_service_iptv", iptv),
            ("set_service_voice", voice),
        ] {
            let params = base.clone().set("state", Self::state_word(enabled));
            ok &= self.run_bool(command, &params).await?;
        }
        Ok(ok)
    }

    async fn configure_ont_routing_mode(
        &mut self,
        ont_id: &str,
        mode: RoutingMode,
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        let params = self
            .base_params(addressing)?
            .set("ont_id", ont_id)
            .set("mode", mode.as_str());
        self.run_bool("set_routing_mode", &params).await
    }

    async fn configure_ont_tr069(
        &mut self,
        ont_id: &str,
        config: &Tr069Config,
        addressing: Option<&Addressing>,
    ) -> Result<bool> {
        let base = self.base_params(addressing)?.set("ont_id", ont_id);

        // All five commands are issued even after a failed one; the result
        // is their AND.
        let mut ok = true;
        let params = base.clone().set("url", &config.acs_url);
        ok &= self.run_bool("tr069_acs_url", &params).await?;
        let params = base.clone().set("interval", config.inform_interval_secs);
        ok &= self.run_bool("tr069_interval", &params).await?;
        let params = base.clone().set("username", &config.username);
        ok &= self.run_bool("tr069_username", &params).await?;
        let params = base.clone().set("password", config.password.expose_secret());
        ok &= self.run_bool("tr069_password", &params).await?;
        ok &= self.run_bool("tr069_enable", &base).await?;
        Ok(ok)
    }

    async fn execute_custom_command(&mut self, command: &str) -> Result<String> {
        warn!("{}: executing custom command: {}", self.host, command);
        self.transport.send_command(command).await
    }
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;

    use crate::error::ProvisioningError;
    use crate::template::CommandTable;
    use crate::transport::mock::MockTransport;

    use super::*;

    static TEST_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"ONTID :(\d+)").unwrap());

    struct TestProfile;

    impl VendorProfile for TestProfile {
        fn vendor(&self) -> Vendor {
            Vendor::Huawei
        }

        fn setup_commands(&self) -> &'static [&'static str] {
            &["enable"]
        }

        fn failed_when(&self) -> &'static [&'static str] {
            &["failure", "error:"]
        }

        fn not_found_when(&self) -> &'static [&'static str] {
            &["does not exist"]
        }

        fn addressing_params(&self, addressing: &Addressing) -> Result<CommandParams> {
            match addressing {
                Addressing::FrameSlot { frame, slot } => {
                    Ok(CommandParams::new().set("frame", frame).set("slot", slot))
                }
                Addressing::GponIndex { .. } => Err(Error::invalid_argument(
                    "frame/slot addressing required for this vendor",
                )),
            }
        }

        fn provisioning_id_pattern(&self) -> &'static Regex {
            &TEST_ID
        }

        fn provisioning_success_tokens(&self) -> &'static [&'static str] {
            &["success"]
        }

        fn parse_ont_list(&self, _output: &str) -> Vec<OntInfo> {
            Vec::new()
        }

        fn ont_from_fields(&self, ont_id: &str, fields: IndexMap<String, String>) -> OntInfo {
            let mut ont = OntInfo::new(ont_id, "");
            ont.extra = fields;
            ont
        }

        fn parse_status(&self, ont_id: &str, _output: &str) -> OntStatus {
            OntStatus {
                ont_id: ont_id.to_string(),
                online: true,
                run_state: "online".to_string(),
                rx_power_dbm: None,
                tx_power_dbm: None,
                distance_m: None,
                last_down_cause: None,
                last_down_time: None,
                extra: IndexMap::new(),
            }
        }

        fn parse_signal_history(&self, _output: &str) -> Vec<SignalSample> {
            Vec::new()
        }

        fn parse_alerts(&self, _output: &str) -> Vec<OntAlert> {
            Vec::new()
        }
    }

    fn test_registry() -> Arc<CommandTemplateRegistry> {
        let mut table = CommandTable::new();
        for (name, template) in [
            ("add_ont", "ont add {frame} {slot} sn-auth {serial} {desc_param}"),
            ("configure_vlan", "ont port vlan {frame} {slot} {ont_id} {interface_id} {mode} {vlan_param}"),
            ("set_wan_dhcp", "ont ipconfig {frame} {slot} {ont_id} dhcp {state}"),
            ("set_wan_static", "ont ipconfig {frame} {slot} {ont_id} static ip {ip} mask {mask} gateway {gateway}"),
            ("set_wan_pppoe", "ont ipconfig {frame} {slot} {ont_id} pppoe {state}"),
            ("tr069_acs_url", "ont tr069 {frame} {slot} {ont_id} acs-url {url}"),
            ("tr069_interval", "ont tr069 {frame} {slot} {ont_id} inform-interval {interval}"),
            ("tr069_username", "ont tr069 {frame} {slot} {ont_id} username {username}"),
            ("tr069_password", "ont tr069 {frame} {slot} {ont_id} password {password}"),
            ("tr069_enable", "ont tr069 {frame} {slot} {ont_id} enable"),
        ] {
            table.insert(name.to_string(), template.to_string());
        }

        let mut registry = CommandTemplateRegistry::new();
        registry.register_model(Vendor::Huawei, "MA5800", table);
        Arc::new(registry)
    }

    fn test_adapter(mock: MockTransport) -> CliAdapter<TestProfile> {
        CliAdapter::new(
            TestProfile,
            Box::new(mock),
            "10.0.0.1",
            "MA5800",
            Addressing::frame_slot("0", "1"),
            test_registry(),
        )
    }

    #[tokio::test]
    async fn test_connect_failure_is_false_not_error() {
        let mut adapter = test_adapter(MockTransport::failing_connect());
        assert!(!adapter.connect().await);
        assert!(!adapter.is_connected());
    }

    #[tokio::test]
    async fn test_connect_runs_setup_commands() {
        let mock = MockTransport::new();
        let log = mock.sent_log();
        let mut adapter = test_adapter(mock);

        assert!(adapter.connect().await);
        assert_eq!(log.lock().unwrap().as_slice(), ["enable"]);
    }

    #[tokio::test]
    async fn test_provision_extracts_assigned_id() {
        let mock = MockTransport::new().with_response(
            "ont add 0 1 sn-auth HWTC11112222",
            "Number of ONTs that can be added: 1\nONTID :7",
        );
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        let ont = adapter
            .provision_ont("HWTC11112222", None, None, None)
            .await
            .unwrap();
        assert_eq!(ont.id, "7");
        assert_eq!(ont.serial_number, "HWTC11112222");
        assert_eq!(ont.addressing, Some(Addressing::frame_slot("0", "1")));
    }

    #[tokio::test]
    async fn test_provision_success_without_id_is_missing_ont_id() {
        let mock = MockTransport::new()
            .with_response("ont add 0 1 sn-auth HWTC11112222", "Operation SUCCESS");
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        match adapter.provision_ont("HWTC11112222", None, None, None).await {
            Err(Error::Provisioning(ProvisioningError::MissingOntId { .. })) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provision_rejection_carries_response() {
        let mock = MockTransport::new().with_response(
            "ont add 0 1 sn-auth HWTC11112222",
            "Failure: SN already exists",
        );
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        match adapter.provision_ont("HWTC11112222", None, None, None).await {
            Err(Error::Provisioning(ProvisioningError::Rejected { response })) => {
                assert!(response.contains("SN already exists"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_batch_provisioning_skips_failed_serials() {
        let mock = MockTransport::new()
            .with_response("ont add 0 1 sn-auth AAAA00000001", "ONTID :11")
            .with_response("ont add 0 1 sn-auth BBBB00000002", "Failure: SN already exists")
            .with_response("ont add 0 1 sn-auth CCCC00000003", "ONTID :12");
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        let serials = vec![
            "AAAA00000001".to_string(),
            "BBBB00000002".to_string(),
            "CCCC00000003".to_string(),
        ];
        let provisioned = adapter
            .provision_multiple_onts(&serials, None)
            .await
            .unwrap();

        let ids: Vec<&str> = provisioned.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["11", "12"]);
    }

    #[tokio::test]
    async fn test_trunk_mode_never_embeds_vlan_id() {
        let mock = MockTransport::new();
        let log = mock.sent_log();
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        adapter
            .configure_ont_vlan("5", "eth1", VlanMode::Trunk, Some(100), None)
            .await
            .unwrap();
        adapter
            .configure_ont_vlan("5", "eth1", VlanMode::Access, Some(100), None)
            .await
            .unwrap();

        let sent = log.lock().unwrap();
        assert_eq!(sent[1], "ont port vlan 0 1 5 eth1 trunk");
        assert_eq!(sent[2], "ont port vlan 0 1 5 eth1 access vlan 100");
    }

    #[tokio::test]
    async fn test_ip_partial_static_rejected_before_io() {
        let mock = MockTransport::new();
        let log = mock.sent_log();
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        let partial = OntIpConfig {
            ip: Some("10.1.1.2".to_string()),
            gateway: Some("10.1.1.1".to_string()),
            ..OntIpConfig::default()
        };
        match adapter.set_ont_ip_configuration("5", &partial, None).await {
            Err(Error::InvalidArgument { .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
        // Only the setup command went out.
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ip_empty_request_is_vacuously_true() {
        let mock = MockTransport::new();
        let log = mock.sent_log();
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        let ok = adapter
            .set_ont_ip_configuration("5", &OntIpConfig::new(), None)
            .await
            .unwrap();
        assert!(ok);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ip_result_is_and_of_subcommands() {
        let mock = MockTransport::new()
            .with_response("ont ipconfig 0 1 5 dhcp enable", "ok")
            .with_response(
                "ont ipconfig 0 1 5 pppoe disable",
                "Failure: service conflict",
            );
        let log = mock.sent_log();
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        let config = OntIpConfig::new().with_dhcp(true).with_pppoe(false);
        let ok = adapter
            .set_ont_ip_configuration("5", &config, None)
            .await
            .unwrap();
        assert!(!ok);
        // Both sub-commands were still issued.
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_metric_type_validated_before_io() {
        let mock = MockTransport::new();
        let log = mock.sent_log();
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        match adapter
            .get_ont_performance_metrics("5", "optical", None, None)
            .await
        {
            Err(Error::InvalidArgument { .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_addressing_variant_rejected_before_io() {
        let mock = MockTransport::new();
        let log = mock.sent_log();
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        let wrong = Addressing::gpon_index("1/2/3");
        match adapter.deprovision_ont("5", Some(&wrong)).await {
            Err(Error::InvalidArgument { .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tr069_issues_all_five_commands() {
        let mock = MockTransport::new().with_response(
            "ont tr069 0 1 5 acs-url http://acs.example.net:7547",
            "Error: unreachable",
        );
        let log = mock.sent_log();
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        let config = Tr069Config::new("http://acs.example.net:7547", 86400, "acs", "secret");
        let ok = adapter.configure_ont_tr069("5", &config, None).await.unwrap();
        assert!(!ok);

        let sent = log.lock().unwrap();
        // Setup plus all five TR-069 commands despite the first failing.
        assert_eq!(sent.len(), 6);
        assert_eq!(sent[5], "ont tr069 0 1 5 enable");
    }

    #[tokio::test]
    async fn test_custom_command_is_raw_passthrough() {
        let mock = MockTransport::new().with_response("display board 0", "Board 0 online");
        let mut adapter = test_adapter(mock);
        adapter.connect().await;

        let output = adapter.execute_custom_command("display board 0").await.unwrap();
        assert_eq!(output, "Board 0 online");
    }
}
