//! Vendor adapters: one capability interface over heterogeneous OLT CLIs.
//!
//! [`OltAdapter`] is the uniform surface callers program against; the
//! Huawei and ZTE implementations translate each operation into their own
//! CLI dialect through the command template registry and parse the output
//! back into shared record types. [`Session`] is the lifecycle subset the
//! connection pool manages.

mod generic;

pub mod factory;
pub mod huawei;
pub mod types;
pub mod zte;

pub use generic::{CliAdapter, VendorProfile};
pub use huawei::HuaweiAdapter;
pub use types::{
    AlertType, OltInfo, OntAlert, OntInfo, OntIpConfig, OntLocation, OntStatus, RoutingMode,
    SignalSample, Tr069Config, VlanMode,
};
pub use zte::ZteAdapter;

use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::device::{Addressing, Vendor};
use crate::error::Result;

/// Pool-facing lifecycle subset of an adapter.
#[async_trait]
pub trait Session: Send {
    /// Establish the session and run the vendor's setup commands
    /// (privilege escalation, paging off).
    ///
    /// Never errors: any failure is logged, the transport is torn down,
    /// and `false` is returned.
    async fn connect(&mut self) -> bool;

    /// Tear the session down. Errors are logged, not returned.
    async fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}

#[async_trait]
impl<S: Session + ?Sized> Session for Box<S> {
    async fn connect(&mut self) -> bool {
        (**self).connect().await
    }

    async fn disconnect(&mut self) {
        (**self).disconnect().await;
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

/// Uniform management surface over one OLT.
///
/// Mutating operations are single commands or small fixed sequences with
/// no rollback: a failure partway leaves the device in whatever state the
/// successful prefix produced. Boolean results reflect the vendor's own
/// failure markers in the response text.
#[async_trait]
pub trait OltAdapter: Session {
    /// Equipment vendor this adapter drives.
    fn vendor(&self) -> Vendor;

    /// Management host.
    fn host(&self) -> &str;

    /// Merged identity and version fields: the "version" output overlaid
    /// with the "system info" output, the latter winning key collisions.
    async fn get_system_info(&mut self) -> Result<IndexMap<String, String>>;

    /// Chassis inventory. Single-chassis devices report one entry, id `"1"`.
    async fn get_olts(&mut self) -> Result<Vec<OltInfo>>;

    /// All ONTs under the given (or default) addressing scope.
    async fn get_onts(&mut self, addressing: Option<&Addressing>) -> Result<Vec<OntInfo>>;

    /// Detail record for one ONT, merged from the vendor's info, status,
    /// and version outputs. Unknown ONT id is [`crate::Error::OntNotFound`].
    async fn get_ont_details(
        &mut self,
        ont_id: &str,
        addressing: Option<&Addressing>,
    ) -> Result<OntInfo>;

    /// Register an ONT by serial number and return it with the
    /// device-assigned id. The response is parsed against a strict
    /// grammar; success is never inferred.
    async fn provision_ont(
        &mut self,
        serial_number: &str,
        name: Option<&str>,
        description: Option<&str>,
        addressing: Option<&Addressing>,
    ) -> Result<OntInfo>;

    /// Provision a batch. Per-serial failures are logged at warn and
    /// skipped; the batch itself never aborts.
    async fn provision_multiple_onts(
        &mut self,
        serial_numbers: &[String],
        addressing: Option<&Addressing>,
    ) -> Result<Vec<OntInfo>> {
        let mut provisioned = Vec::with_capacity(serial_numbers.len());
        for serial in serial_numbers {
            match self.provision_ont(serial, None, None, addressing).await {
                Ok(info) => provisioned.push(info),
                Err(e) => {
                    log::warn!("provisioning of '{serial}' failed, continuing batch: {e}");
                }
            }
        }
        Ok(provisioned)
    }

    async fn deprovision_ont(
        &mut self,
        ont_id: &str,
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    /// Set an interface's VLAN mode. The VLAN id is embedded only for
    /// access mode; trunk interfaces never carry one.
    async fn configure_ont_vlan(
        &mut self,
        ont_id: &str,
        interface_id: &str,
        mode: VlanMode,
        vlan_id: Option<u16>,
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    /// Apply zero to three independent IP sub-configurations (DHCP toggle,
    /// static triple, PPPoE toggle). Result is the AND of the issued
    /// sub-commands; vacuously true when the request is empty.
    async fn set_ont_ip_configuration(
        &mut self,
        ont_id: &str,
        config: &OntIpConfig,
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    async fn enable_ont_port(
        &mut self,
        ont_id: &str,
        interface_id: &str,
        enabled: bool,
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    async fn reboot_ont(&mut self, ont_id: &str, addressing: Option<&Addressing>) -> Result<bool>;

    async fn restore_ont_factory_settings(
        &mut self,
        ont_id: &str,
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    async fn get_ont_status(
        &mut self,
        ont_id: &str,
        addressing: Option<&Addressing>,
    ) -> Result<OntStatus>;

    /// Counters for one metric type. Only `"traffic"` is supported;
    /// anything else is rejected before any device I/O.
    async fn get_ont_performance_metrics(
        &mut self,
        ont_id: &str,
        metric_type: &str,
        window: Option<Duration>,
        addressing: Option<&Addressing>,
    ) -> Result<IndexMap<String, String>>;

    async fn get_ont_signal_history(
        &mut self,
        ont_id: &str,
        window: Option<Duration>,
        addressing: Option<&Addressing>,
    ) -> Result<Vec<SignalSample>>;

    /// Alert history over the window, rendered into the vendor command as
    /// whole hours (default 24).
    async fn get_ont_alerts(
        &mut self,
        ont_id: &str,
        window: Option<Duration>,
        addressing: Option<&Addressing>,
    ) -> Result<Vec<OntAlert>>;

    async fn configure_alerts(
        &mut self,
        ont_id: &str,
        alert_type: AlertType,
        threshold: f64,
        notification_methods: &[String],
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    async fn get_ont_location(
        &mut self,
        ont_id: &str,
        addressing: Option<&Addressing>,
    ) -> Result<OntLocation>;

    async fn update_ont_location(
        &mut self,
        ont_id: &str,
        latitude: f64,
        longitude: f64,
        description: Option<&str>,
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    /// Apply rate limits per direction; either may be omitted. AND of the
    /// issued commands, vacuously true when both are `None`.
    async fn set_ont_speed_limit(
        &mut self,
        ont_id: &str,
        download_kbps: Option<u32>,
        upload_kbps: Option<u32>,
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    /// Toggle the ONT's LAN-side DHCP service.
    async fn configure_ont_dhcp(
        &mut self,
        ont_id: &str,
        enabled: bool,
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    async fn configure_ont_triple_play(
        &mut self,
        ont_id: &str,
        internet: bool,
        iptv: bool,
        voice: bool,
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    async fn configure_ont_routing_mode(
        &mut self,
        ont_id: &str,
        mode: RoutingMode,
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    /// Configure the TR-069 ACS: four setters then the enable command, all
    /// five issued, result their AND. The password-bearing command is
    /// never logged.
    async fn configure_ont_tr069(
        &mut self,
        ont_id: &str,
        config: &Tr069Config,
        addressing: Option<&Addressing>,
    ) -> Result<bool>;

    /// Unrestricted command passthrough. Every invocation is logged at
    /// warn with the target host for audit.
    async fn execute_custom_command(&mut self, command: &str) -> Result<String>;
}

impl std::fmt::Debug for dyn OltAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OltAdapter")
            .field("vendor", &self.vendor())
            .field("host", &self.host())
            .finish()
    }
}
