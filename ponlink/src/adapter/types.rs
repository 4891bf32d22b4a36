//! Record types returned by adapter operations.
//!
//! Callers never see raw CLI transcripts through these; parsers populate
//! them field by field and push anything unrecognized into `extra`.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::device::{Addressing, Vendor};
use crate::error::Error;

/// One OLT chassis as the adapter reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OltInfo {
    /// Chassis id; single-chassis adapters report `"1"`.
    pub id: String,
    pub name: String,
    pub vendor: Vendor,
    pub model: String,
    pub version: Option<String>,
}

/// One ONT as discovered or provisioned on an OLT.
///
/// The id is vendor-assigned and unique only within its addressing scope
/// (frame/slot or gpon index), never globally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntInfo {
    pub id: String,
    pub serial_number: String,
    pub addressing: Option<Addressing>,
    pub description: Option<String>,
    pub run_state: Option<String>,
    pub config_state: Option<String>,
    pub software_version: Option<String>,
    pub equipment_id: Option<String>,
    /// Parsed fields with no dedicated slot, in CLI order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, String>,
}

impl OntInfo {
    pub fn new(id: impl Into<String>, serial_number: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            serial_number: serial_number.into(),
            addressing: None,
            description: None,
            run_state: None,
            config_state: None,
            software_version: None,
            equipment_id: None,
            extra: IndexMap::new(),
        }
    }
}

/// Live state of one ONT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntStatus {
    pub ont_id: String,
    pub online: bool,
    pub run_state: String,
    pub rx_power_dbm: Option<f64>,
    pub tx_power_dbm: Option<f64>,
    pub distance_m: Option<u32>,
    pub last_down_cause: Option<String>,
    pub last_down_time: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, String>,
}

/// One alert/alarm row from the OLT's history for an ONT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntAlert {
    /// Device-local timestamp, kept verbatim.
    pub timestamp: String,
    pub severity: Option<String>,
    pub category: String,
    pub message: String,
}

/// One optical-signal measurement from the device's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSample {
    /// Device-local timestamp, kept verbatim.
    pub timestamp: String,
    pub rx_power_dbm: Option<f64>,
    pub tx_power_dbm: Option<f64>,
    pub temperature_c: Option<f64>,
}

/// Installed location as recorded on the device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OntLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

/// WAN-side IP configuration request.
///
/// Unset fields leave the device untouched; the static address fields are
/// all-or-nothing (a partial triple is rejected before any I/O).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OntIpConfig {
    pub ip: Option<String>,
    pub mask: Option<String>,
    pub gateway: Option<String>,
    pub dhcp_enabled: Option<bool>,
    pub pppoe_enabled: Option<bool>,
}

impl OntIpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_static(
        mut self,
        ip: impl Into<String>,
        mask: impl Into<String>,
        gateway: impl Into<String>,
    ) -> Self {
        self.ip = Some(ip.into());
        self.mask = Some(mask.into());
        self.gateway = Some(gateway.into());
        self
    }

    pub fn with_dhcp(mut self, enabled: bool) -> Self {
        self.dhcp_enabled = Some(enabled);
        self
    }

    pub fn with_pppoe(mut self, enabled: bool) -> Self {
        self.pppoe_enabled = Some(enabled);
        self
    }

    /// Some but not all of ip/mask/gateway set.
    pub fn partial_static(&self) -> bool {
        let set = [
            self.ip.is_some(),
            self.mask.is_some(),
            self.gateway.is_some(),
        ];
        set.iter().any(|s| *s) && !set.iter().all(|s| *s)
    }

    /// The full static triple, when all three fields are present.
    pub fn static_triple(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.ip.as_deref()?,
            self.mask.as_deref()?,
            self.gateway.as_deref()?,
        ))
    }
}

/// TR-069 ACS settings for one ONT.
///
/// The password is write-only through this struct; command text carrying
/// it is never logged.
#[derive(Debug, Clone)]
pub struct Tr069Config {
    pub acs_url: String,
    pub inform_interval_secs: u32,
    pub username: String,
    pub password: SecretString,
}

impl Tr069Config {
    pub fn new(
        acs_url: impl Into<String>,
        inform_interval_secs: u32,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            acs_url: acs_url.into(),
            inform_interval_secs,
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Interface VLAN tagging mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VlanMode {
    Access,
    Trunk,
}

impl VlanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VlanMode::Access => "access",
            VlanMode::Trunk => "trunk",
        }
    }
}

impl fmt::Display for VlanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VlanMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "access" => Ok(VlanMode::Access),
            "trunk" => Ok(VlanMode::Trunk),
            _ => Err(Error::invalid_argument(format!(
                "invalid vlan mode '{s}' (expected 'access' or 'trunk')"
            ))),
        }
    }
}

/// WAN-side forwarding mode of an ONT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    Routing,
    Bridging,
}

impl RoutingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingMode::Routing => "routing",
            RoutingMode::Bridging => "bridging",
        }
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "routing" => Ok(RoutingMode::Routing),
            "bridging" => Ok(RoutingMode::Bridging),
            _ => Err(Error::invalid_argument(format!(
                "invalid routing mode '{s}' (expected 'routing' or 'bridging')"
            ))),
        }
    }
}

/// Alert category a threshold can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Signal,
    Power,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Signal => "signal",
            AlertType::Power => "power",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "signal" => Ok(AlertType::Signal),
            "power" => Ok(AlertType::Power),
            _ => Err(Error::invalid_argument(format!(
                "invalid alert type '{s}' (expected 'signal' or 'power')"
            ))),
        }
    }
}
