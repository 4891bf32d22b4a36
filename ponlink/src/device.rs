//! Device identity, addressing, and the external collaborator seams.
//!
//! The device registry and credential store belong to the surrounding
//! platform (ORM-backed in production); this module defines the contracts
//! the pool consumes plus in-memory implementations for tests and demos.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Supported OLT vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Huawei,
    Zte,
}

impl Vendor {
    /// Model the command template registry falls back to when the device's
    /// model has no dedicated table.
    pub fn default_model(&self) -> &'static str {
        match self {
            Vendor::Huawei => "MA5800",
            Vendor::Zte => "C320",
        }
    }

    /// Default management port: SSH for Huawei, Telnet for ZTE.
    pub fn default_port(&self) -> u16 {
        match self {
            Vendor::Huawei => 22,
            Vendor::Zte => 23,
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vendor::Huawei => write!(f, "huawei"),
            Vendor::Zte => write!(f, "zte"),
        }
    }
}

impl FromStr for Vendor {
    type Err = Error;

    /// Case-insensitive vendor match; anything outside the supported set is
    /// an [`Error::UnsupportedVendor`].
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "huawei" => Ok(Vendor::Huawei),
            "zte" => Ok(Vendor::Zte),
            _ => Err(Error::UnsupportedVendor {
                vendor: s.to_string(),
            }),
        }
    }
}

/// Opaque port-addressing value object.
///
/// Huawei addresses ONTs by frame and slot; ZTE by a gpon index string
/// (e.g. `1/2/3`). Adapters keep their own default and reject the other
/// vendor's variant, so the capability interface never leaks
/// vendor-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum Addressing {
    FrameSlot { frame: String, slot: String },
    GponIndex { index: String },
}

impl Addressing {
    /// Huawei-style frame/slot addressing.
    pub fn frame_slot(frame: impl Into<String>, slot: impl Into<String>) -> Self {
        Addressing::FrameSlot {
            frame: frame.into(),
            slot: slot.into(),
        }
    }

    /// ZTE-style gpon index addressing.
    pub fn gpon_index(index: impl Into<String>) -> Self {
        Addressing::GponIndex {
            index: index.into(),
        }
    }
}

impl fmt::Display for Addressing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Addressing::FrameSlot { frame, slot } => write!(f, "{frame}/{slot}"),
            Addressing::GponIndex { index } => write!(f, "{index}"),
        }
    }
}

/// One managed OLT as the device registry describes it.
///
/// Created and updated by the registry; read-only to this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Opaque registry id.
    pub id: String,

    /// Equipment vendor, which selects the adapter.
    pub vendor: Vendor,

    /// Management address.
    pub host: String,

    /// Management port; `None` means the vendor default (22 / 23).
    pub port: Option<u16>,

    /// Hardware model; `None` means the vendor default model.
    pub model: Option<String>,

    /// Default addressing used when a call supplies none.
    pub addressing: Option<Addressing>,
}

impl DeviceRecord {
    /// Effective management port.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.vendor.default_port())
    }

    /// Effective model name.
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(self.vendor.default_model())
    }
}

/// Login credentials for one device.
///
/// The password lives in a [`SecretString`]: redacted in `Debug`, zeroized
/// on drop, exposed only at the authentication boundary. Deliberately not
/// `Serialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Device registry collaborator: maps an opaque device id to its record.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    async fn lookup(&self, device_id: &str) -> Result<DeviceRecord>;
}

/// Credential store collaborator.
///
/// Plaintext passes through process memory only; encryption at rest is the
/// store's concern, not ours.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_credentials(&self, device_id: &str) -> Result<Credentials>;

    async fn store_credentials(&self, device_id: &str, credentials: Credentials) -> Result<()>;
}

/// In-memory device directory for tests, demos, and static deployments.
#[derive(Debug, Default)]
pub struct StaticDeviceDirectory {
    devices: HashMap<String, DeviceRecord>,
}

impl StaticDeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device record under its own id.
    pub fn insert(&mut self, record: DeviceRecord) {
        self.devices.insert(record.id.clone(), record);
    }

    pub fn with_device(mut self, record: DeviceRecord) -> Self {
        self.insert(record);
        self
    }
}

#[async_trait]
impl DeviceDirectory for StaticDeviceDirectory {
    async fn lookup(&self, device_id: &str) -> Result<DeviceRecord> {
        self.devices
            .get(device_id)
            .cloned()
            .ok_or_else(|| Error::invalid_argument(format!("unknown device id '{device_id}'")))
    }
}

/// In-memory credential store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(self, device_id: impl Into<String>, credentials: Credentials) -> Self {
        self.entries
            .lock()
            .expect("credential store lock")
            .insert(device_id.into(), credentials);
        self
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get_credentials(&self, device_id: &str) -> Result<Credentials> {
        self.entries
            .lock()
            .expect("credential store lock")
            .get(device_id)
            .cloned()
            .ok_or_else(|| {
                Error::invalid_argument(format!("no credentials for device '{device_id}'"))
            })
    }

    async fn store_credentials(&self, device_id: &str, credentials: Credentials) -> Result<()> {
        self.entries
            .lock()
            .expect("credential store lock")
            .insert(device_id.to_string(), credentials);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_vendor_from_str_case_insensitive() {
        assert_eq!(Vendor::from_str("huawei").unwrap(), Vendor::Huawei);
        assert_eq!(Vendor::from_str("Huawei").unwrap(), Vendor::Huawei);
        assert_eq!(Vendor::from_str("ZTE").unwrap(), Vendor::Zte);
        assert_eq!(Vendor::from_str("zTe").unwrap(), Vendor::Zte);

        match Vendor::from_str("cisco") {
            Err(Error::UnsupportedVendor { vendor }) => assert_eq!(vendor, "cisco"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_vendor_defaults() {
        assert_eq!(Vendor::Huawei.default_model(), "MA5800");
        assert_eq!(Vendor::Huawei.default_port(), 22);
        assert_eq!(Vendor::Zte.default_model(), "C320");
        assert_eq!(Vendor::Zte.default_port(), 23);
    }

    #[test]
    fn test_device_record_effective_fields() {
        let record = DeviceRecord {
            id: "olt-1".to_string(),
            vendor: Vendor::Zte,
            host: "10.0.0.2".to_string(),
            port: None,
            model: None,
            addressing: Some(Addressing::gpon_index("1/2/3")),
        };
        assert_eq!(record.port(), 23);
        assert_eq!(record.model(), "C320");

        let pinned = DeviceRecord {
            port: Some(2323),
            model: Some("C300".to_string()),
            ..record
        };
        assert_eq!(pinned.port(), 2323);
        assert_eq!(pinned.model(), "C300");
    }

    #[test]
    fn test_addressing_display() {
        assert_eq!(Addressing::frame_slot("0", "1").to_string(), "0/1");
        assert_eq!(Addressing::gpon_index("1/2/3").to_string(), "1/2/3");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("admin", "hunter2");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert_eq!(creds.password.expose_secret(), "hunter2");
    }

    #[tokio::test]
    async fn test_static_directory_lookup() {
        let directory = StaticDeviceDirectory::new().with_device(DeviceRecord {
            id: "olt-7".to_string(),
            vendor: Vendor::Huawei,
            host: "192.0.2.7".to_string(),
            port: None,
            model: None,
            addressing: None,
        });

        let record = directory.lookup("olt-7").await.unwrap();
        assert_eq!(record.host, "192.0.2.7");

        assert!(directory.lookup("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_credential_store_round_trip() {
        let store = MemoryCredentialStore::new();
        store
            .store_credentials("olt-7", Credentials::new("admin", "secret"))
            .await
            .unwrap();

        let creds = store.get_credentials("olt-7").await.unwrap();
        assert_eq!(creds.username, "admin");
        assert!(store.get_credentials("unknown").await.is_err());
    }
}
