//! # Ponlink
//!
//! Async multi-vendor OLT/ONT management library for GPON access networks.
//!
//! Ponlink drives optical line terminals over their management CLIs (SSH for
//! Huawei, Telnet for ZTE) behind one vendor-neutral capability interface, so
//! provisioning and diagnostics code never branches on equipment brand.
//!
//! ## Features
//!
//! - One [`OltAdapter`](adapter::OltAdapter) interface over Huawei and ZTE CLIs
//! - Async SSH via russh, async Telnet with option negotiation via tokio
//! - Per-vendor, per-model command templates with placeholder substitution
//! - Deterministic parsing of tabular and key/value CLI output
//! - Bounded per-device connection pooling with idle eviction
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ponlink::{create_adapter, AdapterOptions, Credentials, OltAdapter, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ponlink::Error> {
//!     let mut adapter = create_adapter(
//!         "huawei",
//!         "192.168.1.10",
//!         Credentials::new("admin", "secret"),
//!         AdapterOptions::new(),
//!     )?;
//!
//!     if !adapter.connect().await {
//!         return Err(ponlink::Error::invalid_argument("device unreachable"));
//!     }
//!
//!     for ont in adapter.get_onts(None).await? {
//!         println!("{} {}", ont.id, ont.serial_number);
//!     }
//!
//!     adapter.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! For long-running services, wrap adapters in a
//! [`ConnectionPool`](pool::ConnectionPool) (or a [`PoolRegistry`](pool::PoolRegistry)
//! covering the whole device inventory) instead of connecting per request.

pub mod adapter;
pub mod device;
pub mod error;
pub mod parse;
pub mod pool;
pub mod template;
pub mod transport;

// Re-export main types for convenience
pub use adapter::factory::{create_adapter, supported_vendors, AdapterOptions};
pub use adapter::{HuaweiAdapter, OltAdapter, Session, ZteAdapter};
pub use device::{Addressing, Credentials, DeviceRecord, Vendor};
pub use error::Error;
pub use pool::{ConnectionPool, PoolConfig, PoolRegistry};
pub use template::{CommandParams, CommandTemplateRegistry};
pub use transport::TransportConfig;
