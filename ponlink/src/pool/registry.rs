//! One [`ConnectionPool`] per managed device.
//!
//! The registry resolves a device id through the device directory and
//! credential store once, at pool construction; the resulting factory
//! captures the record and credentials so pooled sessions rebuild without
//! further lookups.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::factory::{self, AdapterOptions};
use crate::adapter::OltAdapter;
use crate::device::{CredentialStore, Credentials, DeviceDirectory, DeviceRecord};
use crate::error::Result;

use super::{ConnectionPool, PoolConfig};

/// Pool of boxed adapters for one device.
pub type DevicePool = ConnectionPool<Box<dyn OltAdapter>>;

/// Lazily builds and caches a pool per device id.
pub struct PoolRegistry {
    directory: Arc<dyn DeviceDirectory>,
    credentials: Arc<dyn CredentialStore>,
    config: PoolConfig,
    // Async mutex: held across the directory and credential lookups so
    // concurrent first requests for one device build a single pool.
    pools: tokio::sync::Mutex<HashMap<String, Arc<DevicePool>>>,
}

impl PoolRegistry {
    pub fn new(
        directory: Arc<dyn DeviceDirectory>,
        credentials: Arc<dyn CredentialStore>,
        config: PoolConfig,
    ) -> Self {
        Self {
            directory,
            credentials,
            config,
            pools: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Pool for `device_id`, building it on first use.
    pub async fn pool_for(&self, device_id: &str) -> Result<Arc<DevicePool>> {
        let mut pools = self.pools.lock().await;
        if let Some(pool) = pools.get(device_id) {
            return Ok(Arc::clone(pool));
        }

        let record = self.directory.lookup(device_id).await?;
        let creds = self.credentials.get_credentials(device_id).await?;
        let pool = ConnectionPool::new(
            record.host.clone(),
            self.config.clone(),
            adapter_factory(record, creds),
        );
        pools.insert(device_id.to_string(), Arc::clone(&pool));
        Ok(pool)
    }

    /// Close every pool and forget it; subsequent [`Self::pool_for`] calls
    /// build fresh pools.
    pub async fn shutdown(&self) {
        let pools: Vec<Arc<DevicePool>> = self.pools.lock().await.drain().map(|(_, p)| p).collect();
        for pool in pools {
            pool.close_all().await;
        }
    }
}

fn adapter_factory(
    record: DeviceRecord,
    creds: Credentials,
) -> Box<dyn Fn() -> Result<Box<dyn OltAdapter>> + Send + Sync> {
    Box::new(move || {
        let mut options = AdapterOptions::new()
            .with_port(record.port())
            .with_model(record.model());
        if let Some(addressing) = record.addressing.clone() {
            options = options.with_addressing(addressing);
        }
        factory::create_adapter(
            &record.vendor.to_string(),
            &record.host,
            creds.clone(),
            options,
        )
    })
}
