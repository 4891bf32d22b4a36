//! Bounded connection pool for OLT sessions.
//!
//! Device CLIs allow a handful of concurrent management sessions at best,
//! so the pool is a hard bound: at capacity it fails fast with
//! [`Error::PoolExhausted`] instead of queueing callers against a device
//! that cannot serve them. Idle sessions are reused LIFO (the most
//! recently used session is the most likely to still be alive) and a
//! reaper task evicts sessions idle past the configured timeout.
//!
//! Leases are scoped: [`ConnectionPool::with_adapter`] yields the adapter
//! exclusively to a closure and settles the bookkeeping on every exit
//! path, including cancellation.

pub mod registry;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures_util::future::BoxFuture;
use log::{debug, warn};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::adapter::Session;
use crate::error::{ConnectionError, Error, Result};

pub use registry::{DevicePool, PoolRegistry};

/// Builds one unconnected adapter per call; construction never does I/O.
pub type AdapterFactory<A> = Box<dyn Fn() -> Result<A> + Send + Sync>;

/// Pool sizing and lifetime knobs.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Upper bound on live connections (idle + leased).
    pub max_connections: usize,

    /// Idle sessions older than this are evicted by the reaper.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            idle_timeout: Duration::from_secs(300),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

struct PoolEntry<A> {
    adapter: A,
    last_activity: Instant,
}

struct PoolState<A> {
    idle: Vec<PoolEntry<A>>,
    active: HashMap<u64, Instant>,
    next_lease: u64,
    closed: bool,
}

/// Bounded pool of sessions to one device.
///
/// Generic over [`Session`] so adapter behavior stays out of pool logic;
/// production pools hold `Box<dyn OltAdapter>`. The mutex guards only
/// state mutation; connects, commands, and disconnects all happen outside
/// it on an exclusively leased adapter.
pub struct ConnectionPool<A: Session + 'static> {
    host: String,
    config: PoolConfig,
    factory: AdapterFactory<A>,
    state: Mutex<PoolState<A>>,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Session + 'static> ConnectionPool<A> {
    /// Create a pool and spawn its reaper task.
    ///
    /// Must be called within a tokio runtime. The reaper holds only a weak
    /// reference and exits once the pool is dropped.
    pub fn new(
        host: impl Into<String>,
        config: PoolConfig,
        factory: AdapterFactory<A>,
    ) -> Arc<Self> {
        let pool = Arc::new(Self {
            host: host.into(),
            config,
            factory,
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                active: HashMap::new(),
                next_lease: 0,
                closed: false,
            }),
            reaper: Mutex::new(None),
        });

        let handle = tokio::spawn(reap_loop(
            Arc::downgrade(&pool),
            pool.config.idle_timeout,
        ));
        *pool.lock_reaper() = Some(handle);
        pool
    }

    /// Run `op` against an exclusively leased adapter.
    ///
    /// Checkout takes the most recently released idle session or builds a
    /// new one within `max_connections`; at capacity this fails fast with
    /// [`Error::PoolExhausted`]. A session that is not live gets exactly
    /// one reconnect attempt before the lease errors. On closure error
    /// the adapter is disconnected and discarded, never recycled.
    pub async fn with_adapter<T, F>(&self, op: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a mut A) -> BoxFuture<'a, Result<T>>,
    {
        let (lease_id, adapter) = self.checkout()?;
        let mut lease = Lease {
            pool: self,
            lease_id,
            adapter: Some(adapter),
        };

        if !lease.adapter_mut().is_connected() {
            debug!("{}: leased session not live, reconnecting", self.host);
            if !lease.adapter_mut().connect().await {
                self.discard(lease_id, lease.defuse()).await;
                return Err(ConnectionError::ReconnectFailed {
                    host: self.host.clone(),
                }
                .into());
            }
        }

        match op(lease.adapter_mut()).await {
            Ok(value) => {
                let adapter = lease.defuse();
                if let Some(mut excess) = self.check_in(lease_id, adapter) {
                    excess.disconnect().await;
                }
                Ok(value)
            }
            Err(e) => {
                self.discard(lease_id, lease.defuse()).await;
                Err(e)
            }
        }
    }

    /// Disconnect idle sessions whose last activity exceeds the idle
    /// timeout; returns how many were evicted.
    pub async fn evict_idle(&self) -> usize {
        let expired: Vec<A> = {
            let mut state = self.lock_state();
            let now = Instant::now();
            let timeout = self.config.idle_timeout;

            let mut keep = Vec::with_capacity(state.idle.len());
            let mut expired = Vec::new();
            for entry in state.idle.drain(..) {
                if now.duration_since(entry.last_activity) >= timeout {
                    expired.push(entry.adapter);
                } else {
                    keep.push(entry);
                }
            }
            state.idle = keep;
            expired
        };

        let count = expired.len();
        for mut adapter in expired {
            adapter.disconnect().await;
        }
        if count > 0 {
            debug!("{}: evicted {} idle session(s)", self.host, count);
        }
        count
    }

    /// Disconnect all idle sessions, stop the reaper, and refuse further
    /// leases. Sessions still leased are disconnected as they return.
    pub async fn close_all(&self) {
        let idle: Vec<A> = {
            let mut state = self.lock_state();
            state.closed = true;
            state.idle.drain(..).map(|entry| entry.adapter).collect()
        };
        for mut adapter in idle {
            adapter.disconnect().await;
        }
        if let Some(handle) = self.lock_reaper().take() {
            handle.abort();
        }
        debug!("{}: pool closed", self.host);
    }

    /// Number of currently leased sessions.
    pub fn active_count(&self) -> usize {
        self.lock_state().active.len()
    }

    /// Number of idle sessions available for reuse.
    pub fn idle_count(&self) -> usize {
        self.lock_state().idle.len()
    }

    fn checkout(&self) -> Result<(u64, A)> {
        let mut state = self.lock_state();
        if state.closed {
            return Err(ConnectionError::PoolClosed.into());
        }

        let lease_id = state.next_lease;
        state.next_lease += 1;

        if let Some(entry) = state.idle.pop() {
            state.active.insert(lease_id, Instant::now());
            return Ok((lease_id, entry.adapter));
        }

        if state.active.len() >= self.config.max_connections {
            return Err(Error::PoolExhausted {
                active: state.active.len(),
                max: self.config.max_connections,
            });
        }

        // Reserve the slot before running the factory outside the lock.
        state.active.insert(lease_id, Instant::now());
        drop(state);

        match (self.factory)() {
            Ok(adapter) => Ok((lease_id, adapter)),
            Err(e) => {
                self.forget_lease(lease_id);
                Err(e)
            }
        }
    }

    /// Return a healthy adapter; yields it back when the pool is closed
    /// or already at capacity, for the caller to disconnect outside the
    /// lock.
    fn check_in(&self, lease_id: u64, adapter: A) -> Option<A> {
        let mut state = self.lock_state();
        state.active.remove(&lease_id);
        if state.closed || state.idle.len() + state.active.len() >= self.config.max_connections {
            return Some(adapter);
        }
        state.idle.push(PoolEntry {
            adapter,
            last_activity: Instant::now(),
        });
        None
    }

    async fn discard(&self, lease_id: u64, mut adapter: A) {
        self.forget_lease(lease_id);
        adapter.disconnect().await;
    }

    fn forget_lease(&self, lease_id: u64) {
        self.lock_state().active.remove(&lease_id);
    }

    // A thread that panicked while holding the lock leaves consistent
    // state behind; every critical section here is a complete mutation.
    fn lock_state(&self) -> MutexGuard<'_, PoolState<A>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_reaper(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.reaper.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: Session + 'static> Drop for ConnectionPool<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_reaper().take() {
            handle.abort();
        }
        let state = self.lock_state();
        let remaining = state.idle.len() + state.active.len();
        if remaining > 0 && !state.closed {
            warn!(
                "{}: pool dropped with {} session(s) not closed",
                self.host, remaining
            );
        }
    }
}

async fn reap_loop<A: Session + 'static>(pool: Weak<ConnectionPool<A>>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; skip it.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let Some(pool) = pool.upgrade() else { break };
        pool.evict_idle().await;
    }
}

/// Settles pool bookkeeping when a lease is abandoned mid-operation
/// (caller cancelled or panicked) instead of leaking the slot.
struct Lease<'p, A: Session + 'static> {
    pool: &'p ConnectionPool<A>,
    lease_id: u64,
    adapter: Option<A>,
}

impl<A: Session + 'static> Lease<'_, A> {
    fn adapter_mut(&mut self) -> &mut A {
        self.adapter
            .as_mut()
            .expect("lease holds its adapter until resolved")
    }

    /// Take the adapter out, turning Drop into a no-op.
    fn defuse(mut self) -> A {
        self.adapter
            .take()
            .expect("lease holds its adapter until resolved")
    }
}

impl<A: Session + 'static> Drop for Lease<'_, A> {
    fn drop(&mut self) {
        let Some(mut adapter) = self.adapter.take() else {
            return;
        };
        self.pool.forget_lease(self.lease_id);
        warn!("{}: lease abandoned, disconnecting", self.pool.host);
        // Drop cannot await; hand the disconnect to the runtime if one is
        // still there, otherwise the transport closes with the adapter.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move { adapter.disconnect().await });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    /// Shared handles into every session a test pool builds.
    #[derive(Clone, Default)]
    struct SessionProbe {
        connects: Arc<AtomicUsize>,
        disconnects: Arc<AtomicUsize>,
        fail_connect: Arc<AtomicBool>,
        severed: Arc<AtomicBool>,
    }

    struct MockSession {
        id: usize,
        connected: bool,
        probe: SessionProbe,
    }

    #[async_trait]
    impl Session for MockSession {
        async fn connect(&mut self) -> bool {
            if self.probe.fail_connect.load(Ordering::SeqCst) {
                return false;
            }
            self.connected = true;
            // Reconnecting yields a live session again.
            self.probe.severed.store(false, Ordering::SeqCst);
            self.probe.connects.fetch_add(1, Ordering::SeqCst);
            true
        }

        async fn disconnect(&mut self) {
            self.connected = false;
            self.probe.disconnects.fetch_add(1, Ordering::SeqCst);
        }

        fn is_connected(&self) -> bool {
            self.connected && !self.probe.severed.load(Ordering::SeqCst)
        }
    }

    fn probe_pool(
        max: usize,
        idle_timeout: Duration,
    ) -> (Arc<ConnectionPool<MockSession>>, SessionProbe, Arc<AtomicUsize>) {
        let probe = SessionProbe::default();
        let built = Arc::new(AtomicUsize::new(0));
        let factory_probe = probe.clone();
        let factory_built = Arc::clone(&built);
        let pool = ConnectionPool::new(
            "10.0.0.1",
            PoolConfig::new()
                .with_max_connections(max)
                .with_idle_timeout(idle_timeout),
            Box::new(move || {
                let id = factory_built.fetch_add(1, Ordering::SeqCst);
                Ok(MockSession {
                    id,
                    connected: false,
                    probe: factory_probe.clone(),
                })
            }),
        );
        (pool, probe, built)
    }

    async fn lease_id_of(pool: &ConnectionPool<MockSession>) -> usize {
        pool.with_adapter(|session| Box::pin(async move { Ok(session.id) }))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_sequential_leases_reuse_one_session() {
        let (pool, probe, built) = probe_pool(4, Duration::from_secs(300));

        assert_eq!(lease_id_of(&pool).await, 0);
        assert_eq!(lease_id_of(&pool).await, 0);

        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(probe.connects.load(Ordering::SeqCst), 1);
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.active_count(), 0);
    }

    #[tokio::test]
    async fn test_idle_reuse_is_lifo() {
        let (pool, _probe, built) = probe_pool(4, Duration::from_secs(300));
        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let (release, released) = tokio::sync::oneshot::channel::<()>();

        let first = {
            let pool = Arc::clone(&pool);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                pool.with_adapter(|session| {
                    Box::pin(async move {
                        barrier.wait().await;
                        Ok(session.id)
                    })
                })
                .await
            })
        };
        let second = {
            let pool = Arc::clone(&pool);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                pool.with_adapter(|session| {
                    Box::pin(async move {
                        barrier.wait().await;
                        let _ = released.await;
                        Ok(session.id)
                    })
                })
                .await
            })
        };

        // First releases strictly before second.
        let first_id = first.await.unwrap().unwrap();
        release.send(()).unwrap();
        let second_id = second.await.unwrap().unwrap();

        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert_ne!(first_id, second_id);
        // Last released is first reused.
        assert_eq!(lease_id_of(&pool).await, second_id);
    }

    #[tokio::test]
    async fn test_exhausted_pool_fails_fast() {
        let (pool, _probe, _built) = probe_pool(2, Duration::from_secs(300));
        let barrier = Arc::new(tokio::sync::Barrier::new(3));

        let holders: Vec<_> = (0..2)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let barrier = Arc::clone(&barrier);
                let (release, released) = tokio::sync::oneshot::channel::<()>();
                let task = tokio::spawn(async move {
                    pool.with_adapter(|_session| {
                        Box::pin(async move {
                            barrier.wait().await;
                            let _ = released.await;
                            Ok(())
                        })
                    })
                    .await
                });
                (task, release)
            })
            .collect();

        barrier.wait().await;
        assert_eq!(pool.active_count(), 2);

        match pool.with_adapter(|_s| Box::pin(async move { Ok(()) })).await {
            Err(Error::PoolExhausted { active, max }) => {
                assert_eq!(active, 2);
                assert_eq!(max, 2);
            }
            other => panic!("unexpected: {other:?}"),
        }

        for (task, release) in holders {
            release.send(()).unwrap();
            task.await.unwrap().unwrap();
        }

        // Capacity is available again once leases return.
        pool.with_adapter(|_s| Box::pin(async move { Ok(()) }))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_evicted_after_timeout() {
        let (pool, probe, built) = probe_pool(4, Duration::from_secs(60));

        lease_id_of(&pool).await;
        assert_eq!(pool.idle_count(), 1);

        // Not yet expired.
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(pool.evict_idle().await, 0);
        assert_eq!(pool.idle_count(), 1);

        // Past the timeout; the reaper may sweep first, the direct call
        // picks up whatever remains.
        tokio::time::advance(Duration::from_secs(31)).await;
        pool.evict_idle().await;
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(probe.disconnects.load(Ordering::SeqCst), 1);

        // Next lease builds a fresh session.
        lease_id_of(&pool).await;
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_closure_error_discards_the_session() {
        let (pool, probe, built) = probe_pool(1, Duration::from_secs(300));

        let result: Result<()> = pool
            .with_adapter(|_s| {
                Box::pin(async move { Err(Error::invalid_argument("device rejected")) })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(probe.disconnects.load(Ordering::SeqCst), 1);
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.active_count(), 0);

        // The slot is free for a fresh session despite max_connections = 1.
        lease_id_of(&pool).await;
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dead_session_reconnected_once() {
        let (pool, probe, built) = probe_pool(4, Duration::from_secs(300));

        lease_id_of(&pool).await;
        assert_eq!(probe.connects.load(Ordering::SeqCst), 1);

        // Device silently dropped the pooled session.
        probe.severed.store(true, Ordering::SeqCst);
        lease_id_of(&pool).await;

        assert_eq!(probe.connects.load(Ordering::SeqCst), 2);
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_reconnect_discards_and_errors() {
        let (pool, probe, built) = probe_pool(4, Duration::from_secs(300));

        lease_id_of(&pool).await;
        probe.severed.store(true, Ordering::SeqCst);
        probe.fail_connect.store(true, Ordering::SeqCst);

        match pool.with_adapter(|s| Box::pin(async move { Ok(s.id) })).await {
            Err(Error::Connection(ConnectionError::ReconnectFailed { host })) => {
                assert_eq!(host, "10.0.0.1");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.active_count(), 0);

        // Recovery builds a fresh session.
        probe.fail_connect.store(false, Ordering::SeqCst);
        lease_id_of(&pool).await;
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_closed_pool_refuses_leases() {
        let (pool, probe, _built) = probe_pool(4, Duration::from_secs(300));

        lease_id_of(&pool).await;
        pool.close_all().await;
        assert_eq!(probe.disconnects.load(Ordering::SeqCst), 1);
        assert_eq!(pool.idle_count(), 0);

        match pool.with_adapter(|s| Box::pin(async move { Ok(s.id) })).await {
            Err(Error::Connection(ConnectionError::PoolClosed)) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_abandoned_lease_frees_the_slot() {
        let (pool, probe, built) = probe_pool(1, Duration::from_secs(300));
        let barrier = Arc::new(tokio::sync::Barrier::new(2));

        let holder = {
            let pool = Arc::clone(&pool);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                pool.with_adapter(|_s| {
                    Box::pin(async move {
                        barrier.wait().await;
                        std::future::pending::<()>().await;
                        Ok(())
                    })
                })
                .await
            })
        };

        barrier.wait().await;
        assert_eq!(pool.active_count(), 1);

        // Caller gives up mid-operation.
        holder.abort();
        let _ = holder.await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        assert_eq!(pool.active_count(), 0);
        assert_eq!(probe.disconnects.load(Ordering::SeqCst), 1);

        // The single slot is usable again.
        lease_id_of(&pool).await;
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }
}
