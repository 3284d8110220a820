//! Shared fixtures for the behavioural specs.

pub use bakery_core::test_support::{sample_logs, sample_request};
pub use bakery_core::{
    BakeDetails, BakeId, BakeKey, BakeLogs, BakeResult, BakeState, BakeStatus, Clock, FakeClock,
};
pub use bakery_store::{keys, BakeStore, MemoryExecutor, ScriptExecutor, StoreConfig};
pub use std::collections::BTreeSet;
pub use std::time::Duration;

pub type MemoryStore = BakeStore<MemoryExecutor<FakeClock>, FakeClock>;

/// Several service instances sharing one key-space and one clock.
pub struct Cluster {
    pub clock: FakeClock,
    pub executor: MemoryExecutor<FakeClock>,
}

impl Cluster {
    pub fn new() -> Self {
        let clock = FakeClock::new();
        Self { executor: MemoryExecutor::with_clock(clock.clone()), clock }
    }

    /// A store handle for one instance, identified by `instance_id`.
    pub fn instance(&self, instance_id: &str) -> MemoryStore {
        let config = StoreConfig { instance_id: instance_id.to_string(), ..StoreConfig::default() };
        BakeStore::new(self.executor.clone(), self.clock.clone(), &config)
    }
}

pub fn ids(values: &[&str]) -> BTreeSet<BakeId> {
    values.iter().map(|v| BakeId::new(*v)).collect()
}

/// Acquire the lock for `key` and create a bake under `id` in us-east-1.
pub async fn start_bake(store: &MemoryStore, key: &str, id: &str) -> BakeStatus {
    let key = BakeKey::new(key);
    assert!(store.acquire_bake_lock(&key).await.unwrap(), "lock for {key} already held");
    store.create_bake(&key, "us-east-1", &sample_request("app"), &BakeId::new(id)).await.unwrap()
}
