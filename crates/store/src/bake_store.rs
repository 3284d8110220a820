// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Public contract of the bake store.
//!
//! Orchestration calls [`BakeStore::acquire_bake_lock`], then
//! [`BakeStore::create_bake`], pushes progress with the update methods, and
//! finally deletes or cancels the bake. A `false` lock result means another
//! attempt is in flight: read its status by key instead of retrying.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::index::{GlobalIndexer, IndexedBake};
use crate::lock::LockManager;
use crate::memory::MemoryExecutor;
use crate::record::RecordStore;
use crate::remote::RedisExecutor;
use crate::script::ScriptExecutor;
use bakery_core::{
    BakeDetails, BakeId, BakeKey, BakeLogs, BakeRequest, BakeStatus, Clock, SystemClock,
};
use std::collections::BTreeSet;

/// Lock manager, record store, and indexer over one shared executor.
#[derive(Clone)]
pub struct BakeStore<E: ScriptExecutor, C: Clock = SystemClock> {
    locks: LockManager<E>,
    records: RecordStore<E, C>,
    index: GlobalIndexer<E>,
}

impl BakeStore<RedisExecutor> {
    /// Store backed by the Redis instance named in `config`.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let executor = RedisExecutor::open(config)?;
        tracing::info!(instance_id = %config.instance_id, "opened redis bake store");
        Ok(Self::new(executor, SystemClock, config))
    }
}

impl<C: Clock> BakeStore<MemoryExecutor<C>, C> {
    /// Store over a fresh in-process key-space.
    pub fn in_memory(clock: C, config: &StoreConfig) -> Self {
        Self::new(MemoryExecutor::with_clock(clock.clone()), clock, config)
    }
}

impl<E: ScriptExecutor, C: Clock> BakeStore<E, C> {
    pub fn new(executor: E, clock: C, config: &StoreConfig) -> Self {
        Self {
            locks: LockManager::new(executor.clone(), config.instance_id.clone(), config.lock_ttl),
            records: RecordStore::new(executor.clone(), clock, config.instance_id.clone()),
            index: GlobalIndexer::new(executor),
        }
    }

    /// Token this instance writes into the locks it takes.
    pub fn instance_id(&self) -> &str {
        self.locks.token()
    }

    pub async fn acquire_bake_lock(&self, bake_key: &BakeKey) -> Result<bool> {
        self.locks.acquire(bake_key).await
    }

    /// Release a lock this instance holds without creating a bake.
    pub async fn release_bake_lock(&self, bake_key: &BakeKey) -> Result<bool> {
        self.locks.release(bake_key).await
    }

    /// Create the bake and release the lock. Returns the authoritative status
    /// for the key, which belongs to another id if this caller lost a race.
    pub async fn create_bake(
        &self,
        bake_key: &BakeKey,
        region: &str,
        request: &BakeRequest,
        id: &BakeId,
    ) -> Result<BakeStatus> {
        self.records.create(bake_key, region, request, id).await
    }

    pub async fn update_bake_details(&self, id: &BakeId, details: &BakeDetails) -> Result<()> {
        self.records.update_details(id, details).await
    }

    pub async fn update_bake_status(
        &self,
        id: &BakeId,
        status: &BakeStatus,
        logs: &BakeLogs,
    ) -> Result<()> {
        self.records.update_status(id, status, logs).await
    }

    pub async fn store_bake_error(&self, id: &BakeId, error: &str) -> Result<()> {
        self.records.store_error(id, error).await
    }

    pub async fn retrieve_region_by_id(&self, id: &BakeId) -> Result<Option<String>> {
        self.records.retrieve_region(id).await
    }

    pub async fn retrieve_bake_status_by_key(&self, bake_key: &BakeKey) -> Result<Option<BakeStatus>> {
        self.records.retrieve_status_by_key(bake_key).await
    }

    pub async fn retrieve_bake_status_by_id(&self, id: &BakeId) -> Result<Option<BakeStatus>> {
        self.records.retrieve_status_by_id(id).await
    }

    pub async fn retrieve_bake_details_by_id(&self, id: &BakeId) -> Result<Option<BakeDetails>> {
        self.records.retrieve_details(id).await
    }

    pub async fn retrieve_bake_logs_by_id(&self, id: &BakeId) -> Result<Option<BakeLogs>> {
        self.records.retrieve_logs(id).await
    }

    pub async fn retrieve_bake_request_by_id(&self, id: &BakeId) -> Result<Option<BakeRequest>> {
        self.records.retrieve_request(id).await
    }

    pub async fn retrieve_bake_error_by_id(&self, id: &BakeId) -> Result<Option<String>> {
        self.records.retrieve_error(id).await
    }

    pub async fn delete_bake_by_key(&self, bake_key: &BakeKey) -> Result<bool> {
        self.records.delete_by_key(bake_key).await
    }

    pub async fn cancel_bake_by_id(&self, id: &BakeId) -> Result<bool> {
        self.records.cancel_by_id(id).await
    }

    pub async fn get_incomplete_bake_ids(&self) -> Result<BTreeSet<BakeId>> {
        self.index.incomplete_ids().await
    }

    /// Page through every live bake key, oldest first.
    pub async fn list_bake_keys(&self, offset: usize, limit: usize) -> Result<Vec<IndexedBake>> {
        self.index.bake_keys(offset, limit).await
    }
}

#[cfg(test)]
#[path = "bake_store_tests.rs"]
mod tests;
