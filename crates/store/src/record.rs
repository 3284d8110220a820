// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dual-indexed bake records.
//!
//! Each bake is stored twice: under its id (with a `bakeKey` back-pointer)
//! and under its bake key (with an `id` forward pointer). Status, details,
//! logs, and error are mirrored onto the key record for as long as that
//! record still points at the id. All writes are single scripts; reads are
//! plain single-field lookups.

use crate::error::Result;
use crate::index::Membership;
use crate::keys::field;
use crate::script::{Script, ScriptExecutor};
use bakery_core::{
    BakeDetails, BakeId, BakeKey, BakeLogs, BakeRequest, BakeResult, BakeState, BakeStatus, Clock,
    Payload,
};

/// Creates, mutates, reads, and removes bake records.
#[derive(Clone)]
pub struct RecordStore<E: ScriptExecutor, C: Clock> {
    executor: E,
    clock: C,
    lock_token: String,
}

impl<E: ScriptExecutor, C: Clock> RecordStore<E, C> {
    /// `lock_token` is the token this instance's creation locks carry; a
    /// creation only releases a lock holding it.
    pub fn new(executor: E, clock: C, lock_token: impl Into<String>) -> Self {
        Self { executor, clock, lock_token: lock_token.into() }
    }

    /// Create a bake for `bake_key` under `id`. The caller must hold the lock.
    ///
    /// Returns the status of whichever id is now authoritative for the key.
    /// If a key record already existed, its status is returned untouched and
    /// no new records are written: the caller lost the race and should track
    /// the returned id instead of its own.
    pub async fn create(
        &self,
        bake_key: &BakeKey,
        region: &str,
        request: &BakeRequest,
        id: &BakeId,
    ) -> Result<BakeStatus> {
        let pending = BakeStatus::pending(id.clone());
        let script = Script::CreateBake {
            bake_key: bake_key.clone(),
            id: id.clone(),
            region: region.to_string(),
            request: request.encode()?,
            status: pending.encode()?,
            created_at_ms: self.clock.epoch_ms(),
            token: self.lock_token.clone(),
        };
        let raw = self.executor.execute(&script).await?.into_payload(script.name())?;
        let status = BakeStatus::decode(&raw)?;
        if status.id == *id {
            tracing::info!(%bake_key, bake_id = %id, region, "created bake");
        } else {
            tracing::warn!(
                %bake_key,
                bake_id = %id,
                winner = %status.id,
                "lost bake creation race, returning existing status"
            );
        }
        Ok(status)
    }

    /// Replace the details of a bake.
    pub async fn update_details(&self, id: &BakeId, details: &BakeDetails) -> Result<()> {
        let script = Script::UpdateDetails { id: id.clone(), details: details.encode()? };
        self.write(id, script).await
    }

    /// Write status and logs; maintains the incomplete index in the same transaction.
    pub async fn update_status(&self, id: &BakeId, status: &BakeStatus, logs: &BakeLogs) -> Result<()> {
        let script = Script::UpdateStatus {
            id: id.clone(),
            status: status.encode()?,
            logs: logs.encode()?,
            membership: Membership::for_state(&status.state),
        };
        tracing::debug!(bake_id = %id, state = %status.state, "updating bake status");
        self.write(id, script).await
    }

    pub async fn store_error(&self, id: &BakeId, error: &str) -> Result<()> {
        let script = Script::StoreBakeError { id: id.clone(), error: error.to_string() };
        self.write(id, script).await
    }

    async fn write(&self, id: &BakeId, script: Script) -> Result<()> {
        let applied = self.executor.execute(&script).await?.into_flag(script.name())?;
        if !applied {
            tracing::warn!(bake_id = %id, script = script.name(), "no bake record for id, write dropped");
        }
        Ok(())
    }

    pub async fn retrieve_region(&self, id: &BakeId) -> Result<Option<String>> {
        self.executor.hget(id, field::REGION).await
    }

    pub async fn retrieve_status_by_key(&self, bake_key: &BakeKey) -> Result<Option<BakeStatus>> {
        self.read(bake_key, field::BAKE_STATUS).await
    }

    pub async fn retrieve_status_by_id(&self, id: &BakeId) -> Result<Option<BakeStatus>> {
        self.read(id, field::BAKE_STATUS).await
    }

    pub async fn retrieve_details(&self, id: &BakeId) -> Result<Option<BakeDetails>> {
        self.read(id, field::BAKE_DETAILS).await
    }

    pub async fn retrieve_logs(&self, id: &BakeId) -> Result<Option<BakeLogs>> {
        self.read(id, field::BAKE_LOGS).await
    }

    pub async fn retrieve_request(&self, id: &BakeId) -> Result<Option<BakeRequest>> {
        self.read(id, field::BAKE_REQUEST).await
    }

    pub async fn retrieve_error(&self, id: &BakeId) -> Result<Option<String>> {
        self.executor.hget(id, field::BAKE_ERROR).await
    }

    async fn read<P: Payload>(&self, key: &str, name: &str) -> Result<Option<P>> {
        match self.executor.hget(key, name).await? {
            Some(raw) => Ok(Some(P::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Remove the key record, its id record, and their index entries.
    ///
    /// Returns whether the key record existed; absent keys are a no-op.
    pub async fn delete_by_key(&self, bake_key: &BakeKey) -> Result<bool> {
        let script = Script::DeleteByKey { bake_key: bake_key.clone() };
        let existed = self.executor.execute(&script).await?.into_flag(script.name())?;
        if existed {
            tracing::info!(%bake_key, "deleted bake");
        }
        Ok(existed)
    }

    /// Cancel an incomplete bake.
    ///
    /// Returns true iff the id was in the incomplete index. Only then is its
    /// status rewritten to CANCELLED/FAILURE. The key record (if it still
    /// points at this id) is purged so the key can be baked again; the id
    /// record is kept for inspection.
    pub async fn cancel_by_id(&self, id: &BakeId) -> Result<bool> {
        let script = Script::CancelById {
            id: id.clone(),
            state: BakeState::Cancelled.to_string(),
            result: BakeResult::Failure.to_string(),
        };
        let cancelled = self.executor.execute(&script).await?.into_flag(script.name())?;
        if cancelled {
            tracing::info!(bake_id = %id, "cancelled bake");
        } else {
            tracing::debug!(bake_id = %id, "cancel requested for bake that is not incomplete");
        }
        Ok(cancelled)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
