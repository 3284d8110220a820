// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-bake-key creation lock.
//!
//! The lock is a token stored under `lock:<bakeKey>` with a fixed TTL. There
//! is no owner-death unlock path: an abandoned lock simply expires. A
//! successful creation deletes its own token inside the creation script, so the
//! critical section ends as soon as the records are written.

use crate::error::Result;
use crate::script::{Script, ScriptExecutor};
use bakery_core::BakeKey;
use std::time::Duration;

/// Lock TTL used by existing deployments.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_millis(5_000);

/// Acquires and releases creation locks.
#[derive(Clone)]
pub struct LockManager<E: ScriptExecutor> {
    executor: E,
    token: String,
    ttl: Duration,
}

impl<E: ScriptExecutor> LockManager<E> {
    pub fn new(executor: E, token: impl Into<String>, ttl: Duration) -> Self {
        Self { executor, token: token.into(), ttl }
    }

    /// Token this manager writes into the locks it takes.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Take the lock for `bake_key` if nobody holds it.
    ///
    /// On success any stale key record left by an aborted attempt is dropped
    /// in the same transaction. `false` means another bake for this key is in
    /// flight; callers should read its status rather than retry.
    pub async fn acquire(&self, bake_key: &BakeKey) -> Result<bool> {
        let ttl_ms = u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX);
        let script =
            Script::AcquireLock { bake_key: bake_key.clone(), token: self.token.clone(), ttl_ms };
        let acquired = self.executor.execute(&script).await?.into_flag(script.name())?;
        if acquired {
            tracing::info!(%bake_key, ttl_ms, "acquired bake lock");
        } else {
            tracing::debug!(%bake_key, "bake lock already held");
        }
        Ok(acquired)
    }

    /// Give up a lock taken by this manager without creating a bake.
    ///
    /// Returns false if the lock expired or belongs to someone else.
    pub async fn release(&self, bake_key: &BakeKey) -> Result<bool> {
        let script = Script::ReleaseLock { bake_key: bake_key.clone(), token: self.token.clone() };
        let released = self.executor.execute(&script).await?.into_flag(script.name())?;
        tracing::debug!(%bake_key, released, "released bake lock");
        Ok(released)
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
