// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global indices: every live bake key by creation time, and the ids of
//! incomplete bakes.
//!
//! Index writes only ever happen inside record scripts, in the same
//! transaction as the status write they reflect. This module decides what
//! those scripts do to the incomplete index and serves the index reads.

use crate::error::Result;
use crate::keys::{ALL_BAKES, INCOMPLETE_BAKES};
use crate::script::ScriptExecutor;
use bakery_core::{BakeId, BakeKey, BakeState};
use std::collections::BTreeSet;

/// Effect of a status write on the incomplete index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Add,
    Remove,
}

impl Membership {
    /// Non-terminal states keep the id in the index; terminal states drop it.
    pub fn for_state(state: &BakeState) -> Self {
        if state.is_terminal() {
            Membership::Remove
        } else {
            Membership::Add
        }
    }

    /// Script argument encoding.
    pub fn as_arg(&self) -> &'static str {
        match self {
            Membership::Add => "add",
            Membership::Remove => "remove",
        }
    }
}

/// An entry of the all-bakes index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedBake {
    pub bake_key: BakeKey,
    pub created_at_ms: u64,
}

/// Read side of the global indices.
#[derive(Clone)]
pub struct GlobalIndexer<E: ScriptExecutor> {
    executor: E,
}

impl<E: ScriptExecutor> GlobalIndexer<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Current contents of the incomplete index, verbatim.
    pub async fn incomplete_ids(&self) -> Result<BTreeSet<BakeId>> {
        let members = self.executor.smembers(INCOMPLETE_BAKES).await?;
        Ok(members.into_iter().map(BakeId::from).collect())
    }

    /// Page through the all-bakes index, oldest first.
    pub async fn bake_keys(&self, offset: usize, limit: usize) -> Result<Vec<IndexedBake>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let start = isize::try_from(offset).unwrap_or(isize::MAX);
        let stop = start.saturating_add(isize::try_from(limit).unwrap_or(isize::MAX) - 1);
        let entries = self.executor.zrange(ALL_BAKES, start, stop).await?;
        Ok(entries
            .into_iter()
            .map(|(key, created_at_ms)| IndexedBake { bake_key: BakeKey::from(key), created_at_ms })
            .collect())
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
