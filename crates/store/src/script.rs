// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional script layer.
//!
//! Every multi-key mutation is a named [`Script`] executed by a
//! [`ScriptExecutor`] as one indivisible unit: no reader observes a partially
//! applied script, and concurrent scripts are totally ordered by the store.
//! Variable data travels only as bound `KEYS`/`ARGV` parameters; the script
//! name is a log label and never part of the executed logic.

use crate::error::{Result, StoreError};
use crate::index::Membership;
use crate::keys::{self, ALL_BAKES, INCOMPLETE_BAKES};
use async_trait::async_trait;
use bakery_core::{BakeId, BakeKey};
use std::collections::BTreeSet;

/// A named atomic operation with its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Set `lock:<key>` if absent (with TTL) and drop any stale key record.
    AcquireLock { bake_key: BakeKey, token: String, ttl_ms: u64 },
    /// Delete `lock:<key>` if it still carries `token`.
    ReleaseLock { bake_key: BakeKey, token: String },
    /// Race-checked creation of both records, index updates, and release of
    /// the lock if it still carries `token`.
    CreateBake {
        bake_key: BakeKey,
        id: BakeId,
        region: String,
        request: String,
        status: String,
        created_at_ms: u64,
        token: String,
    },
    UpdateDetails { id: BakeId, details: String },
    UpdateStatus { id: BakeId, status: String, logs: String, membership: Membership },
    StoreBakeError { id: BakeId, error: String },
    DeleteByKey { bake_key: BakeKey },
    /// `state`/`result` are the names written into the cancelled status.
    CancelById { id: BakeId, state: String, result: String },
}

/// Shape of the value a script replies with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Integer 0/1
    Flag,
    /// Encoded payload string
    Payload,
}

/// Value returned by an executed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptReply {
    Flag(bool),
    Payload(String),
}

impl ScriptReply {
    pub fn into_flag(self, script: &'static str) -> Result<bool> {
        match self {
            ScriptReply::Flag(flag) => Ok(flag),
            ScriptReply::Payload(_) => Err(StoreError::Script {
                script,
                message: "expected an integer reply, got a payload".to_string(),
            }),
        }
    }

    pub fn into_payload(self, script: &'static str) -> Result<String> {
        match self {
            ScriptReply::Payload(payload) => Ok(payload),
            ScriptReply::Flag(_) => Err(StoreError::Script {
                script,
                message: "expected a payload reply, got an integer".to_string(),
            }),
        }
    }
}

impl Script {
    /// Stable name used for log labels and error context.
    pub fn name(&self) -> &'static str {
        match self {
            Script::AcquireLock { .. } => "acquire_lock",
            Script::ReleaseLock { .. } => "release_lock",
            Script::CreateBake { .. } => "create_bake",
            Script::UpdateDetails { .. } => "update_details",
            Script::UpdateStatus { .. } => "update_status",
            Script::StoreBakeError { .. } => "store_error",
            Script::DeleteByKey { .. } => "delete_by_key",
            Script::CancelById { .. } => "cancel_by_id",
        }
    }

    pub fn reply_kind(&self) -> ReplyKind {
        match self {
            Script::CreateBake { .. } => ReplyKind::Payload,
            _ => ReplyKind::Flag,
        }
    }

    /// Keys the script touches directly, in `KEYS[n]` order.
    ///
    /// Records reached through a stored pointer are resolved inside the
    /// script and are not listed.
    pub fn keys(&self) -> Vec<String> {
        match self {
            Script::AcquireLock { bake_key, .. } => {
                vec![keys::lock_key(bake_key), bake_key.to_string()]
            }
            Script::ReleaseLock { bake_key, .. } => vec![keys::lock_key(bake_key)],
            Script::CreateBake { bake_key, id, .. } => vec![
                id.to_string(),
                bake_key.to_string(),
                ALL_BAKES.to_string(),
                INCOMPLETE_BAKES.to_string(),
                keys::lock_key(bake_key),
            ],
            Script::UpdateDetails { id, .. } | Script::StoreBakeError { id, .. } => {
                vec![id.to_string()]
            }
            Script::UpdateStatus { id, .. } => vec![id.to_string(), INCOMPLETE_BAKES.to_string()],
            Script::DeleteByKey { bake_key } => {
                vec![bake_key.to_string(), ALL_BAKES.to_string(), INCOMPLETE_BAKES.to_string()]
            }
            Script::CancelById { id, .. } => {
                vec![id.to_string(), ALL_BAKES.to_string(), INCOMPLETE_BAKES.to_string()]
            }
        }
    }

    /// Bound arguments, in `ARGV[n]` order.
    pub fn args(&self) -> Vec<String> {
        match self {
            Script::AcquireLock { token, ttl_ms, .. } => vec![token.clone(), ttl_ms.to_string()],
            Script::ReleaseLock { token, .. } => vec![token.clone()],
            Script::CreateBake { id, region, request, status, created_at_ms, token, .. } => vec![
                id.to_string(),
                region.clone(),
                request.clone(),
                status.clone(),
                created_at_ms.to_string(),
                token.clone(),
            ],
            Script::UpdateDetails { id, details } => vec![id.to_string(), details.clone()],
            Script::UpdateStatus { id, status, logs, membership } => {
                vec![id.to_string(), status.clone(), logs.clone(), membership.as_arg().to_string()]
            }
            Script::StoreBakeError { id, error } => vec![id.to_string(), error.clone()],
            Script::DeleteByKey { .. } => Vec::new(),
            Script::CancelById { id, state, result } => {
                vec![id.to_string(), state.clone(), result.clone()]
            }
        }
    }
}

/// Backing store that executes scripts atomically and serves point reads.
///
/// Each call is one round trip. Implementations acquire whatever connection
/// they need for the duration of the call and release it on every exit path.
#[async_trait]
pub trait ScriptExecutor: Clone + Send + Sync + 'static {
    /// Execute a script as a single atomic transaction.
    async fn execute(&self, script: &Script) -> Result<ScriptReply>;

    /// Read one field of a hash record.
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Read all members of a set.
    async fn smembers(&self, key: &str) -> Result<BTreeSet<String>>;

    /// Read a rank range of a sorted set (ascending score, inclusive bounds,
    /// negative indexes count from the end), with scores.
    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<(String, u64)>>;
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
