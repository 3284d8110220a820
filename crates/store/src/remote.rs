// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis-backed script executor.
//!
//! Scripts run as Lua (`EVALSHA`, falling back to `EVAL` on a cold script
//! cache), which Redis executes atomically. A connection is opened for each
//! call and dropped when the call returns, on success or failure.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::script::{ReplyKind, Script, ScriptExecutor, ScriptReply};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

struct LuaScripts {
    acquire_lock: redis::Script,
    release_lock: redis::Script,
    create_bake: redis::Script,
    update_details: redis::Script,
    update_status: redis::Script,
    store_error: redis::Script,
    delete_by_key: redis::Script,
    cancel_by_id: redis::Script,
}

impl LuaScripts {
    fn load() -> Self {
        Self {
            acquire_lock: redis::Script::new(include_str!("lua/acquire_lock.lua")),
            release_lock: redis::Script::new(include_str!("lua/release_lock.lua")),
            create_bake: redis::Script::new(include_str!("lua/create_bake.lua")),
            update_details: redis::Script::new(include_str!("lua/update_details.lua")),
            update_status: redis::Script::new(include_str!("lua/update_status.lua")),
            store_error: redis::Script::new(include_str!("lua/store_error.lua")),
            delete_by_key: redis::Script::new(include_str!("lua/delete_by_key.lua")),
            cancel_by_id: redis::Script::new(include_str!("lua/cancel_by_id.lua")),
        }
    }

    fn get(&self, script: &Script) -> &redis::Script {
        match script {
            Script::AcquireLock { .. } => &self.acquire_lock,
            Script::ReleaseLock { .. } => &self.release_lock,
            Script::CreateBake { .. } => &self.create_bake,
            Script::UpdateDetails { .. } => &self.update_details,
            Script::UpdateStatus { .. } => &self.update_status,
            Script::StoreBakeError { .. } => &self.store_error,
            Script::DeleteByKey { .. } => &self.delete_by_key,
            Script::CancelById { .. } => &self.cancel_by_id,
        }
    }
}

/// Script executor for a shared Redis instance.
#[derive(Clone)]
pub struct RedisExecutor {
    client: redis::Client,
    connect_timeout: Duration,
    scripts: Arc<LuaScripts>,
}

impl RedisExecutor {
    /// Validate the configured URL. No connection is made until the first call.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let client = redis::Client::open(config.redis_url.as_str())
            .map_err(|e| StoreError::Config(format!("redis url {:?}: {e}", config.redis_url)))?;
        Ok(Self {
            client,
            connect_timeout: config.connect_timeout,
            scripts: Arc::new(LuaScripts::load()),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        match tokio::time::timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        {
            Ok(conn) => Ok(conn?),
            Err(_) => Err(StoreError::Unavailable(format!(
                "connect timed out after {}ms",
                self.connect_timeout.as_millis()
            ))),
        }
    }
}

/// Attach the script name to non-connectivity failures.
fn script_error(script: &Script, e: redis::RedisError) -> StoreError {
    match StoreError::from(e) {
        StoreError::Script { message, .. } => StoreError::Script { script: script.name(), message },
        other => other,
    }
}

#[async_trait]
impl ScriptExecutor for RedisExecutor {
    async fn execute(&self, script: &Script) -> Result<ScriptReply> {
        let mut conn = self.connection().await?;
        let mut invocation = self.scripts.get(script).prepare_invoke();
        for key in script.keys() {
            invocation.key(key);
        }
        for arg in script.args() {
            invocation.arg(arg);
        }
        tracing::debug!(script = script.name(), "executing store script");

        match script.reply_kind() {
            ReplyKind::Flag => {
                let n: i64 =
                    invocation.invoke_async(&mut conn).await.map_err(|e| script_error(script, e))?;
                Ok(ScriptReply::Flag(n != 0))
            }
            ReplyKind::Payload => {
                let payload: String =
                    invocation.invoke_async(&mut conn).await.map_err(|e| script_error(script, e))?;
                Ok(ScriptReply::Payload(payload))
            }
        }
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.hget(key, field).await?;
        Ok(value)
    }

    async fn smembers(&self, key: &str) -> Result<BTreeSet<String>> {
        let mut conn = self.connection().await?;
        let members: BTreeSet<String> = conn.smembers(key).await?;
        Ok(members)
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<(String, u64)>> {
        let mut conn = self.connection().await?;
        let entries: Vec<(String, f64)> = conn.zrange_withscores(key, start, stop).await?;
        Ok(entries.into_iter().map(|(member, score)| (member, score as u64)).collect())
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
