// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process script executor.
//!
//! Holds the whole key-space behind one mutex and runs each script under a
//! single guard acquisition, which gives the same all-or-nothing, totally
//! ordered semantics as a remote store. Lock tokens expire against the
//! injected [`Clock`]. Shared by clones; not shared across processes.

use crate::error::{Result, StoreError};
use crate::index::Membership;
use crate::keys::{field, lock_key, ALL_BAKES, INCOMPLETE_BAKES};
use crate::script::{Script, ScriptExecutor, ScriptReply};
use async_trait::async_trait;
use bakery_core::{BakeKey, Clock, SystemClock};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct Expiring {
    value: String,
    expires_at_ms: u64,
}

#[derive(Default)]
struct Keyspace {
    hashes: HashMap<String, BTreeMap<String, String>>,
    sets: HashMap<String, BTreeSet<String>>,
    zsets: HashMap<String, HashMap<String, u64>>,
    strings: HashMap<String, Expiring>,
}

impl Keyspace {
    fn del(&mut self, key: &str) -> bool {
        let hash = self.hashes.remove(key).is_some();
        let set = self.sets.remove(key).is_some();
        let zset = self.zsets.remove(key).is_some();
        let string = self.strings.remove(key).is_some();
        hash || set || zset || string
    }

    /// Live (unexpired) string value; expired entries are purged on access.
    fn get_string(&mut self, key: &str, now_ms: u64) -> Option<&str> {
        if self.strings.get(key).is_some_and(|s| s.expires_at_ms <= now_ms) {
            self.strings.remove(key);
        }
        self.strings.get(key).map(|s| s.value.as_str())
    }

    /// Delete the lock for `bake_key` if it still carries `token`.
    fn release_lock(&mut self, bake_key: &BakeKey, token: &str, now_ms: u64) -> bool {
        let lock = lock_key(bake_key);
        if self.get_string(&lock, now_ms) == Some(token) {
            self.strings.remove(&lock);
            true
        } else {
            false
        }
    }

    fn hget(&self, key: &str, name: &str) -> Option<String> {
        self.hashes.get(key).and_then(|h| h.get(name)).cloned()
    }

    fn hset(&mut self, key: &str, name: &str, value: &str) {
        self.hashes.entry(key.to_string()).or_default().insert(name.to_string(), value.to_string());
    }

    fn sadd(&mut self, key: &str, member: &str) -> bool {
        self.sets.entry(key.to_string()).or_default().insert(member.to_string())
    }

    fn srem(&mut self, key: &str, member: &str) -> bool {
        let Some(set) = self.sets.get_mut(key) else {
            return false;
        };
        let removed = set.remove(member);
        if set.is_empty() {
            self.sets.remove(key);
        }
        removed
    }

    fn zadd(&mut self, key: &str, member: &str, score: u64) {
        self.zsets.entry(key.to_string()).or_default().insert(member.to_string(), score);
    }

    fn zrem(&mut self, key: &str, member: &str) {
        if let Some(zset) = self.zsets.get_mut(key) {
            zset.remove(member);
            if zset.is_empty() {
                self.zsets.remove(key);
            }
        }
    }

    /// Bake key of an id record, if its key record still points back at it.
    fn owned_bake_key(&self, id: &str) -> Option<String> {
        let bake_key = self.hget(id, field::BAKE_KEY)?;
        (self.hget(&bake_key, field::ID).as_deref() == Some(id)).then_some(bake_key)
    }

    /// Write fields onto an id record and mirror them onto its key record.
    /// Returns false (writing nothing) if the id record does not exist.
    fn write_mirrored(&mut self, id: &str, fields: &[(&str, &str)]) -> bool {
        if !self.hashes.contains_key(id) {
            return false;
        }
        let bake_key = self.owned_bake_key(id);
        for (name, value) in fields {
            self.hset(id, name, value);
            if let Some(key) = &bake_key {
                self.hset(key, name, value);
            }
        }
        true
    }

    fn run(&mut self, script: &Script, now_ms: u64) -> ScriptReply {
        match script {
            Script::AcquireLock { bake_key, token, ttl_ms } => {
                let lock = lock_key(bake_key);
                if self.get_string(&lock, now_ms).is_some() {
                    return ScriptReply::Flag(false);
                }
                self.strings.insert(
                    lock,
                    Expiring { value: token.clone(), expires_at_ms: now_ms.saturating_add(*ttl_ms) },
                );
                self.del(bake_key);
                ScriptReply::Flag(true)
            }

            Script::ReleaseLock { bake_key, token } => {
                ScriptReply::Flag(self.release_lock(bake_key, token, now_ms))
            }

            Script::CreateBake { bake_key, id, region, request, status, created_at_ms, token } => {
                // Leftovers under this id go, unless the key record already names it
                if self.hget(bake_key, field::ID).as_deref() != Some(id.as_str()) {
                    self.del(id);
                }
                self.zadd(ALL_BAKES, bake_key, *created_at_ms);
                if let Some(existing) = self.hget(bake_key, field::BAKE_STATUS) {
                    self.release_lock(bake_key, token, now_ms);
                    return ScriptReply::Payload(existing);
                }
                let created = created_at_ms.to_string();
                let shared = [
                    (field::ID, id.as_str()),
                    (field::REGION, region.as_str()),
                    (field::BAKE_REQUEST, request.as_str()),
                    (field::BAKE_STATUS, status.as_str()),
                    (field::CREATION_TIMESTAMP, created.as_str()),
                ];
                for (name, value) in shared {
                    self.hset(id, name, value);
                    self.hset(bake_key, name, value);
                }
                self.hset(id, field::BAKE_KEY, bake_key);
                self.sadd(INCOMPLETE_BAKES, id);
                self.release_lock(bake_key, token, now_ms);
                ScriptReply::Payload(status.clone())
            }

            Script::UpdateDetails { id, details } => {
                ScriptReply::Flag(self.write_mirrored(id, &[(field::BAKE_DETAILS, details.as_str())]))
            }

            Script::UpdateStatus { id, status, logs, membership } => {
                let written = self.write_mirrored(
                    id,
                    &[(field::BAKE_STATUS, status.as_str()), (field::BAKE_LOGS, logs.as_str())],
                );
                if written {
                    match membership {
                        Membership::Add => self.sadd(INCOMPLETE_BAKES, id),
                        Membership::Remove => self.srem(INCOMPLETE_BAKES, id),
                    };
                }
                ScriptReply::Flag(written)
            }

            Script::StoreBakeError { id, error } => {
                ScriptReply::Flag(self.write_mirrored(id, &[(field::BAKE_ERROR, error.as_str())]))
            }

            Script::DeleteByKey { bake_key } => {
                let id = self.hget(bake_key, field::ID);
                self.zrem(ALL_BAKES, bake_key);
                let existed = self.del(bake_key);
                if let Some(id) = id {
                    self.srem(INCOMPLETE_BAKES, &id);
                    self.del(&id);
                }
                ScriptReply::Flag(existed)
            }

            Script::CancelById { id, state, result } => {
                let removed = self.srem(INCOMPLETE_BAKES, id);
                if removed && self.hashes.contains_key(id.as_str()) {
                    let cancelled = cancelled_status(self.hget(id, field::BAKE_STATUS), id, state, result);
                    self.hset(id, field::BAKE_STATUS, &cancelled);
                }
                if let Some(bake_key) = self.owned_bake_key(id) {
                    self.zrem(ALL_BAKES, &bake_key);
                    self.del(&bake_key);
                }
                ScriptReply::Flag(removed)
            }
        }
    }
}

/// Rewrite `state`/`result` of a stored status, keeping every other field.
fn cancelled_status(raw: Option<String>, id: &str, state: &str, result: &str) -> String {
    let mut status = match raw.and_then(|r| serde_json::from_str::<serde_json::Value>(&r).ok()) {
        Some(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    status.insert("id".to_string(), id.into());
    status.insert("state".to_string(), state.into());
    status.insert("result".to_string(), result.into());
    serde_json::Value::Object(status).to_string()
}

/// Script executor backed by an in-process key-space.
#[derive(Clone)]
pub struct MemoryExecutor<C: Clock = SystemClock> {
    keyspace: Arc<Mutex<Keyspace>>,
    clock: C,
    unavailable: Arc<AtomicBool>,
}

impl MemoryExecutor<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryExecutor<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryExecutor<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            keyspace: Arc::new(Mutex::new(Keyspace::default())),
            clock,
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulate a store outage: every call fails with `StoreError::Unavailable`
    /// until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Whether any value (unexpired, for lock tokens) exists under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        let now_ms = self.clock.epoch_ms();
        let mut ks = self.keyspace.lock();
        ks.hashes.contains_key(key)
            || ks.sets.contains_key(key)
            || ks.zsets.contains_key(key)
            || ks.get_string(key, now_ms).is_some()
    }

    /// All fields of a hash record.
    pub fn record(&self, key: &str) -> Option<BTreeMap<String, String>> {
        self.keyspace.lock().hashes.get(key).cloned()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store marked unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl<C: Clock> ScriptExecutor for MemoryExecutor<C> {
    async fn execute(&self, script: &Script) -> Result<ScriptReply> {
        self.check_available()?;
        let now_ms = self.clock.epoch_ms();
        let reply = self.keyspace.lock().run(script, now_ms);
        Ok(reply)
    }

    async fn hget(&self, key: &str, name: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.keyspace.lock().hget(key, name))
    }

    async fn smembers(&self, key: &str) -> Result<BTreeSet<String>> {
        self.check_available()?;
        Ok(self.keyspace.lock().sets.get(key).cloned().unwrap_or_default())
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<(String, u64)>> {
        self.check_available()?;
        let mut entries: Vec<(String, u64)> = match self.keyspace.lock().zsets.get(key) {
            Some(zset) => zset.iter().map(|(m, s)| (m.clone(), *s)).collect(),
            None => return Ok(Vec::new()),
        };
        entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let len = entries.len() as isize;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Ok(Vec::new());
        }
        Ok(entries.drain(start as usize..=stop as usize).collect())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
