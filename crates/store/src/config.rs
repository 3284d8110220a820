// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store configuration, resolved from environment variables.

use crate::error::{Result, StoreError};
use crate::lock::DEFAULT_LOCK_TTL;
use std::time::Duration;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Settings shared by the lock manager and the store connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub redis_url: String,
    pub lock_ttl: Duration,
    pub connect_timeout: Duration,
    /// Token written into the locks this instance takes
    pub instance_id: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.to_string(),
            lock_ttl: DEFAULT_LOCK_TTL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            instance_id: generate_instance_id(),
        }
    }
}

impl StoreConfig {
    /// Resolve configuration from the environment:
    ///
    /// - `BAKERY_REDIS_URL` (default `redis://127.0.0.1:6379`)
    /// - `BAKERY_LOCK_TTL_MS` (default 5000)
    /// - `BAKERY_CONNECT_TIMEOUT_MS` (default 2000)
    /// - `BAKERY_INSTANCE_ID` (default random)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            redis_url: env_string("BAKERY_REDIS_URL").unwrap_or(defaults.redis_url),
            lock_ttl: env_millis("BAKERY_LOCK_TTL_MS")?.unwrap_or(defaults.lock_ttl),
            connect_timeout: env_millis("BAKERY_CONNECT_TIMEOUT_MS")?
                .unwrap_or(defaults.connect_timeout),
            instance_id: env_string("BAKERY_INSTANCE_ID").unwrap_or(defaults.instance_id),
        })
    }
}

fn generate_instance_id() -> String {
    format!("bakery-{}", nanoid::nanoid!(12))
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_millis(name: &str) -> Result<Option<Duration>> {
    let Some(raw) = env_string(name) else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(StoreError::Config(format!("{name} must be greater than zero"))),
        Ok(ms) => Ok(Some(Duration::from_millis(ms))),
        Err(e) => Err(StoreError::Config(format!("{name}={raw:?}: {e}"))),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
