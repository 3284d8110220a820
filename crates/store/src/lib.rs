// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bakery-store: coordination and persistence layer for bakes
//!
//! One bake per bake key at a time, enforced by a TTL lock and a race check
//! inside the creation script; dual-indexed records; an all-bakes index and
//! an incomplete-bakes index kept consistent by running every multi-key
//! mutation as a single store-side script.

mod bake_store;
mod config;
mod error;
mod index;
pub mod keys;
mod lock;
mod memory;
mod record;
mod remote;
mod script;

pub use bake_store::BakeStore;
pub use config::{StoreConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REDIS_URL};
pub use error::{Result, StoreError};
pub use index::{GlobalIndexer, IndexedBake, Membership};
pub use lock::{LockManager, DEFAULT_LOCK_TTL};
pub use memory::MemoryExecutor;
pub use record::RecordStore;
pub use remote::RedisExecutor;
pub use script::{ReplyKind, Script, ScriptExecutor, ScriptReply};
