// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key-space schema shared by every service instance.
//!
//! The layout is fixed for interoperability with existing deployments:
//!
//! | key                   | type       | contents                                   |
//! |-----------------------|------------|--------------------------------------------|
//! | `lock:<bakeKey>`      | string+TTL | holder token                               |
//! | `<bakeId>`            | hash       | id record (back-pointer field `bakeKey`)   |
//! | `<bakeKey>`           | hash       | key record (forward pointer field `id`)    |
//! | `allBakes`            | sorted set | bake keys scored by creation timestamp     |
//! | `allBakes:incomplete` | set        | ids whose status is PENDING or RUNNING     |

use bakery_core::BakeKey;

/// Sorted set of every live bake key, scored by creation time.
pub const ALL_BAKES: &str = "allBakes";

/// Set of bake ids whose last written status is non-terminal.
pub const INCOMPLETE_BAKES: &str = "allBakes:incomplete";

const LOCK_PREFIX: &str = "lock:";

/// Key of the creation lock for a bake key.
pub fn lock_key(bake_key: &BakeKey) -> String {
    format!("{LOCK_PREFIX}{bake_key}")
}

/// Hash field names of the id and key records.
pub mod field {
    /// Bake id. Present on both records; the forward pointer on the key record.
    pub const ID: &str = "id";
    /// Back-pointer from the id record to its bake key.
    pub const BAKE_KEY: &str = "bakeKey";
    pub const REGION: &str = "region";
    pub const BAKE_REQUEST: &str = "bakeRequest";
    pub const BAKE_STATUS: &str = "bakeStatus";
    pub const BAKE_DETAILS: &str = "bakeDetails";
    pub const BAKE_LOGS: &str = "bakeLogs";
    pub const BAKE_ERROR: &str = "bakeError";
    pub const CREATION_TIMESTAMP: &str = "creationTimestamp";
}
