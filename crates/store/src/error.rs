// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store error types.
//!
//! Absent records and contended locks are normal outcomes (`Option`/`bool`),
//! never errors.

use bakery_core::CodecError;
use thiserror::Error;

/// Errors from bake store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stored or outgoing payload could not be encoded/decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] CodecError),

    /// The backing store could not be reached, or timed out
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected a script or replied with an unexpected shape
    #[error("script {script} failed: {message}")]
    Script { script: &'static str, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether the failure was connectivity rather than a logic or data fault.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_timeout() || e.is_connection_dropped() || e.is_connection_refusal()
        {
            StoreError::Unavailable(e.to_string())
        } else {
            StoreError::Script { script: "command", message: e.to_string() }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
