// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bake lifecycle status.

use crate::codec::Payload;
use crate::id::BakeId;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a bake.
///
/// Serializes as the upper-case state name. Any name other than the four
/// built-in states is preserved as [`BakeState::Other`] and counts as terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BakeState {
    Pending,
    Running,
    Completed,
    Cancelled,
    /// Caller-defined terminal state
    Other(String),
}

impl BakeState {
    /// Anything other than Pending/Running is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BakeState::Pending | BakeState::Running)
    }

    pub fn as_str(&self) -> &str {
        match self {
            BakeState::Pending => "PENDING",
            BakeState::Running => "RUNNING",
            BakeState::Completed => "COMPLETED",
            BakeState::Cancelled => "CANCELLED",
            BakeState::Other(name) => name,
        }
    }
}

impl From<String> for BakeState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PENDING" => BakeState::Pending,
            "RUNNING" => BakeState::Running,
            "COMPLETED" => BakeState::Completed,
            "CANCELLED" => BakeState::Cancelled,
            _ => BakeState::Other(s),
        }
    }
}

impl From<BakeState> for String {
    fn from(state: BakeState) -> Self {
        match state {
            BakeState::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for BakeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a terminal bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BakeResult {
    Success,
    Failure,
}

crate::simple_display! {
    BakeResult {
        Success => "SUCCESS",
        Failure => "FAILURE",
    }
}

/// The authoritative lifecycle marker of a bake, mirrored on both records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakeStatus {
    pub id: BakeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub state: BakeState,
    /// Set only once the state is terminal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<BakeResult>,
}

impl BakeStatus {
    pub fn new(id: impl Into<BakeId>, state: BakeState) -> Self {
        Self { id: id.into(), resource_id: None, state, result: None }
    }

    /// Initial status written on creation.
    pub fn pending(id: impl Into<BakeId>) -> Self {
        Self::new(id, BakeState::Pending)
    }

    pub fn running(id: impl Into<BakeId>) -> Self {
        Self::new(id, BakeState::Running)
    }

    pub fn completed(id: impl Into<BakeId>, result: BakeResult) -> Self {
        Self::new(id, BakeState::Completed).result(result)
    }

    /// Status written by cancellation.
    pub fn cancelled(id: impl Into<BakeId>) -> Self {
        Self::new(id, BakeState::Cancelled).result(BakeResult::Failure)
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    crate::setters! {
        option {
            resource_id: String,
            result: BakeResult,
        }
    }
}

impl Payload for BakeStatus {
    const KIND: &'static str = "bake status";
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
