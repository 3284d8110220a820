// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{BakeLogs, BakeRequest};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for bake lifecycle types.
pub mod strategies {
    use crate::status::{BakeResult, BakeState, BakeStatus};
    use proptest::prelude::*;

    pub fn arb_bake_state() -> impl Strategy<Value = BakeState> {
        prop_oneof![
            Just(BakeState::Pending),
            Just(BakeState::Running),
            Just(BakeState::Completed),
            Just(BakeState::Cancelled),
            "[A-Z]{3,8}_[A-Z]{3,8}".prop_map(BakeState::Other),
        ]
    }

    pub fn arb_bake_result() -> impl Strategy<Value = BakeResult> {
        prop_oneof![Just(BakeResult::Success), Just(BakeResult::Failure)]
    }

    /// A status for `id` whose result is present exactly when the state is terminal.
    pub fn arb_bake_status(id: &'static str) -> impl Strategy<Value = BakeStatus> {
        (arb_bake_state(), arb_bake_result()).prop_map(move |(state, result)| {
            let terminal = state.is_terminal();
            let status = BakeStatus::new(id, state);
            if terminal {
                status.result(result)
            } else {
                status
            }
        })
    }
}

// ── Payload factories ───────────────────────────────────────────────────

/// A representative request for an application image on Ubuntu.
pub fn sample_request(package: &str) -> BakeRequest {
    BakeRequest::new()
        .user("someone@example.com")
        .package_name(package)
        .base_os("ubuntu")
        .base_label("release")
        .vm_type("hvm")
        .cloud_provider_type("aws")
}

/// Logs as produced by a single packer run.
pub fn sample_logs(content: &str) -> BakeLogs {
    BakeLogs::new().with("packer", content)
}
