// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bakery-core: data model for the bake coordination store

pub mod macros;

pub mod clock;
pub mod codec;
pub mod details;
pub mod id;
pub mod request;
pub mod status;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use codec::{CodecError, Payload};
pub use details::{BakeDetails, BakeLogs};
pub use id::{BakeId, BakeKey};
pub use request::BakeRequest;
pub use status::{BakeResult, BakeState, BakeStatus};
