// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bake identifiers.
//!
//! A [`BakeKey`] names the *intent* (region plus build parameters) and a
//! [`BakeId`] names one concrete attempt. Both are stored verbatim as keys
//! in the shared key-space, so neither type adds a prefix to caller-supplied
//! values.

use crate::codec::{CodecError, Payload};
use crate::request::BakeRequest;
use sha2::{Digest, Sha256};

/// Define a newtype identifier wrapper around `SmolStr`.
///
/// Generates `new()`, `as_str()`, `short()`, `Display`, `From<String>`,
/// `From<&str>`, `PartialEq<str>`, `PartialEq<&str>`, `Borrow<str>`, and
/// `Deref` implementations.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct BakeId;
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub smol_str::SmolStr);

        impl $name {
            pub fn new(id: impl Into<smol_str::SmolStr>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns a string slice truncated to at most `n` characters.
            pub fn short(&self, n: usize) -> &str {
                match self.0.char_indices().nth(n) {
                    Some((end, _)) => &self.0[..end],
                    None => &self.0,
                }
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&String> for $name {
            fn from(s: &String) -> Self {
                Self::new(s.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }
    };
}

crate::define_id! {
    /// Identifier of one bake attempt, assigned at creation time.
    pub struct BakeId;
}

impl BakeId {
    pub const PREFIX: &'static str = "bake-";

    /// Generate a fresh random id (`bake-` followed by a 19 character nanoid).
    pub fn generate() -> Self {
        Self::new(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19)))
    }
}

crate::define_id! {
    /// Fingerprint of a build intent: region plus request parameters.
    ///
    /// At most one non-terminal bake exists per key.
    pub struct BakeKey;
}

impl BakeKey {
    /// Fingerprint a region and request as `bake:<region>:<sha256 of request json>`.
    ///
    /// The request encoding is deterministic (fixed field order, sorted extras),
    /// so equal requests always derive the same key.
    pub fn derive(region: &str, request: &BakeRequest) -> Result<Self, CodecError> {
        let encoded = request.encode()?;
        let digest = Sha256::digest(encoded.as_bytes());
        Ok(Self::new(format!("bake:{region}:{digest:x}")))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
