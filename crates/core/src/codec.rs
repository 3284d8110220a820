// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload encoding for values stored in bake records.
//!
//! Every payload kind is stored as a JSON string field. Decoding ignores
//! unknown fields and defaults missing optional ones, so records written by a
//! newer service version stay readable by an older one.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors from encoding or decoding a stored payload
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode {kind}: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    /// Name of the payload kind that failed.
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::Encode { kind, .. } | CodecError::Decode { kind, .. } => kind,
        }
    }
}

/// A value stored as an opaque string payload.
pub trait Payload: Serialize + DeserializeOwned {
    /// Payload kind, used in error messages and log fields.
    const KIND: &'static str;

    fn encode(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(|source| CodecError::Encode { kind: Self::KIND, source })
    }

    fn decode(raw: &str) -> Result<Self, CodecError> {
        serde_json::from_str(raw).map_err(|source| CodecError::Decode { kind: Self::KIND, source })
    }
}

/// Text for a typed string field set through a free-form parameter.
/// `null` clears the field; non-string values keep their JSON text.
pub(crate) fn text_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
