// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bake request payload.

use crate::codec::{text_value, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Description of what to build. Immutable once stored.
///
/// The well-known fields are the ones the store and its callers inspect;
/// provider-specific parameters travel in `extra` and round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BakeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider_type: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl BakeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a provider-specific parameter. Names of the well-known fields
    /// set that field, so the encoded request never repeats a key.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let slot = match name.as_str() {
            "user" => &mut self.user,
            "package_name" => &mut self.package_name,
            "base_os" => &mut self.base_os,
            "base_label" => &mut self.base_label,
            "vm_type" => &mut self.vm_type,
            "cloud_provider_type" => &mut self.cloud_provider_type,
            _ => {
                self.extra.insert(name, value.into());
                return self;
            }
        };
        *slot = text_value(value.into());
        self
    }

    crate::setters! {
        option {
            user: String,
            package_name: String,
            base_os: String,
            base_label: String,
            vm_type: String,
            cloud_provider_type: String,
        }
    }
}

impl Payload for BakeRequest {
    const KIND: &'static str = "bake request";
}
