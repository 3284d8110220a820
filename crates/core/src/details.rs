// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build output payloads: details and logs.

use crate::codec::{text_value, Payload};
use crate::id::BakeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Build output, set once the produced artifacts are known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakeDetails {
    pub id: BakeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ami: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl BakeDetails {
    pub fn new(id: impl Into<BakeId>) -> Self {
        Self { id: id.into(), ami: None, image_name: None, extra: BTreeMap::new() }
    }

    /// Attach a provider-specific output field. `id`, `ami` and
    /// `image_name` set the typed fields instead.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        match name.as_str() {
            "id" => {
                if let Some(id) = text_value(value.into()) {
                    self.id = BakeId::new(id);
                }
            }
            "ami" => self.ami = text_value(value.into()),
            "image_name" => self.image_name = text_value(value.into()),
            _ => {
                self.extra.insert(name, value.into());
            }
        }
        self
    }

    crate::setters! {
        option {
            ami: String,
            image_name: String,
        }
    }
}

impl Payload for BakeDetails {
    const KIND: &'static str = "bake details";
}

/// Log content keyed by log source name. Replaced wholesale on every status write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BakeLogs(pub BTreeMap<String, String>);

impl BakeLogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl Into<String>, content: impl Into<String>) -> Self {
        self.0.insert(source.into(), content.into());
        self
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Payload for BakeLogs {
    const KIND: &'static str = "bake logs";
}
