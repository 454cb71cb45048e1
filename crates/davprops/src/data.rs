// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Serialized shape of a sidecar file:
//! `{"Entries": {"<key>": {"Attributes": {"<name>": <value>}}}}`

use crate::name::PropertyName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque stored property value
pub type PropertyValue = serde_json::Value;

/// Entry key of a collection inside its own sidecar file
pub const COLLECTION_KEY: &str = ".";

/// Properties of every entry described by one sidecar file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(rename = "Entries", default)]
    pub entries: BTreeMap<String, EntryInfo>,
}

/// Properties of a single entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryInfo {
    #[serde(rename = "Attributes", default)]
    pub attributes: BTreeMap<PropertyName, PropertyValue>,
}

impl StoreData {
    #[must_use]
    pub fn get(&self, key: &str, name: &PropertyName) -> Option<&PropertyValue> {
        self.entries.get(key)?.attributes.get(name)
    }
}
