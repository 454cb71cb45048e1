// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a store does when a sidecar file cannot be written
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Durability {
    /// Log the failure and keep serving the value from the cache
    #[default]
    BestEffort,
    /// Return the failure to the caller
    Strict,
}

/// Configuration of a text-file property store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyStoreOptions {
    /// Host directory the entry paths are resolved against
    pub root_folder: PathBuf,

    /// Relative cost reported to store-selection policies
    #[serde(default)]
    pub estimated_cost: u32,

    #[serde(default)]
    pub durability: Durability,
}

impl PropertyStoreOptions {
    pub fn new<P: Into<PathBuf>>(root_folder: P) -> Self {
        Self {
            root_folder: root_folder.into(),
            estimated_cost: 0,
            durability: Durability::default(),
        }
    }

    #[must_use]
    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_yaml() {
        let options = PropertyStoreOptions::from_yaml("root_folder: /srv/dav\n").unwrap();
        assert_eq!(options, PropertyStoreOptions::new("/srv/dav"));
        assert_eq!(options.durability, Durability::BestEffort);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = "root_folder: /data\nestimated_cost: 10\ndurability: strict\n";
        let options = PropertyStoreOptions::from_yaml(yaml).unwrap();
        assert_eq!(options.estimated_cost, 10);
        assert_eq!(options.durability, Durability::Strict);
    }

    #[test]
    fn test_missing_root_folder() {
        assert!(PropertyStoreOptions::from_yaml("estimated_cost: 1\n").is_err());
    }
}
