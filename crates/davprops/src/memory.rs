// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::data::{EntryInfo, PropertyValue};
use crate::error::Result;
use crate::name::PropertyName;
use crate::etag::EntityTag;
use crate::store::{PropertyStore, check_cancelled, next_etag};
use async_trait::async_trait;
use davfs::{Document, Entry};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Property store that keeps everything in memory, keyed by the entry's
/// lower-cased logical path
#[derive(Default)]
pub struct InMemoryPropertyStore {
    entries: RwLock<HashMap<String, EntryInfo>>,
    cost: u32,
}

impl InMemoryPropertyStore {
    #[must_use]
    pub fn new(cost: u32) -> Self {
        Self {
            entries: RwLock::default(),
            cost,
        }
    }
}

fn entry_key(path: &str) -> String {
    path.to_lowercase()
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    fn cost(&self) -> u32 {
        self.cost
    }

    async fn load_entry(&self, entry: &Entry, cancel: &CancellationToken) -> Result<EntryInfo> {
        check_cancelled(cancel)?;
        let entries = self.entries.read().await;
        Ok(entries
            .get(&entry_key(entry.path()))
            .cloned()
            .unwrap_or_default())
    }

    async fn load_raw(
        &self,
        entry: &Entry,
        name: &PropertyName,
        cancel: &CancellationToken,
    ) -> Result<Option<PropertyValue>> {
        check_cancelled(cancel)?;
        let entries = self.entries.read().await;
        Ok(entries
            .get(&entry_key(entry.path()))
            .and_then(|info| info.attributes.get(name))
            .cloned())
    }

    async fn save_raw(
        &self,
        entry: &Entry,
        name: &PropertyName,
        value: PropertyValue,
        cancel: &CancellationToken,
    ) -> Result<()> {
        check_cancelled(cancel)?;
        let mut entries = self.entries.write().await;
        _ = entries
            .entry(entry_key(entry.path()))
            .or_default()
            .attributes
            .insert(name.clone(), value);
        Ok(())
    }

    async fn remove_raw(
        &self,
        entry: &Entry,
        name: &PropertyName,
        cancel: &CancellationToken,
    ) -> Result<()> {
        check_cancelled(cancel)?;
        let mut entries = self.entries.write().await;
        if let Some(info) = entries.get_mut(&entry_key(entry.path())) {
            _ = info.attributes.remove(name);
        }
        Ok(())
    }

    async fn handle_moved_entry(
        &self,
        old_path: &str,
        new_entry: &Entry,
        cancel: &CancellationToken,
    ) -> Result<()> {
        check_cancelled(cancel)?;
        let old_key = entry_key(old_path);
        let new_key = entry_key(new_entry.path());
        let prefix = format!("{old_key}/");

        let mut entries = self.entries.write().await;
        let moved: Vec<String> = entries
            .keys()
            .filter(|key| **key == old_key || key.starts_with(&prefix))
            .cloned()
            .collect();
        for key in moved {
            if let Some(info) = entries.remove(&key) {
                let target = format!("{new_key}{}", &key[old_key.len()..]);
                _ = entries.insert(target, info);
            }
        }
        Ok(())
    }

    async fn get_etag(&self, document: &Document, cancel: &CancellationToken) -> Result<EntityTag> {
        check_cancelled(cancel)?;
        let mut entries = self.entries.write().await;
        let info = entries.entry(entry_key(document.path())).or_default();
        let name = EntityTag::property_name();
        if let Some(stored) = info.attributes.get(&name) {
            return EntityTag::from_value(stored);
        }
        let etag = EntityTag::new();
        _ = info.attributes.insert(name, etag.to_value());
        Ok(etag)
    }

    async fn update_etag(
        &self,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Result<EntityTag> {
        check_cancelled(cancel)?;
        let mut entries = self.entries.write().await;
        let info = entries.entry(entry_key(document.path())).or_default();
        let etag = next_etag(info)?;
        _ = info
            .attributes
            .insert(EntityTag::property_name(), etag.to_value());
        Ok(etag)
    }
}
