// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::data::PropertyValue;
use crate::error::Result;
use crate::name::PropertyName;
use crate::store::PropertyStore;
use davfs::{Entry, LockIntent};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A stored property whose value the server passes through untouched.
///
/// Reads and writes go back to the store it was loaded from. Writes are
/// checked against the lock manager of the entry's file system.
pub struct DeadProperty {
    store: Arc<dyn PropertyStore>,
    entry: Entry,
    name: PropertyName,
    value: Option<PropertyValue>,
}

impl DeadProperty {
    pub fn new(
        store: Arc<dyn PropertyStore>,
        entry: Entry,
        name: PropertyName,
        value: Option<PropertyValue>,
    ) -> Self {
        Self {
            store,
            entry,
            name,
            value,
        }
    }

    #[must_use]
    pub fn name(&self) -> &PropertyName {
        &self.name
    }

    #[must_use]
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// The value as last loaded or written, without touching the store
    #[must_use]
    pub fn cached_value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    /// Reloads the value from the store
    pub async fn get(&mut self, cancel: &CancellationToken) -> Result<Option<PropertyValue>> {
        self.value = self.store.load_raw(&self.entry, &self.name, cancel).await?;
        Ok(self.value.clone())
    }

    pub async fn set(&mut self, value: PropertyValue, cancel: &CancellationToken) -> Result<()> {
        self.check_lock().await?;
        self.store
            .save_raw(&self.entry, &self.name, value.clone(), cancel)
            .await?;
        self.value = Some(value);
        Ok(())
    }

    pub async fn remove(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.check_lock().await?;
        self.store.remove_raw(&self.entry, &self.name, cancel).await?;
        self.value = None;
        Ok(())
    }

    async fn check_lock(&self) -> Result<()> {
        Ok(self
            .entry
            .file_system()
            .check_lock(self.entry.path(), LockIntent::Write)
            .await?)
    }
}

impl std::fmt::Debug for DeadProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadProperty")
            .field("entry", &self.entry.path())
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

/// Loads every stored property of `entry` as a dead property bound to `store`
pub async fn load_and_create(
    store: &Arc<dyn PropertyStore>,
    entry: &Entry,
    cancel: &CancellationToken,
) -> Result<Vec<DeadProperty>> {
    let info = store.load_entry(entry, cancel).await?;
    Ok(info
        .attributes
        .into_iter()
        .map(|(name, value)| DeadProperty::new(store.clone(), entry.clone(), name, Some(value)))
        .collect())
}
