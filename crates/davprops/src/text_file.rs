// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Property store keeping one JSON sidecar file per directory.
//!
//! A collection's properties live under the key `"."` in the sidecar inside
//! the collection's own directory. A document's properties live under its
//! lower-cased name in the sidecar of its parent directory. Sidecar paths
//! are the entry's logical path resolved against `root_folder`; directories
//! are never created by the store.

use crate::cache::StoreCache;
use crate::data::{COLLECTION_KEY, EntryInfo, PropertyValue, StoreData};
use crate::error::{Error, Result};
use crate::name::PropertyName;
use crate::options::{Durability, PropertyStoreOptions};
use crate::etag::EntityTag;
use crate::store::{PropertyStore, check_cancelled, next_etag};
use async_trait::async_trait;
use davfs::{Document, Entry, EntryFilter, EntryKind};
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// File name of the per-directory sidecar
pub const STORE_ENTRY_NAME: &str = ".properties";

pub struct TextFilePropertyStore {
    options: PropertyStoreOptions,
    cache: Arc<dyn StoreCache>,
    /// Cache keys whose last best-effort write failed
    unwritten: Mutex<HashSet<String>>,
    /// Held across every read-modify-write of a sidecar
    write_lock: Mutex<()>,
}

impl TextFilePropertyStore {
    pub fn new(options: PropertyStoreOptions, cache: Arc<dyn StoreCache>) -> Self {
        Self {
            options,
            cache,
            unwritten: Mutex::new(HashSet::new()),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn root_folder(&self) -> &Path {
        &self.options.root_folder
    }

    #[must_use]
    pub fn durability(&self) -> Durability {
        self.options.durability
    }

    /// Sidecar file holding the properties of the entry at `path`
    fn file_name_for(&self, path: &str, is_collection: bool) -> PathBuf {
        let directory = if is_collection {
            path
        } else {
            davfs::path::dirname(path)
        };
        let mut file_name = self.options.root_folder.clone();
        for segment in davfs::path::segments(directory) {
            file_name.push(segment);
        }
        file_name.push(STORE_ENTRY_NAME);
        file_name
    }

    fn location(entry: &Entry) -> (bool, &str) {
        (entry.is_collection(), entry.path())
    }

    fn cache_key(file_name: &Path) -> String {
        file_name.to_string_lossy().to_lowercase()
    }

    /// Reads a sidecar file.
    ///
    /// With `use_cache` the cached copy is returned when present. Without
    /// it the file is always re-read and the result republished. A missing
    /// sidecar reads as empty and is dropped from the cache, unless its last
    /// write failed under best-effort durability; then the cached copy is
    /// all that remains of it.
    async fn load(
        &self,
        file_name: &Path,
        use_cache: bool,
        cancel: &CancellationToken,
    ) -> Result<StoreData> {
        check_cancelled(cancel)?;
        let key = Self::cache_key(file_name);

        if self.unwritten.lock().await.contains(&key) {
            return Ok(self.cache.get(&key).await.unwrap_or_default());
        }

        let exists = tokio::fs::try_exists(file_name)
            .await
            .map_err(|e| Error::io(file_name, e))?;
        if !exists {
            self.cache.remove(&key).await;
            return Ok(StoreData::default());
        }

        if use_cache {
            if let Some(data) = self.cache.get(&key).await {
                return Ok(data);
            }
        }

        let bytes = match tokio::fs::read(file_name).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.cache.remove(&key).await;
                return Ok(StoreData::default());
            }
            Err(e) => return Err(Error::io(file_name, e)),
        };

        let data: StoreData =
            serde_json::from_slice(&bytes).map_err(|e| Error::corrupt(file_name, e))?;
        debug!("loaded {} ({} entries)", file_name.display(), data.entries.len());
        self.cache.insert(key, data.clone()).await;
        Ok(data)
    }

    /// Replaces a sidecar file and republishes it into the cache
    async fn save(
        &self,
        file_name: &Path,
        data: StoreData,
        cancel: &CancellationToken,
    ) -> Result<()> {
        check_cancelled(cancel)?;
        let json = serde_json::to_vec(&data).map_err(|e| Error::Serialization(e.to_string()))?;
        let key = Self::cache_key(file_name);

        match tokio::fs::write(file_name, json).await {
            Ok(()) => {
                _ = self.unwritten.lock().await.remove(&key);
            }
            Err(e) => match self.options.durability {
                Durability::Strict => return Err(Error::io(file_name, e)),
                Durability::BestEffort => {
                    warn!("cannot write {}: {e}; keeping cached copy", file_name.display());
                    _ = self.unwritten.lock().await.insert(key.clone());
                }
            },
        }

        self.cache.insert(key, data).await;
        Ok(())
    }

    /// Applies `update` to the stored record of `entry` and returns its
    /// value. The record is saved only when `update` also returns true.
    async fn update_info<T, F>(&self, entry: &Entry, cancel: &CancellationToken, update: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut EntryInfo) -> Result<(T, bool)> + Send,
    {
        let (is_collection, path) = Self::location(entry);
        let file_name = self.file_name_for(path, is_collection);
        let key = entry_key(path, is_collection);

        let _guard = self.write_lock.lock().await;
        let mut data = self.load(&file_name, false, cancel).await?;
        let info = data.entries.entry(key).or_default();
        let (value, changed) = update(info)?;
        if changed {
            self.save(&file_name, data, cancel).await?;
        }
        Ok(value)
    }
}

/// Key of an entry inside its sidecar file
fn entry_key(path: &str, is_collection: bool) -> String {
    if is_collection {
        COLLECTION_KEY.to_string()
    } else {
        davfs::path::basename(path).to_lowercase()
    }
}

#[async_trait]
impl PropertyStore for TextFilePropertyStore {
    fn cost(&self) -> u32 {
        self.options.estimated_cost
    }

    async fn load_entry(&self, entry: &Entry, cancel: &CancellationToken) -> Result<EntryInfo> {
        let (is_collection, path) = Self::location(entry);
        let file_name = self.file_name_for(path, is_collection);
        let mut data = self.load(&file_name, true, cancel).await?;
        Ok(data
            .entries
            .remove(&entry_key(path, is_collection))
            .unwrap_or_default())
    }

    async fn load_raw(
        &self,
        entry: &Entry,
        name: &PropertyName,
        cancel: &CancellationToken,
    ) -> Result<Option<PropertyValue>> {
        let (is_collection, path) = Self::location(entry);
        let file_name = self.file_name_for(path, is_collection);
        let data = self.load(&file_name, true, cancel).await?;
        Ok(data.get(&entry_key(path, is_collection), name).cloned())
    }

    async fn save_raw(
        &self,
        entry: &Entry,
        name: &PropertyName,
        value: PropertyValue,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let name = name.clone();
        self.update_info(entry, cancel, move |info| {
            _ = info.attributes.insert(name, value);
            Ok(((), true))
        })
        .await
    }

    async fn remove_raw(
        &self,
        entry: &Entry,
        name: &PropertyName,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.update_info(entry, cancel, |info| {
            Ok(((), info.attributes.remove(name).is_some()))
        })
        .await
    }

    async fn handle_moved_entry(
        &self,
        old_path: &str,
        new_entry: &Entry,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let is_collection = new_entry.is_collection();
        let old_file = self.file_name_for(old_path, is_collection);
        let old_key = entry_key(old_path, is_collection);

        let _guard = self.write_lock.lock().await;
        let mut old_data = self.load(&old_file, false, cancel).await?;
        let Some(info) = old_data.entries.remove(&old_key) else {
            return Ok(());
        };

        let new_path = new_entry.path();
        let new_file = self.file_name_for(new_path, is_collection);
        let new_key = entry_key(new_path, is_collection);
        debug!("moving properties of '{old_path}' to '{new_path}'");

        if new_file == old_file {
            _ = old_data.entries.insert(new_key, info);
            return self.save(&old_file, old_data, cancel).await;
        }

        self.save(&old_file, old_data, cancel).await?;
        let mut new_data = self.load(&new_file, false, cancel).await?;
        _ = new_data.entries.insert(new_key, info);
        self.save(&new_file, new_data, cancel).await
    }

    async fn get_etag(&self, document: &Document, cancel: &CancellationToken) -> Result<EntityTag> {
        let entry = Entry::from(document.clone());
        let name = EntityTag::property_name();
        if let Some(stored) = self.load_raw(&entry, &name, cancel).await? {
            return EntityTag::from_value(&stored);
        }

        self.update_info(&entry, cancel, |info| match info.attributes.get(&name) {
            Some(stored) => Ok((EntityTag::from_value(stored)?, false)),
            None => {
                let etag = EntityTag::new();
                debug!("get_etag: new tag {etag} for '{}'", document.path());
                _ = info.attributes.insert(name.clone(), etag.to_value());
                Ok((etag, true))
            }
        })
        .await
    }

    async fn update_etag(
        &self,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Result<EntityTag> {
        let entry = Entry::from(document.clone());
        let etag = self
            .update_info(&entry, cancel, |info| {
                let etag = next_etag(info)?;
                _ = info
                    .attributes
                    .insert(EntityTag::property_name(), etag.to_value());
                Ok((etag, true))
            })
            .await?;
        debug!("update_etag: '{}' now {etag}", document.path());
        Ok(etag)
    }
}

impl EntryFilter for TextFilePropertyStore {
    fn is_ignored(&self, name: &str, kind: EntryKind) -> bool {
        kind == EntryKind::Document && name == STORE_ENTRY_NAME
    }
}
