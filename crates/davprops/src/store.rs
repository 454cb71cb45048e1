// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::data::{EntryInfo, PropertyValue};
use crate::error::{Error, Result};
use crate::etag::EntityTag;
use crate::name::PropertyName;
use async_trait::async_trait;
use davfs::{Document, Entry};
use log::debug;
use tokio_util::sync::CancellationToken;

/// Storage for the dead properties and entity tags of file system entries.
///
/// Every operation takes a cancellation token, checked before each storage
/// access. A cancelled operation fails with `Error::Cancelled` and leaves
/// whatever it already wrote in place.
///
/// Implementations apply each save, removal and move atomically with
/// respect to other operations on the same store. The default `get_etag`
/// and `update_etag` are a load followed by a save; the bundled stores
/// override them to run as a single update.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Relative cost reported to store-selection policies
    fn cost(&self) -> u32;

    /// All stored properties of `entry`
    async fn load_entry(&self, entry: &Entry, cancel: &CancellationToken) -> Result<EntryInfo>;

    async fn load_raw(
        &self,
        entry: &Entry,
        name: &PropertyName,
        cancel: &CancellationToken,
    ) -> Result<Option<PropertyValue>>;

    async fn save_raw(
        &self,
        entry: &Entry,
        name: &PropertyName,
        value: PropertyValue,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Removes a property. Removing an absent property writes nothing.
    async fn remove_raw(
        &self,
        entry: &Entry,
        name: &PropertyName,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Moves the properties stored for `old_path` to `new_entry`. Does
    /// nothing if `old_path` had none.
    async fn handle_moved_entry(
        &self,
        old_path: &str,
        new_entry: &Entry,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Records a content change by advancing the document's entity tag.
    /// Collections carry no tag.
    async fn handle_modified_entry(&self, entry: &Entry, cancel: &CancellationToken) -> Result<()> {
        match entry {
            Entry::Document(document) => {
                _ = self.update_etag(document, cancel).await?;
                Ok(())
            }
            Entry::Collection(_) => Ok(()),
        }
    }

    /// The document's entity tag, created and stored on first request
    async fn get_etag(&self, document: &Document, cancel: &CancellationToken) -> Result<EntityTag> {
        let entry = Entry::from(document.clone());
        let name = EntityTag::property_name();
        if let Some(stored) = self.load_raw(&entry, &name, cancel).await? {
            return EntityTag::from_value(&stored);
        }

        let etag = EntityTag::new();
        debug!("get_etag: new tag {etag} for '{}'", document.path());
        self.save_raw(&entry, &name, etag.to_value(), cancel).await?;
        Ok(etag)
    }

    /// Replaces the document's entity tag with the next one in sequence
    async fn update_etag(
        &self,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Result<EntityTag> {
        let entry = Entry::from(document.clone());
        let etag = next_etag(&self.load_entry(&entry, cancel).await?)?;
        debug!("update_etag: '{}' now {etag}", document.path());
        self.save_raw(&entry, &EntityTag::property_name(), etag.to_value(), cancel)
            .await?;
        Ok(etag)
    }
}

/// The tag following the one stored in `info`, or a fresh tag
pub(crate) fn next_etag(info: &EntryInfo) -> Result<EntityTag> {
    match info.attributes.get(&EntityTag::property_name()) {
        Some(stored) => Ok(EntityTag::from_value(stored)?.update()),
        None => Ok(EntityTag::new()),
    }
}

pub(crate) fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}
