// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Entries as seen by callers: documents and collections reached through
//! a file system, carrying the logical path used to reach them and the
//! collection they were reached from.
//!
//! Parent links point upward only and are recorded at traversal time. A
//! mounted root therefore reports the mounting collection of the outer file
//! system as its parent, while the inner file system itself stores nothing
//! about where it is mounted.

use crate::dir;
use crate::error::{Error, Result};
use crate::file::{self, Reader, Writer};
use crate::fs::FileSystem;
use crate::lock::LockIntent;
use crate::node::{EntryKind, NodeType};
use crate::path;
use futures::StreamExt;
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// A document or a collection
#[derive(Clone, PartialEq, Debug)]
pub enum Entry {
    Document(Document),
    Collection(Collection),
}

/// A collection (directory) reached through a file system
#[derive(Clone)]
pub struct Collection {
    fs: FileSystem,
    handle: dir::Handle,
    path: String,
    local_path: String,
    parent: Option<Arc<Collection>>,
}

/// A document (file) reached through a file system
#[derive(Clone)]
pub struct Document {
    fs: FileSystem,
    handle: file::Handle,
    path: String,
    local_path: String,
    parent: Arc<Collection>,
}

impl Entry {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Entry::Document(d) => d.name(),
            Entry::Collection(c) => c.name(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Entry::Document(d) => d.path(),
            Entry::Collection(c) => c.path(),
        }
    }

    #[must_use]
    pub fn local_path(&self) -> &str {
        match self {
            Entry::Document(d) => d.local_path(),
            Entry::Collection(c) => c.local_path(),
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Collection> {
        match self {
            Entry::Document(d) => Some(d.parent()),
            Entry::Collection(c) => c.parent(),
        }
    }

    #[must_use]
    pub fn file_system(&self) -> &FileSystem {
        match self {
            Entry::Document(d) => d.file_system(),
            Entry::Collection(c) => c.file_system(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Document(_) => EntryKind::Document,
            Entry::Collection(_) => EntryKind::Collection,
        }
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, Entry::Collection(_))
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        match self {
            Entry::Document(d) => d.is_read_only(),
            Entry::Collection(c) => c.is_read_only(),
        }
    }

    /// Time of the entry's last change, as kept by its backend
    pub async fn modified(&self) -> Result<SystemTime> {
        match self {
            Entry::Document(d) => d.modified().await,
            Entry::Collection(c) => c.modified().await,
        }
    }

    pub async fn set_modified(&self, time: SystemTime) -> Result<()> {
        match self {
            Entry::Document(d) => d.set_modified(time).await,
            Entry::Collection(c) => c.set_modified(time).await,
        }
    }

    #[must_use]
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Entry::Document(d) => Some(d),
            Entry::Collection(_) => None,
        }
    }

    #[must_use]
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Entry::Collection(c) => Some(c),
            Entry::Document(_) => None,
        }
    }

    pub fn into_document(self) -> Result<Document> {
        match self {
            Entry::Document(d) => Ok(d),
            Entry::Collection(c) => Err(Error::not_a_document(c.path())),
        }
    }

    pub fn into_collection(self) -> Result<Collection> {
        match self {
            Entry::Collection(c) => Ok(c),
            Entry::Document(d) => Err(Error::not_a_collection(d.path())),
        }
    }

    pub async fn delete(&self) -> Result<()> {
        match self {
            Entry::Document(d) => d.delete().await,
            Entry::Collection(c) => c.delete().await,
        }
    }
}

impl From<Document> for Entry {
    fn from(d: Document) -> Self {
        Entry::Document(d)
    }
}

impl From<Collection> for Entry {
    fn from(c: Collection) -> Self {
        Entry::Collection(c)
    }
}

impl Collection {
    pub(crate) fn root(fs: FileSystem) -> Self {
        let handle = fs.root_handle();
        Self {
            fs,
            handle,
            path: String::new(),
            local_path: String::new(),
            parent: None,
        }
    }

    /// The root of `fs`, grafted under this collection as `name`
    fn mounted(&self, name: &str, fs: FileSystem) -> Collection {
        let handle = fs.root_handle();
        Collection {
            fs,
            handle,
            path: path::join(&self.path, name),
            local_path: String::new(),
            parent: Some(Arc::new(self.clone())),
        }
    }

    fn child(&self, name: &str, node: NodeType) -> Entry {
        let path = path::join(&self.path, name);
        let local_path = path::join(&self.local_path, name);
        match node {
            NodeType::Document(handle) => Entry::Document(Document {
                fs: self.fs.clone(),
                handle,
                path,
                local_path,
                parent: Arc::new(self.clone()),
            }),
            NodeType::Collection(handle) => Entry::Collection(Collection {
                fs: self.fs.clone(),
                handle,
                path,
                local_path,
                parent: Some(Arc::new(self.clone())),
            }),
        }
    }

    /// Last path segment; empty for a file system root
    #[must_use]
    pub fn name(&self) -> &str {
        path::basename(&self.path)
    }

    /// Logical path from the root this collection was reached through
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path relative to the root of the owning file system
    #[must_use]
    pub fn local_path(&self) -> &str {
        &self.local_path
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Collection> {
        self.parent.as_deref()
    }

    #[must_use]
    pub fn file_system(&self) -> &FileSystem {
        &self.fs
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// True for the root of a file system reached through a mount point
    #[must_use]
    pub fn is_mount_root(&self) -> bool {
        self.local_path.is_empty() && self.parent.is_some()
    }

    /// A mount root is read-only when either side of the mount is. This
    /// flag gates creating entries in the collection, so a mount root under
    /// a read-only host accepts no new children even when the mounted file
    /// system is writable.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        let host_read_only = self.is_mount_root()
            && self
                .parent
                .as_ref()
                .is_some_and(|p| p.file_system().is_read_only());
        self.fs.is_read_only() || host_read_only
    }

    /// Looks up a direct child by name, crossing into a mounted file system
    /// when the child is a mount point.
    pub async fn get_child(&self, name: &str) -> Result<Option<Entry>> {
        if path::validate_name(name).is_err() {
            return Ok(None);
        }

        let local = path::join(&self.local_path, name);
        if let Some(fs) = self.fs.mount_at(&local).await {
            debug!("get_child: '{local}' is a mount point");
            return Ok(Some(Entry::Collection(self.mounted(name, fs))));
        }

        match self.handle.get(name).await? {
            Some(node) if !self.fs.is_ignored(name, node.kind()) => {
                Ok(Some(self.child(name, node)))
            }
            _ => Ok(None),
        }
    }

    /// Lists the children ordered by name, with mount points substituted
    /// by the roots of their mounted file systems.
    pub async fn children(&self) -> Result<Vec<Entry>> {
        let mut found = BTreeMap::new();

        let mut stream = self.handle.entries().await?;
        while let Some(item) = stream.next().await {
            let (name, node) = item?;
            if self.fs.is_ignored(&name, node.kind()) {
                continue;
            }
            let entry = self.child(&name, node);
            _ = found.insert(name, entry);
        }

        for (name, fs) in self.fs.mounts_under(&self.local_path).await {
            let entry = Entry::Collection(self.mounted(&name, fs));
            _ = found.insert(name, entry);
        }

        Ok(found.into_values().collect())
    }

    pub async fn create_document(&self, name: &str) -> Result<Document> {
        let (path, local_path) = self.prepare_create(name, EntryKind::Document).await?;
        let handle = self
            .handle
            .create_document(name)
            .await
            .map_err(|e| relabel(e, &path))?;
        debug!("create_document: '{path}'");
        Ok(Document {
            fs: self.fs.clone(),
            handle,
            path,
            local_path,
            parent: Arc::new(self.clone()),
        })
    }

    pub async fn create_collection(&self, name: &str) -> Result<Collection> {
        let (path, local_path) = self.prepare_create(name, EntryKind::Collection).await?;
        let handle = self
            .handle
            .create_collection(name)
            .await
            .map_err(|e| relabel(e, &path))?;
        debug!("create_collection: '{path}'");
        Ok(Collection {
            fs: self.fs.clone(),
            handle,
            path,
            local_path,
            parent: Some(Arc::new(self.clone())),
        })
    }

    /// Checks shared by both create operations.
    async fn prepare_create(&self, name: &str, kind: EntryKind) -> Result<(String, String)> {
        path::validate_name(name)?;
        let path = path::join(&self.path, name);
        let local_path = path::join(&self.local_path, name);

        if self.is_read_only() {
            return Err(Error::unauthorized(&path));
        }
        if self.fs.is_ignored(name, kind) {
            return Err(Error::invalid_name(name));
        }
        if self.fs.mount_at(&local_path).await.is_some() {
            return Err(Error::already_exists(&path));
        }
        self.fs.check_lock(&path, LockIntent::Create).await?;
        Ok((path, local_path))
    }

    pub async fn modified(&self) -> Result<SystemTime> {
        self.handle.modified().await
    }

    pub async fn set_modified(&self, time: SystemTime) -> Result<()> {
        if self.is_read_only() {
            return Err(Error::unauthorized(&self.path));
        }
        self.fs.check_lock(&self.path, LockIntent::Write).await?;
        self.handle.set_modified(time).await
    }

    /// Deletes this collection and everything beneath it.
    ///
    /// Roots, mount roots and collections that contain mount points cannot
    /// be deleted.
    pub async fn delete(&self) -> Result<()> {
        let Some(parent) = &self.parent else {
            return Err(Error::unauthorized(&self.path));
        };
        if self.is_mount_root()
            || self.fs.is_read_only()
            || self.fs.has_mounts_within(&self.local_path).await
        {
            return Err(Error::unauthorized(&self.path));
        }
        self.fs.check_lock(&self.path, LockIntent::Delete).await?;

        if !parent.handle.remove(self.name()).await? {
            return Err(Error::not_found(&self.path));
        }
        debug!("delete: collection '{}'", self.path);
        Ok(())
    }
}

impl Document {
    #[must_use]
    pub fn name(&self) -> &str {
        path::basename(&self.path)
    }

    /// Logical path from the root this document was reached through
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path relative to the root of the owning file system
    #[must_use]
    pub fn local_path(&self) -> &str {
        &self.local_path
    }

    #[must_use]
    pub fn parent(&self) -> &Collection {
        &self.parent
    }

    #[must_use]
    pub fn file_system(&self) -> &FileSystem {
        &self.fs
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.fs.is_read_only()
    }

    async fn ensure_writable(&self) -> Result<()> {
        if self.is_read_only() {
            return Err(Error::unauthorized(&self.path));
        }
        self.fs.check_lock(&self.path, LockIntent::Write).await
    }

    pub async fn open_read(&self) -> Result<Reader> {
        self.handle.async_reader().await
    }

    /// Opens a writer positioned at `offset`, keeping existing content
    pub async fn open_write(&self, offset: u64) -> Result<Writer> {
        self.ensure_writable().await?;
        self.handle.async_writer(offset).await
    }

    /// Truncates the document and opens a writer at its start
    pub async fn create(&self) -> Result<Writer> {
        self.ensure_writable().await?;
        self.handle.truncate().await?;
        self.handle.async_writer(0).await
    }

    pub async fn len(&self) -> Result<u64> {
        self.handle.len().await
    }

    pub async fn read_all(&self) -> Result<Vec<u8>> {
        let mut reader = self.open_read().await?;
        let mut content = Vec::new();
        _ = reader
            .read_to_end(&mut content)
            .await
            .map_err(|e| Error::io(&self.path, e))?;
        Ok(content)
    }

    pub async fn modified(&self) -> Result<SystemTime> {
        self.handle.modified().await
    }

    pub async fn set_modified(&self, time: SystemTime) -> Result<()> {
        self.ensure_writable().await?;
        self.handle.set_modified(time).await
    }

    /// Replaces the whole content
    pub async fn write_all(&self, content: &[u8]) -> Result<()> {
        let mut writer = self.create().await?;
        writer
            .write_all(content)
            .await
            .map_err(|e| Error::io(&self.path, e))?;
        writer
            .shutdown()
            .await
            .map_err(|e| Error::io(&self.path, e))
    }

    pub async fn delete(&self) -> Result<()> {
        if self.is_read_only() {
            return Err(Error::unauthorized(&self.path));
        }
        self.fs.check_lock(&self.path, LockIntent::Delete).await?;

        if !self.parent.handle.remove(self.name()).await? {
            return Err(Error::not_found(&self.path));
        }
        debug!("delete: document '{}'", self.path);
        Ok(())
    }
}

/// Backends report collisions by bare name; report the logical path instead.
fn relabel(e: Error, path: &str) -> Error {
    match e {
        Error::AlreadyExists(_) => Error::already_exists(path),
        other => other,
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.fs.same(&other.fs) && self.local_path == other.local_path && self.path == other.path
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.fs.same(&other.fs) && self.local_path == other.local_path && self.path == other.path
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("path", &self.path)
            .field("local_path", &self.local_path)
            .field("fs", &self.fs)
            .finish()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("local_path", &self.local_path)
            .field("fs", &self.fs)
            .finish()
    }
}
