// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::dir::{Directory, EntryStream, Handle};
use crate::error::{Error, Result};
use crate::node::NodeType;
use async_trait::async_trait;
use futures::stream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// A directory backed by a host file system directory.
///
/// Read operations (`get`, `entries`) map to `tokio::fs` metadata and
/// directory reads. Creation and removal act on the host immediately.
pub struct HostDirectory {
    host_path: PathBuf,
}

impl HostDirectory {
    #[must_use]
    pub fn new(host_path: PathBuf) -> Self {
        Self { host_path }
    }

    #[must_use]
    pub fn new_handle(host_path: PathBuf) -> Handle {
        Handle::new(Arc::new(tokio::sync::Mutex::new(Box::new(Self::new(
            host_path,
        )))))
    }

    /// Resolves a child name to a host path, refusing anything that could
    /// step outside this directory.
    fn child_path(&self, name: &str) -> Option<PathBuf> {
        if crate::path::validate_name(name).is_err() || name.contains(std::path::MAIN_SEPARATOR) {
            return None;
        }
        Some(self.host_path.join(name))
    }

    fn node_for(path: &Path, is_dir: bool) -> NodeType {
        if is_dir {
            NodeType::Collection(HostDirectory::new_handle(path.to_path_buf()))
        } else {
            NodeType::Document(super::HostFile::new_handle(path.to_path_buf()))
        }
    }

    fn require_child(&self, name: &str) -> Result<PathBuf> {
        self.child_path(name).ok_or_else(|| Error::invalid_name(name))
    }
}

#[async_trait]
impl Directory for HostDirectory {
    async fn get(&self, name: &str) -> Result<Option<NodeType>> {
        let Some(child) = self.child_path(name) else {
            return Ok(None);
        };
        match tokio::fs::metadata(&child).await {
            Ok(metadata) => Ok(Some(Self::node_for(&child, metadata.is_dir()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(child.display().to_string(), e)),
        }
    }

    async fn create_document(&mut self, name: &str) -> Result<crate::file::Handle> {
        let child = self.require_child(name)?;
        _ = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&child)
            .await
            .map_err(|e| Error::io(child.display().to_string(), e))?;
        Ok(super::HostFile::new_handle(child))
    }

    async fn create_collection(&mut self, name: &str) -> Result<Handle> {
        let child = self.require_child(name)?;
        tokio::fs::create_dir(&child)
            .await
            .map_err(|e| Error::io(child.display().to_string(), e))?;
        Ok(HostDirectory::new_handle(child))
    }

    async fn remove(&mut self, name: &str) -> Result<bool> {
        let child = self.require_child(name)?;
        let metadata = match tokio::fs::metadata(&child).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(Error::io(child.display().to_string(), e)),
        };

        let removed = if metadata.is_dir() {
            tokio::fs::remove_dir_all(&child).await
        } else {
            tokio::fs::remove_file(&child).await
        };
        removed.map_err(|e| Error::io(child.display().to_string(), e))?;
        Ok(true)
    }

    async fn entries(&self) -> Result<EntryStream> {
        let display = self.host_path.display().to_string();
        let mut read_dir = tokio::fs::read_dir(&self.host_path)
            .await
            .map_err(|e| Error::io(&display, e))?;

        let mut items = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| Error::io(&display, e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let child = entry.path();
            // Follows symlinks, unlike DirEntry::file_type
            let metadata = tokio::fs::metadata(&child)
                .await
                .map_err(|e| Error::io(child.display().to_string(), e))?;
            items.push((name, Self::node_for(&child, metadata.is_dir())));
        }

        // Sort by name for deterministic ordering
        items.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Box::pin(stream::iter(items.into_iter().map(Ok))))
    }

    async fn modified(&self) -> Result<SystemTime> {
        super::host_modified(&self.host_path).await
    }

    async fn set_modified(&mut self, time: SystemTime) -> Result<()> {
        super::set_host_modified(&self.host_path, time).await
    }
}
