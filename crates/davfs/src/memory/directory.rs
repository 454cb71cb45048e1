// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::dir::{Directory, EntryStream, Handle};
use crate::error::{Error, Result};
use crate::node::NodeType;
use async_trait::async_trait;
use futures::stream;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::SystemTime;

/// Represents a directory backed by a BTreeMap
///
/// Names are compared exactly (case-sensitive).
pub struct MemoryDirectory {
    entries: BTreeMap<String, NodeType>,
    modified: SystemTime,
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn get(&self, name: &str) -> Result<Option<NodeType>> {
        Ok(self.entries.get(name).cloned())
    }

    async fn create_document(&mut self, name: &str) -> Result<crate::file::Handle> {
        if self.entries.contains_key(name) {
            return Err(Error::already_exists(name));
        }
        let handle = super::MemoryFile::new_handle(Vec::new());
        _ = self
            .entries
            .insert(name.to_string(), NodeType::Document(handle.clone()));
        self.modified = SystemTime::now();
        Ok(handle)
    }

    async fn create_collection(&mut self, name: &str) -> Result<Handle> {
        if self.entries.contains_key(name) {
            return Err(Error::already_exists(name));
        }
        let handle = MemoryDirectory::new_handle();
        _ = self
            .entries
            .insert(name.to_string(), NodeType::Collection(handle.clone()));
        self.modified = SystemTime::now();
        Ok(handle)
    }

    async fn remove(&mut self, name: &str) -> Result<bool> {
        let removed = self.entries.remove(name).is_some();
        if removed {
            self.modified = SystemTime::now();
        }
        Ok(removed)
    }

    async fn entries(&self) -> Result<EntryStream> {
        let items: Vec<_> = self
            .entries
            .iter()
            .map(|(name, node)| Ok((name.clone(), node.clone())))
            .collect();
        Ok(Box::pin(stream::iter(items)))
    }

    async fn modified(&self) -> Result<SystemTime> {
        Ok(self.modified)
    }

    async fn set_modified(&mut self, time: SystemTime) -> Result<()> {
        self.modified = time;
        Ok(())
    }
}

impl MemoryDirectory {
    /// Create a new MemoryDirectory handle
    #[must_use]
    pub fn new_handle() -> Handle {
        Handle::new(Arc::new(tokio::sync::Mutex::new(Box::new(MemoryDirectory {
            entries: BTreeMap::new(),
            modified: SystemTime::now(),
        }))))
    }
}
