// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::node::NodeType;
use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Mutex;

/// Stream of `(name, node)` pairs produced by `Directory::entries`
pub type EntryStream = Pin<Box<dyn Stream<Item = Result<(String, NodeType)>> + Send>>;

/// Backing store for a collection's children.
///
/// Implementations know nothing about mounts, read-only flags, locks or
/// ignored entries; `FileSystem` layers those on top.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<NodeType>>;

    /// Creates an empty document. Fails with `AlreadyExists` on collision.
    async fn create_document(&mut self, name: &str) -> Result<crate::file::Handle>;

    /// Creates an empty collection. Fails with `AlreadyExists` on collision.
    async fn create_collection(&mut self, name: &str) -> Result<Handle>;

    /// Removes a child (recursively for collections). Returns false if absent.
    async fn remove(&mut self, name: &str) -> Result<bool>;

    async fn entries(&self) -> Result<EntryStream>;

    /// Time the set of children last changed
    async fn modified(&self) -> Result<SystemTime>;

    async fn set_modified(&mut self, time: SystemTime) -> Result<()>;
}

/// A handle for a refcounted directory.
#[derive(Clone)]
pub struct Handle(Arc<Mutex<Box<dyn Directory>>>);

impl Handle {
    pub fn new(r: Arc<Mutex<Box<dyn Directory>>>) -> Self {
        Self(r)
    }

    pub async fn get(&self, name: &str) -> Result<Option<NodeType>> {
        self.0.lock().await.get(name).await
    }

    pub async fn create_document(&self, name: &str) -> Result<crate::file::Handle> {
        self.0.lock().await.create_document(name).await
    }

    pub async fn create_collection(&self, name: &str) -> Result<Handle> {
        self.0.lock().await.create_collection(name).await
    }

    pub async fn remove(&self, name: &str) -> Result<bool> {
        self.0.lock().await.remove(name).await
    }

    pub async fn entries(&self) -> Result<EntryStream> {
        self.0.lock().await.entries().await
    }

    pub async fn modified(&self) -> Result<SystemTime> {
        self.0.lock().await.modified().await
    }

    pub async fn set_modified(&self, time: SystemTime) -> Result<()> {
        self.0.lock().await.set_modified(time).await
    }

    /// True when both handles refer to the same directory object
    #[must_use]
    pub fn same(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
