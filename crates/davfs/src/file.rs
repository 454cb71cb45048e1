// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use async_trait::async_trait;
use std::pin::Pin;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;

pub type Reader = Pin<Box<dyn AsyncRead + Send>>;
pub type Writer = Pin<Box<dyn AsyncWrite + Send>>;

/// Byte content of a document
#[async_trait]
pub trait File: Send + Sync {
    async fn async_reader(&self) -> Result<Reader>;

    /// Returns a writer positioned at `offset`. Bytes past the written range
    /// are preserved; writing past the end extends the content.
    async fn async_writer(&self, offset: u64) -> Result<Writer>;

    /// Discards all content
    async fn truncate(&self) -> Result<()>;

    async fn len(&self) -> Result<u64>;

    /// Time of the last content change
    async fn modified(&self) -> Result<SystemTime>;

    async fn set_modified(&self, time: SystemTime) -> Result<()>;
}

/// A handle for a refcounted file.
#[derive(Clone)]
pub struct Handle(Arc<Mutex<Box<dyn File>>>);

impl Handle {
    pub fn new(r: Arc<Mutex<Box<dyn File>>>) -> Self {
        Self(r)
    }

    pub async fn async_reader(&self) -> Result<Reader> {
        self.0.lock().await.async_reader().await
    }

    pub async fn async_writer(&self, offset: u64) -> Result<Writer> {
        self.0.lock().await.async_writer(offset).await
    }

    pub async fn truncate(&self) -> Result<()> {
        self.0.lock().await.truncate().await
    }

    pub async fn len(&self) -> Result<u64> {
        self.0.lock().await.len().await
    }

    pub async fn modified(&self) -> Result<SystemTime> {
        self.0.lock().await.modified().await
    }

    pub async fn set_modified(&self, time: SystemTime) -> Result<()> {
        self.0.lock().await.set_modified(time).await
    }
}
