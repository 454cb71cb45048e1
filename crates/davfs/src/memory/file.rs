// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::file::{File, Handle, Reader, Writer};
use async_trait::async_trait;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::SystemTime;
use tokio::io::AsyncWrite;

/// Represents a file backed by memory
///
/// Readers see a snapshot of the content taken when they are opened.
pub struct MemoryFile {
    content: Arc<Mutex<Content>>,
}

struct Content {
    bytes: Vec<u8>,
    modified: SystemTime,
}

fn lock(content: &Mutex<Content>) -> MutexGuard<'_, Content> {
    content.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl File for MemoryFile {
    async fn async_reader(&self) -> Result<Reader> {
        let snapshot = lock(&self.content).bytes.clone();
        Ok(Box::pin(Cursor::new(snapshot)))
    }

    async fn async_writer(&self, offset: u64) -> Result<Writer> {
        Ok(Box::pin(MemoryWriter {
            content: self.content.clone(),
            position: usize::try_from(offset).unwrap_or(usize::MAX),
        }))
    }

    async fn truncate(&self) -> Result<()> {
        let mut content = lock(&self.content);
        content.bytes.clear();
        content.modified = SystemTime::now();
        Ok(())
    }

    async fn len(&self) -> Result<u64> {
        Ok(lock(&self.content).bytes.len() as u64)
    }

    async fn modified(&self) -> Result<SystemTime> {
        Ok(lock(&self.content).modified)
    }

    async fn set_modified(&self, time: SystemTime) -> Result<()> {
        lock(&self.content).modified = time;
        Ok(())
    }
}

impl MemoryFile {
    /// Create a new MemoryFile handle with the given content
    pub fn new_handle<T: AsRef<[u8]>>(content: T) -> Handle {
        Handle::new(Arc::new(tokio::sync::Mutex::new(Box::new(MemoryFile {
            content: Arc::new(Mutex::new(Content {
                bytes: content.as_ref().to_vec(),
                modified: SystemTime::now(),
            })),
        }))))
    }
}

/// Writes straight into the shared buffer, so content is visible as soon
/// as each write returns; flush and shutdown have nothing left to do.
struct MemoryWriter {
    content: Arc<Mutex<Content>>,
    position: usize,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        let this = self.get_mut();
        let Some(end) = this.position.checked_add(buf.len()) else {
            return Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "write offset out of range",
            )));
        };
        let mut content = lock(&this.content);
        if content.bytes.len() < end {
            content.bytes.resize(end, 0);
        }
        content.bytes[this.position..end].copy_from_slice(buf);
        content.modified = SystemTime::now();
        this.position = end;
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
