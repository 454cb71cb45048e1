// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use crate::file::{File, Handle, Reader, Writer};
use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::AsyncSeekExt;

/// Represents a file backed by a host file system file.
///
/// Reads and writes go directly to the host file. Writers must be shut
/// down (`AsyncWriteExt::shutdown`) for their bytes to be guaranteed on disk.
pub struct HostFile {
    host_path: PathBuf,
}

impl HostFile {
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

    fn error(&self, e: std::io::Error) -> Error {
        Error::io(self.host_path.display().to_string(), e)
    }
}

#[async_trait]
impl File for HostFile {
    async fn async_reader(&self) -> Result<Reader> {
        let file = tokio::fs::File::open(&self.host_path)
            .await
            .map_err(|e| self.error(e))?;
        Ok(Box::pin(file))
    }

    async fn async_writer(&self, offset: u64) -> Result<Writer> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&self.host_path)
            .await
            .map_err(|e| self.error(e))?;
        _ = file
            .seek(SeekFrom::Start(offset))
            .await
            .map_err(|e| self.error(e))?;
        Ok(Box::pin(file))
    }

    async fn truncate(&self) -> Result<()> {
        _ = tokio::fs::File::create(&self.host_path)
            .await
            .map_err(|e| self.error(e))?;
        Ok(())
    }

    async fn len(&self) -> Result<u64> {
        let metadata = tokio::fs::metadata(&self.host_path)
            .await
            .map_err(|e| self.error(e))?;
        Ok(metadata.len())
    }

    async fn modified(&self) -> Result<SystemTime> {
        super::host_modified(&self.host_path).await
    }

    async fn set_modified(&self, time: SystemTime) -> Result<()> {
        super::set_host_modified(&self.host_path, time).await
    }
}
