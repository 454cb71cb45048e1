// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Hostmount -- a host directory tree as a file system backend
//!
//! This module maps a host directory onto the `Directory` and `File`
//! traits using `tokio::fs`. It is a peer of the `memory` module. The
//! file system root maps to a configurable host directory; collections map
//! to host directories and documents to regular host files.
//!
//! Name comparison follows the host file system, so lookups are
//! case-insensitive on hosts whose file systems are.

mod directory;
mod file;

#[cfg(test)]
mod tests;

pub use directory::HostDirectory;
pub use file::HostFile;

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Create a new hostmount-based file system rooted at the given host directory
///
/// The directory must exist. All paths will resolve relative to this root.
///
/// # Errors
///
/// Returns an error if the root directory does not exist or is not a directory.
pub fn new_fs(root: PathBuf) -> Result<crate::FileSystem> {
    Ok(crate::FileSystem::new(root_handle(root)?))
}

/// Validates `root` and returns a directory handle for it, for callers that
/// want to configure the file system through `FileSystem::builder`.
pub fn root_handle(root: PathBuf) -> Result<crate::dir::Handle> {
    let display = root.display().to_string();
    let metadata = std::fs::metadata(&root).map_err(|e| Error::io(&display, e))?;
    if !metadata.is_dir() {
        return Err(Error::not_a_collection(display));
    }
    Ok(HostDirectory::new_handle(root))
}

async fn host_modified(host_path: &Path) -> Result<SystemTime> {
    let display = host_path.display().to_string();
    tokio::fs::metadata(host_path)
        .await
        .and_then(|metadata| metadata.modified())
        .map_err(|e| Error::io(&display, e))
}

async fn set_host_modified(host_path: &Path, time: SystemTime) -> Result<()> {
    let display = host_path.display().to_string();
    let path = host_path.to_path_buf();
    tokio::task::spawn_blocking(move || std::fs::File::open(&path)?.set_modified(time))
        .await
        .map_err(std::io::Error::other)
        .and_then(|result| result)
        .map_err(|e| Error::io(&display, e))
}
