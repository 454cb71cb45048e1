// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Memory-based implementations for the file system
//!
//! This module contains in-memory implementations of the `File` and
//! `Directory` traits. They back scratch file systems, virtual roots that
//! exist only to host mount points, and tests.

mod directory;
mod file;

pub use directory::MemoryDirectory;
pub use file::MemoryFile;

/// Creates a new, empty, writable in-memory file system
#[must_use]
pub fn new_fs() -> crate::FileSystem {
    crate::FileSystem::new(MemoryDirectory::new_handle())
}
