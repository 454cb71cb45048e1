// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Virtual file system for a WebDAV server.
//!
//! A `FileSystem` exposes a tree of collections and documents over a
//! pluggable backend (`memory` or `hostmount`). Other file systems can be
//! mounted at any path; traversal crosses mount points transparently and
//! every entry keeps the logical path and parent it was reached through.

pub mod dir;
mod entry;
mod error;
pub mod file;
mod filter;
mod fs;
pub mod hostmount;
mod lock;
pub mod memory;
mod mount;
mod node;
pub mod path;
mod select;

#[cfg(test)]
mod tests;

pub use entry::{Collection, Document, Entry};
pub use error::{Error, Result};
pub use file::{Reader, Writer};
pub use filter::EntryFilter;
pub use fs::{FileSystem, FileSystemBuilder};
pub use lock::{LockIntent, LockManager, NoLocks};
pub use mount::MountPoint;
pub use node::{EntryKind, NodeType};
pub use select::SelectionResult;
