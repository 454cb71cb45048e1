// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Mount table of a file system.
//!
//! Keys are normalized paths local to the mounting file system. The table
//! sits behind a single `RwLock`, so a traversal sees the whole table as it
//! was either before or after a concurrent mount or unmount.

use crate::fs::FileSystem;
use crate::path;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// A file system grafted at `path` of another file system
#[derive(Debug, Clone)]
pub struct MountPoint {
    pub path: String,
    pub file_system: FileSystem,
}

#[derive(Default)]
pub(crate) struct MountTable {
    table: RwLock<BTreeMap<String, FileSystem>>,
}

impl MountTable {
    pub(crate) async fn insert(&self, path: String, fs: FileSystem) -> Option<FileSystem> {
        self.table.write().await.insert(path, fs)
    }

    pub(crate) async fn remove(&self, path: &str) -> Option<FileSystem> {
        self.table.write().await.remove(path)
    }

    pub(crate) async fn get(&self, path: &str) -> Option<FileSystem> {
        self.table.read().await.get(path).cloned()
    }

    /// Mounts whose mount path is a direct child of `parent`
    pub(crate) async fn children_of(&self, parent: &str) -> Vec<(String, FileSystem)> {
        self.table
            .read()
            .await
            .iter()
            .filter(|(mount_path, _)| path::dirname(mount_path) == parent)
            .map(|(mount_path, fs)| (path::basename(mount_path).to_string(), fs.clone()))
            .collect()
    }

    /// True if any mount lives at or below `local_path`
    pub(crate) async fn any_within(&self, local_path: &str) -> bool {
        let prefix = format!("{local_path}/");
        self.table
            .read()
            .await
            .keys()
            .any(|mount_path| local_path.is_empty() || mount_path == local_path || mount_path.starts_with(&prefix))
    }

    pub(crate) async fn snapshot(&self) -> Vec<MountPoint> {
        self.table
            .read()
            .await
            .iter()
            .map(|(path, fs)| MountPoint {
                path: path.clone(),
                file_system: fs.clone(),
            })
            .collect()
    }
}
