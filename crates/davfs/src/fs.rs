// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::dir;
use crate::entry::Collection;
use crate::error::{Error, Result};
use crate::filter::EntryFilter;
use crate::lock::{LockIntent, LockManager, NoLocks};
use crate::mount::{MountPoint, MountTable};
use crate::node::EntryKind;
use crate::path;
use crate::select::SelectionResult;
use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A file system instance: a root directory plus the policies layered
/// over its backend (read-only flag, mounts, locks, ignored entries).
///
/// Cloning is cheap and yields the same instance.
#[derive(Clone)]
pub struct FileSystem {
    inner: Arc<Inner>,
}

struct Inner {
    root: dir::Handle,
    read_only: AtomicBool,
    mounts: MountTable,
    locks: Arc<dyn LockManager>,
    filter: Option<Arc<dyn EntryFilter>>,
}

/// Configures a `FileSystem` before it is shared
pub struct FileSystemBuilder {
    root: dir::Handle,
    read_only: bool,
    locks: Arc<dyn LockManager>,
    filter: Option<Arc<dyn EntryFilter>>,
}

impl FileSystemBuilder {
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub fn lock_manager(mut self, locks: Arc<dyn LockManager>) -> Self {
        self.locks = locks;
        self
    }

    #[must_use]
    pub fn entry_filter(mut self, filter: Arc<dyn EntryFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn build(self) -> FileSystem {
        FileSystem {
            inner: Arc::new(Inner {
                root: self.root,
                read_only: AtomicBool::new(self.read_only),
                mounts: MountTable::default(),
                locks: self.locks,
                filter: self.filter,
            }),
        }
    }
}

impl FileSystem {
    /// Creates a writable file system over `root` with no locks and no filter
    #[must_use]
    pub fn new(root: dir::Handle) -> Self {
        Self::builder(root).build()
    }

    #[must_use]
    pub fn builder(root: dir::Handle) -> FileSystemBuilder {
        FileSystemBuilder {
            root,
            read_only: false,
            locks: Arc::new(NoLocks),
            filter: None,
        }
    }

    /// Returns the root collection of this file system.
    ///
    /// The root reached this way has no parent. A mounted file system's root
    /// reached through its host instead reports the mounting collection.
    #[must_use]
    pub fn root(&self) -> Collection {
        Collection::root(self.clone())
    }

    /// Resolves `path` starting at this file system's root
    pub async fn select(&self, path: &str) -> Result<SelectionResult> {
        self.root().select(path).await
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.inner.read_only.load(Ordering::Acquire)
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.inner.read_only.store(read_only, Ordering::Release);
    }

    /// Grafts `fs` at `mount_path` (relative to this file system's root).
    ///
    /// An existing mount at the same path is replaced and returned. The
    /// collection containing the mount path must be reachable for the mount
    /// to be visible; the mount path itself need not exist.
    pub async fn mount(&self, mount_path: &str, fs: FileSystem) -> Result<Option<FileSystem>> {
        let mount_path = path::normalize(mount_path);
        if mount_path.is_empty() {
            return Err(Error::EmptyPath);
        }
        if fs.same(self) || fs.reaches(self).await {
            return Err(Error::Other(format!(
                "Mounting at '{mount_path}' would create a mount cycle"
            )));
        }

        let replaced = self.inner.mounts.insert(mount_path.clone(), fs).await;
        if replaced.is_some() {
            info!("mount: replaced existing mount at '{mount_path}'");
        } else {
            debug!("mount: mounted file system at '{mount_path}'");
        }
        Ok(replaced)
    }

    /// Removes the mount at `mount_path`. Returns false if nothing was mounted there.
    pub async fn unmount(&self, mount_path: &str) -> bool {
        let mount_path = path::normalize(mount_path);
        let removed = self.inner.mounts.remove(&mount_path).await.is_some();
        debug!("unmount: '{mount_path}' removed = {removed}");
        removed
    }

    /// Snapshot of the mount table
    pub async fn mounts(&self) -> Vec<MountPoint> {
        self.inner.mounts.snapshot().await
    }

    /// True when both values refer to the same file system instance
    #[must_use]
    pub fn same(&self, other: &FileSystem) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// True if `target` is mounted somewhere inside this file system,
    /// directly or through nested mounts
    async fn reaches(&self, target: &FileSystem) -> bool {
        let mut pending = vec![self.clone()];
        while let Some(fs) = pending.pop() {
            for mount in fs.mounts().await {
                if mount.file_system.same(target) {
                    return true;
                }
                pending.push(mount.file_system);
            }
        }
        false
    }

    pub(crate) fn root_handle(&self) -> dir::Handle {
        self.inner.root.clone()
    }

    pub(crate) async fn mount_at(&self, local_path: &str) -> Option<FileSystem> {
        self.inner.mounts.get(local_path).await
    }

    pub(crate) async fn mounts_under(&self, parent: &str) -> Vec<(String, FileSystem)> {
        self.inner.mounts.children_of(parent).await
    }

    pub(crate) async fn has_mounts_within(&self, local_path: &str) -> bool {
        self.inner.mounts.any_within(local_path).await
    }

    pub(crate) fn is_ignored(&self, name: &str, kind: EntryKind) -> bool {
        self.inner
            .filter
            .as_ref()
            .is_some_and(|filter| filter.is_ignored(name, kind))
    }

    /// Asks the lock manager whether `intent` may proceed on `path`
    pub async fn check_lock(&self, path: &str, intent: LockIntent) -> Result<()> {
        if self.inner.locks.permits(path, intent).await {
            Ok(())
        } else {
            debug!("lock manager refused {intent:?} on '{path}'");
            Err(Error::locked(path))
        }
    }
}

impl std::fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystem")
            .field("id", &Arc::as_ptr(&self.inner))
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

impl PartialEq for FileSystem {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}
