// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Seam to the external lock manager.
//!
//! Lock acquisition and the lock-token grammar belong to the protocol
//! layer. The file system only asks, before each mutation, whether the
//! mutation may proceed; a refusal surfaces as `Error::Locked`.

use async_trait::async_trait;

/// What a caller is about to do to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockIntent {
    /// Create a child entry at the path
    Create,
    /// Delete the entry at the path
    Delete,
    /// Write or truncate the document at the path
    Write,
}

#[async_trait]
pub trait LockManager: Send + Sync {
    /// Returns false when a held lock forbids `intent` on `path`
    async fn permits(&self, path: &str, intent: LockIntent) -> bool;
}

/// Lock manager that never refuses
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLocks;

#[async_trait]
impl LockManager for NoLocks {
    async fn permits(&self, _path: &str, _intent: LockIntent) -> bool {
        true
    }
}
