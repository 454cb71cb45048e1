// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::node::EntryKind;

/// Hides backend entries from callers.
///
/// An ignored entry is absent from listings and lookups and cannot be
/// created through the file system. Property stores use this to keep
/// their sidecar files out of sight.
pub trait EntryFilter: Send + Sync {
    fn is_ignored(&self, name: &str, kind: EntryKind) -> bool;
}
