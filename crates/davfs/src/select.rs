// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::entry::{Collection, Document, Entry};
use crate::error::{Error, Result};
use crate::path;
use log::debug;

/// Outcome of resolving a path
#[derive(Debug, Clone)]
pub enum SelectionResult {
    Document(Document),
    Collection(Collection),

    /// The path stopped resolving at `collection`; `missing` holds the
    /// segments that were not found, starting with the first absent one.
    Missing {
        collection: Collection,
        missing: Vec<String>,
    },
}

impl SelectionResult {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, SelectionResult::Missing { .. })
    }

    /// The resolved document, if the path named one
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        match self {
            SelectionResult::Document(d) => Some(d),
            _ => None,
        }
    }

    /// The resolved collection, or the closest existing ancestor when missing
    #[must_use]
    pub fn collection(&self) -> Option<&Collection> {
        match self {
            SelectionResult::Collection(c) => Some(c),
            SelectionResult::Missing { collection, .. } => Some(collection),
            SelectionResult::Document(_) => None,
        }
    }

    /// The unresolved remainder; empty unless missing
    #[must_use]
    pub fn missing_names(&self) -> &[String] {
        match self {
            SelectionResult::Missing { missing, .. } => missing,
            _ => &[],
        }
    }

    /// The resolved entry, or None if missing
    #[must_use]
    pub fn entry(&self) -> Option<Entry> {
        match self {
            SelectionResult::Document(d) => Some(Entry::Document(d.clone())),
            SelectionResult::Collection(c) => Some(Entry::Collection(c.clone())),
            SelectionResult::Missing { .. } => None,
        }
    }
}

impl Collection {
    /// Resolves `path` relative to this collection, one segment at a time.
    ///
    /// Mount points are crossed transparently. Descending through a
    /// document fails with `NotACollection`.
    pub async fn select(&self, path: &str) -> Result<SelectionResult> {
        let segments = path::segments(path);
        let mut current = self.clone();

        for (index, name) in segments.iter().enumerate() {
            let last = index + 1 == segments.len();
            match current.get_child(name).await? {
                None => {
                    debug!("select: '{path}' missing from '{}'", current.path());
                    return Ok(SelectionResult::Missing {
                        collection: current,
                        missing: segments[index..].iter().map(|s| (*s).to_string()).collect(),
                    });
                }
                Some(Entry::Document(doc)) if last => {
                    return Ok(SelectionResult::Document(doc));
                }
                Some(Entry::Document(doc)) => {
                    return Err(Error::not_a_collection(doc.path()));
                }
                Some(Entry::Collection(col)) => current = col,
            }
        }

        Ok(SelectionResult::Collection(current))
    }
}
