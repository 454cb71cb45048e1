// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

/// Kind of a file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Document,
    Collection,
}

/// Backend handle for a node, as returned by a `Directory`
#[derive(Clone)]
pub enum NodeType {
    Document(crate::file::Handle),
    Collection(crate::dir::Handle),
}

impl NodeType {
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        match self {
            NodeType::Document(_) => EntryKind::Document,
            NodeType::Collection(_) => EntryKind::Collection,
        }
    }
}

impl std::fmt::Debug for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Document(_) => write!(f, "(document)"),
            NodeType::Collection(_) => write!(f, "(collection)"),
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Document => write!(f, "document"),
            EntryKind::Collection => write!(f, "collection"),
        }
    }
}
