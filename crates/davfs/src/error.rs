// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur in file system operations.
///
/// Paths carried by the variants are logical, slash-separated paths as
/// seen by the caller, not host paths.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a collection: {0}")]
    NotACollection(String),

    #[error("Not a document: {0}")]
    NotADocument(String),

    #[error("Unauthorized access: {0}")]
    UnauthorizedAccess(String),

    #[error("Locked: {0}")]
    Locked(String),

    #[error("Path is empty")]
    EmptyPath,

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn not_found<P: AsRef<str>>(path: P) -> Self {
        Error::NotFound(path.as_ref().to_string())
    }

    pub fn already_exists<P: AsRef<str>>(path: P) -> Self {
        Error::AlreadyExists(path.as_ref().to_string())
    }

    pub fn not_a_collection<P: AsRef<str>>(path: P) -> Self {
        Error::NotACollection(path.as_ref().to_string())
    }

    pub fn not_a_document<P: AsRef<str>>(path: P) -> Self {
        Error::NotADocument(path.as_ref().to_string())
    }

    pub fn unauthorized<P: AsRef<str>>(path: P) -> Self {
        Error::UnauthorizedAccess(path.as_ref().to_string())
    }

    pub fn locked<P: AsRef<str>>(path: P) -> Self {
        Error::Locked(path.as_ref().to_string())
    }

    pub fn invalid_name<S: AsRef<str>>(name: S) -> Self {
        Error::InvalidName(name.as_ref().to_string())
    }

    /// Wrap an IO error, mapping the kinds that have a file system meaning
    /// onto their dedicated variants.
    pub fn io<P: AsRef<str>>(path: P, source: std::io::Error) -> Self {
        let path = path.as_ref().to_string();
        match source.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path),
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists(path),
            std::io::ErrorKind::PermissionDenied => Error::UnauthorizedAccess(path),
            _ => Error::Io { path, source },
        }
    }
}
