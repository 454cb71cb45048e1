// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by property stores
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A sidecar file exists but does not hold valid store data
    #[error("Corrupt property store {path}: {source}")]
    CorruptStore {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid property name: {0:?}")]
    InvalidPropertyName(String),

    #[error("Invalid entity tag: {0:?}")]
    InvalidEntityTag(String),

    #[error("Invalid HTTP date: {0:?}")]
    InvalidDate(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yaml_ng::Error),

    #[error(transparent)]
    Fs(#[from] davfs::Error),
}

impl Error {
    pub fn io<P: AsRef<std::path::Path>>(path: P, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn corrupt<P: AsRef<std::path::Path>>(path: P, source: serde_json::Error) -> Self {
        Error::CorruptStore {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
