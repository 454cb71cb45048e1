// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Slash-separated path helpers.
//!
//! Paths in this crate are relative to a file system root, use `/` as the
//! only separator and never carry a leading or trailing slash. The root
//! itself is the empty string.

use crate::error::{Error, Result};

/// Splits a path into its non-empty segments
#[must_use]
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Collapses repeated, leading and trailing slashes
#[must_use]
pub fn normalize(path: &str) -> String {
    segments(path).join("/")
}

/// Appends a single name to a normalized path
#[must_use]
pub fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

/// Extracts the final segment of a normalized path
#[must_use]
pub fn basename(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Everything before the final segment of a normalized path
#[must_use]
pub fn dirname(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Checks that `name` can be used as a single child name
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(Error::invalid_name(name));
    }
    Ok(())
}
