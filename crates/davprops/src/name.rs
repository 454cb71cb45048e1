// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Namespace of the core WebDAV properties
pub const DAV_NAMESPACE: &str = "DAV:";

/// A namespace-qualified property name.
///
/// Written in Clark notation, `{namespace}local`, or just `local` when the
/// namespace is empty. Comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyName {
    namespace: String,
    local_name: String,
}

impl PropertyName {
    pub fn new<N: Into<String>, L: Into<String>>(namespace: N, local_name: L) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// A name in the `DAV:` namespace
    pub fn dav<L: Into<String>>(local_name: L) -> Self {
        Self::new(DAV_NAMESPACE, local_name)
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local_name)
        }
    }
}

impl FromStr for PropertyName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (namespace, local_name) = match s.strip_prefix('{') {
            Some(rest) => rest
                .split_once('}')
                .ok_or_else(|| Error::InvalidPropertyName(s.to_string()))?,
            None => ("", s),
        };
        if local_name.is_empty() || local_name.contains(['{', '}']) {
            return Err(Error::InvalidPropertyName(s.to_string()));
        }
        Ok(Self::new(namespace, local_name))
    }
}

impl Serialize for PropertyName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PropertyName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
