// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::data::PropertyValue;
use crate::error::{Error, Result};
use crate::name::PropertyName;
use std::fmt;
use std::str::FromStr;

/// An HTTP entity tag, `"value"` or `W/"value"` in header form.
///
/// Fresh tags are a UUIDv7; each update appends or bumps a `.N` generation
/// suffix, so successive updates never repeat a tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTag {
    weak: bool,
    value: String,
}

impl EntityTag {
    /// A fresh strong tag
    #[must_use]
    pub fn new() -> Self {
        Self {
            weak: false,
            value: uuid7::uuid7().to_string(),
        }
    }

    /// Builds a tag from an opaque value, which must not contain quotes
    pub fn from_parts<V: Into<String>>(weak: bool, value: V) -> Result<Self> {
        let value = value.into();
        if value.contains('"') {
            return Err(Error::InvalidEntityTag(value));
        }
        Ok(Self { weak, value })
    }

    /// Name under which a document's tag is stored
    #[must_use]
    pub fn property_name() -> PropertyName {
        PropertyName::dav("getetag")
    }

    #[must_use]
    pub fn is_weak(&self) -> bool {
        self.weak
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The next tag in this tag's sequence
    #[must_use]
    pub fn update(&self) -> Self {
        let (base, generation) = match self.value.rsplit_once('.') {
            Some((base, n)) => match n.parse::<u64>() {
                Ok(n) => (base, n.saturating_add(1)),
                Err(_) => (self.value.as_str(), 1),
            },
            None => (self.value.as_str(), 1),
        };
        Self {
            weak: self.weak,
            value: format!("{base}.{generation}"),
        }
    }

    /// Strong comparison: both tags strong with equal values
    #[must_use]
    pub fn strong_eq(&self, other: &EntityTag) -> bool {
        !self.weak && !other.weak && self.value == other.value
    }

    /// Weak comparison: equal values regardless of weakness
    #[must_use]
    pub fn weak_eq(&self, other: &EntityTag) -> bool {
        self.value == other.value
    }

    #[must_use]
    pub fn to_value(&self) -> PropertyValue {
        PropertyValue::String(self.to_string())
    }

    pub fn from_value(value: &PropertyValue) -> Result<Self> {
        match value {
            PropertyValue::String(s) => s.parse(),
            other => Err(Error::InvalidEntityTag(other.to_string())),
        }
    }
}

impl Default for EntityTag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            write!(f, "W/\"{}\"", self.value)
        } else {
            write!(f, "\"{}\"", self.value)
        }
    }
}

impl FromStr for EntityTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (weak, quoted) = match trimmed.strip_prefix("W/") {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let value = quoted
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .ok_or_else(|| Error::InvalidEntityTag(s.to_string()))?;
        Self::from_parts(weak, value).map_err(|_| Error::InvalidEntityTag(s.to_string()))
    }
}
