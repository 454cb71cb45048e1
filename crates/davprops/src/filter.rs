// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Properties of an entry, live and dead, and the filters that pick which
//! of them a request reports.

use crate::data::PropertyValue;
use crate::dead::{DeadProperty, load_and_create};
use crate::error::Result;
use crate::live::LastModifiedProperty;
use crate::name::PropertyName;
use crate::store::PropertyStore;
use davfs::Entry;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A property of an entry
#[derive(Debug)]
pub enum Property {
    LastModified(LastModifiedProperty),
    Dead(DeadProperty),
}

impl Property {
    #[must_use]
    pub fn name(&self) -> PropertyName {
        match self {
            Property::LastModified(_) => LastModifiedProperty::property_name(),
            Property::Dead(dead) => dead.name().clone(),
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Property::LastModified(_))
    }

    /// Whether the property can report a value
    #[must_use]
    pub fn is_readable(&self) -> bool {
        match self {
            Property::LastModified(_) => true,
            Property::Dead(dead) => dead.cached_value().is_some(),
        }
    }

    /// Current value, read from the backend or the store
    pub async fn value(&mut self, cancel: &CancellationToken) -> Result<Option<PropertyValue>> {
        match self {
            Property::LastModified(live) => Ok(Some(live.get_value().await?)),
            Property::Dead(dead) => dead.get(cancel).await,
        }
    }
}

/// The live properties of `entry` followed by its stored dead properties.
/// A stored value that shadows a live property name is skipped.
pub async fn load_properties(
    store: &Arc<dyn PropertyStore>,
    entry: &Entry,
    cancel: &CancellationToken,
) -> Result<Vec<Property>> {
    let live = LastModifiedProperty::property_name();
    let mut properties = vec![Property::LastModified(LastModifiedProperty::new(
        entry.clone(),
    ))];
    properties.extend(
        load_and_create(store, entry, cancel)
            .await?
            .into_iter()
            .filter(|dead| *dead.name() != live)
            .map(Property::Dead),
    );
    Ok(properties)
}

/// Decides which properties a request reports, and which requested names
/// could not be found
pub trait PropertyFilter: Send {
    /// Clears selection state before a new entry is filtered
    fn reset(&mut self);

    fn is_allowed(&self, property: &Property) -> bool;

    fn notify_of_selection(&mut self, property: &Property);

    fn missing_properties(&self) -> Vec<PropertyName>;
}

/// Allows every property that can report a value
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadableFilter;

impl PropertyFilter for ReadableFilter {
    fn reset(&mut self) {}

    fn is_allowed(&self, property: &Property) -> bool {
        property.is_readable()
    }

    fn notify_of_selection(&mut self, _property: &Property) {}

    fn missing_properties(&self) -> Vec<PropertyName> {
        Vec::new()
    }
}

/// Allows only the requested names and reports those never selected
#[derive(Debug, Default, Clone)]
pub struct NameFilter {
    requested: BTreeSet<PropertyName>,
    selected: BTreeSet<PropertyName>,
}

impl NameFilter {
    pub fn new<I: IntoIterator<Item = PropertyName>>(names: I) -> Self {
        Self {
            requested: names.into_iter().collect(),
            selected: BTreeSet::new(),
        }
    }
}

impl PropertyFilter for NameFilter {
    fn reset(&mut self) {
        self.selected.clear();
    }

    fn is_allowed(&self, property: &Property) -> bool {
        self.requested.contains(&property.name())
    }

    fn notify_of_selection(&mut self, property: &Property) {
        _ = self.selected.insert(property.name());
    }

    fn missing_properties(&self) -> Vec<PropertyName> {
        self.requested.difference(&self.selected).cloned().collect()
    }
}

/// Resets `filters`, keeps the properties every filter allows and tells
/// the filters what was selected
pub fn apply_filters(
    properties: Vec<Property>,
    filters: &mut [&mut dyn PropertyFilter],
) -> Vec<Property> {
    for filter in filters.iter_mut() {
        filter.reset();
    }
    let selected: Vec<_> = properties
        .into_iter()
        .filter(|property| filters.iter().all(|filter| filter.is_allowed(property)))
        .collect();
    for property in &selected {
        for filter in filters.iter_mut() {
            filter.notify_of_selection(property);
        }
    }
    selected
}
