// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Property storage for `davfs` entries.
//!
//! `TextFilePropertyStore` persists dead properties in a `.properties`
//! JSON sidecar per directory, reading through a shared `StoreCache`.
//! `InMemoryPropertyStore` offers the same contract without persistence.
//! Both track document entity tags as the `{DAV:}getetag` property.
//! `{DAV:}getlastmodified` is live, read from the entry's file system.

mod cache;
mod data;
mod dead;
mod error;
mod etag;
mod filter;
mod live;
mod memory;
mod name;
mod options;
mod store;
mod text_file;

pub use cache::{CacheStats, MemoryStoreCache, StoreCache};
pub use data::{COLLECTION_KEY, EntryInfo, PropertyValue, StoreData};
pub use dead::{DeadProperty, load_and_create};
pub use error::{Error, Result};
pub use etag::EntityTag;
pub use filter::{
    NameFilter, Property, PropertyFilter, ReadableFilter, apply_filters, load_properties,
};
pub use live::{LastModifiedProperty, format_http_date, parse_http_date};
pub use memory::InMemoryPropertyStore;
pub use name::{DAV_NAMESPACE, PropertyName};
pub use options::{Durability, PropertyStoreOptions};
pub use store::PropertyStore;
pub use text_file::{STORE_ENTRY_NAME, TextFilePropertyStore};
