// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Text-file property store over a host directory, with the store hiding
//! its own sidecar files from the file system.

use async_trait::async_trait;
use davfs::{Entry, FileSystem, LockIntent, LockManager};
use davprops::{
    Durability, EntityTag, Error, LastModifiedProperty, MemoryStoreCache, PropertyName,
    PropertyStore, PropertyStoreOptions, PropertyValue, STORE_ENTRY_NAME, StoreData,
    TextFilePropertyStore, format_http_date, load_and_create, load_properties,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

struct Fixture {
    dir: TempDir,
    cache: Arc<MemoryStoreCache>,
    store: Arc<TextFilePropertyStore>,
    fs: FileSystem,
}

fn fixture() -> Fixture {
    fixture_with(Durability::BestEffort)
}

fn fixture_with(durability: Durability) -> Fixture {
    diagnostics::init_test_logging();
    let dir = TempDir::new().expect("create temp dir");
    let cache = Arc::new(MemoryStoreCache::default());
    let store = Arc::new(new_store(dir.path(), cache.clone(), durability));
    let fs = FileSystem::builder(davfs::hostmount::root_handle(dir.path().to_path_buf()).unwrap())
        .entry_filter(store.clone())
        .build();
    Fixture {
        dir,
        cache,
        store,
        fs,
    }
}

fn new_store(
    root: &Path,
    cache: Arc<MemoryStoreCache>,
    durability: Durability,
) -> TextFilePropertyStore {
    let options = PropertyStoreOptions::new(root).with_durability(durability);
    TextFilePropertyStore::new(options, cache)
}

fn color() -> PropertyName {
    PropertyName::new("urn:example", "color")
}

fn read_sidecar(path: &Path) -> StoreData {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_round_trip_survives_reload() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let doc = Entry::from(f.fs.root().create_document("Doc.txt").await.unwrap());

    f.store
        .save_raw(&doc, &color(), PropertyValue::from("blue"), &cancel)
        .await
        .unwrap();
    assert_eq!(
        f.store.load_raw(&doc, &color(), &cancel).await.unwrap(),
        Some(PropertyValue::from("blue"))
    );

    // A store with an empty cache has to go back to the sidecar
    let reloaded = new_store(
        f.dir.path(),
        Arc::new(MemoryStoreCache::default()),
        Durability::BestEffort,
    );
    assert_eq!(
        reloaded.load_raw(&doc, &color(), &cancel).await.unwrap(),
        Some(PropertyValue::from("blue"))
    );

    let on_disk = read_sidecar(&f.dir.path().join(STORE_ENTRY_NAME));
    assert_eq!(
        on_disk.get("doc.txt", &color()),
        Some(&PropertyValue::from("blue"))
    );
}

#[tokio::test]
async fn test_reads_served_from_cache() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let doc = Entry::from(f.fs.root().create_document("a").await.unwrap());

    f.store
        .save_raw(&doc, &color(), PropertyValue::from(1), &cancel)
        .await
        .unwrap();
    let before = f.cache.stats();
    _ = f.store.load_raw(&doc, &color(), &cancel).await.unwrap();
    _ = f.store.load_raw(&doc, &color(), &cancel).await.unwrap();

    let after = f.cache.stats();
    assert_eq!(after.hits - before.hits, 2);
    assert_eq!(after.misses, before.misses);
}

#[tokio::test]
async fn test_sidecar_is_hidden() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let root = f.fs.root();
    let doc = Entry::from(root.create_document("visible").await.unwrap());
    f.store
        .save_raw(&doc, &color(), PropertyValue::from("red"), &cancel)
        .await
        .unwrap();
    assert!(f.dir.path().join(STORE_ENTRY_NAME).exists());

    let names: Vec<_> = root
        .children()
        .await
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, vec!["visible"]);
    assert!(f.fs.select(STORE_ENTRY_NAME).await.unwrap().is_missing());
    assert!(matches!(
        root.create_document(STORE_ENTRY_NAME).await,
        Err(davfs::Error::InvalidName(_))
    ));
}

#[tokio::test]
async fn test_collection_uses_own_sidecar() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let sub = Entry::from(f.fs.root().create_collection("sub").await.unwrap());

    f.store
        .save_raw(&sub, &PropertyName::dav("displayname"), PropertyValue::from("Sub"), &cancel)
        .await
        .unwrap();

    let on_disk = read_sidecar(&f.dir.path().join("sub").join(STORE_ENTRY_NAME));
    assert!(on_disk.entries.contains_key("."));
    assert!(!f.dir.path().join(STORE_ENTRY_NAME).exists());
}

#[tokio::test]
async fn test_remove_absent_writes_nothing() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let doc = Entry::from(f.fs.root().create_document("f").await.unwrap());

    f.store.remove_raw(&doc, &color(), &cancel).await.unwrap();
    assert!(!f.dir.path().join(STORE_ENTRY_NAME).exists());
    assert!(f.store.load_raw(&doc, &color(), &cancel).await.unwrap().is_none());
}

#[tokio::test]
async fn test_remove_present() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let doc = Entry::from(f.fs.root().create_document("f").await.unwrap());
    let other = PropertyName::new("urn:example", "size");

    f.store
        .save_raw(&doc, &color(), PropertyValue::from("red"), &cancel)
        .await
        .unwrap();
    f.store
        .save_raw(&doc, &other, PropertyValue::from(3), &cancel)
        .await
        .unwrap();
    f.store.remove_raw(&doc, &color(), &cancel).await.unwrap();

    let info = f.store.load_entry(&doc, &cancel).await.unwrap();
    assert_eq!(info.attributes.len(), 1);
    assert_eq!(info.attributes.get(&other), Some(&PropertyValue::from(3)));
}

#[tokio::test]
async fn test_move_between_directories() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let root = f.fs.root();
    let a = root.create_collection("a").await.unwrap();
    let b = root.create_collection("b").await.unwrap();
    let old = Entry::from(a.create_document("x").await.unwrap());
    f.store
        .save_raw(&old, &color(), PropertyValue::from("green"), &cancel)
        .await
        .unwrap();

    old.delete().await.unwrap();
    let new = Entry::from(b.create_document("y").await.unwrap());
    f.store.handle_moved_entry("a/x", &new, &cancel).await.unwrap();

    assert_eq!(
        f.store.load_raw(&new, &color(), &cancel).await.unwrap(),
        Some(PropertyValue::from("green"))
    );
    assert!(f.store.load_raw(&old, &color(), &cancel).await.unwrap().is_none());
    let old_sidecar = read_sidecar(&f.dir.path().join("a").join(STORE_ENTRY_NAME));
    assert!(old_sidecar.entries.is_empty());
}

#[tokio::test]
async fn test_rename_within_directory() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let root = f.fs.root();
    let old = Entry::from(root.create_document("before").await.unwrap());
    f.store
        .save_raw(&old, &color(), PropertyValue::from("gold"), &cancel)
        .await
        .unwrap();

    old.delete().await.unwrap();
    let new = Entry::from(root.create_document("after").await.unwrap());
    f.store.handle_moved_entry("before", &new, &cancel).await.unwrap();

    let on_disk = read_sidecar(&f.dir.path().join(STORE_ENTRY_NAME));
    assert!(!on_disk.entries.contains_key("before"));
    assert_eq!(on_disk.get("after", &color()), Some(&PropertyValue::from("gold")));
}

#[tokio::test]
async fn test_move_without_properties_is_noop() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let new = Entry::from(f.fs.root().create_document("y").await.unwrap());

    f.store.handle_moved_entry("x", &new, &cancel).await.unwrap();
    assert!(!f.dir.path().join(STORE_ENTRY_NAME).exists());
}

#[tokio::test]
async fn test_etag_monotonic() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let doc = f.fs.root().create_document("tagged").await.unwrap();

    let first = f.store.update_etag(&doc, &cancel).await.unwrap();
    let second = f.store.update_etag(&doc, &cancel).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(f.store.get_etag(&doc, &cancel).await.unwrap(), second);

    let stored = read_sidecar(&f.dir.path().join(STORE_ENTRY_NAME));
    assert_eq!(
        stored.get("tagged", &EntityTag::property_name()),
        Some(&second.to_value())
    );
}

#[tokio::test]
async fn test_modified_collection_has_no_etag() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let sub = Entry::from(f.fs.root().create_collection("sub").await.unwrap());

    f.store.handle_modified_entry(&sub, &cancel).await.unwrap();
    assert!(!f.dir.path().join("sub").join(STORE_ENTRY_NAME).exists());
}

#[tokio::test]
async fn test_recreated_directory_starts_empty() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let root = f.fs.root();
    let a = root.create_collection("a").await.unwrap();
    let x = a.create_document("x").await.unwrap();
    f.store
        .save_raw(&Entry::from(a.clone()), &color(), PropertyValue::from("red"), &cancel)
        .await
        .unwrap();
    f.store
        .save_raw(&Entry::from(x.clone()), &color(), PropertyValue::from("blue"), &cancel)
        .await
        .unwrap();
    let old_etag = f.store.get_etag(&x, &cancel).await.unwrap();

    a.delete().await.unwrap();
    let a = root.create_collection("a").await.unwrap();
    let x = a.create_document("x").await.unwrap();

    let a = Entry::from(a);
    assert!(f.store.load_raw(&a, &color(), &cancel).await.unwrap().is_none());
    assert!(f.store.load_entry(&a, &cancel).await.unwrap().attributes.is_empty());
    assert!(
        f.store
            .load_raw(&Entry::from(x.clone()), &color(), &cancel)
            .await
            .unwrap()
            .is_none()
    );
    let new_etag = f.store.get_etag(&x, &cancel).await.unwrap();
    assert_ne!(new_etag, old_etag);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_etag_updates_keep_last() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let doc = f.fs.root().create_document("busy").await.unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let store = f.store.clone();
            let doc = doc.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { store.update_etag(&doc, &cancel).await.unwrap() })
        })
        .collect();
    let mut tags = Vec::new();
    for task in tasks {
        tags.push(task.await.unwrap());
    }

    // Serialized updates form one chain: every tag but the newest has
    // its successor among the results
    let stored = f.store.get_etag(&doc, &cancel).await.unwrap();
    assert!(tags.contains(&stored));
    assert!(!tags.contains(&stored.update()));
    for tag in tags.iter().filter(|t| **t != stored) {
        assert!(tags.contains(&tag.update()), "{tag} was overwritten");
    }

    let last = f.store.update_etag(&doc, &cancel).await.unwrap();
    assert_eq!(last, stored.update());
    assert_eq!(f.store.get_etag(&doc, &cancel).await.unwrap(), last);
    let on_disk = read_sidecar(&f.dir.path().join(STORE_ENTRY_NAME));
    assert_eq!(
        on_disk.get("busy", &EntityTag::property_name()),
        Some(&last.to_value())
    );
}

#[tokio::test]
async fn test_best_effort_keeps_cached_value() {
    let dir = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let cache = Arc::new(MemoryStoreCache::default());
    // Sidecar writes fail: the root folder does not exist
    let store = new_store(&dir.path().join("missing"), cache, Durability::BestEffort);
    let doc = Entry::from(davfs::memory::new_fs().root().create_document("d").await.unwrap());
    let size = PropertyName::new("urn:example", "size");

    store
        .save_raw(&doc, &color(), PropertyValue::from("blue"), &cancel)
        .await
        .unwrap();
    store
        .save_raw(&doc, &size, PropertyValue::from(7), &cancel)
        .await
        .unwrap();

    let info = store.load_entry(&doc, &cancel).await.unwrap();
    assert_eq!(info.attributes.get(&color()), Some(&PropertyValue::from("blue")));
    assert_eq!(info.attributes.get(&size), Some(&PropertyValue::from(7)));
    assert!(!dir.path().join("missing").exists());
}

#[tokio::test]
async fn test_strict_reports_write_failure() {
    let dir = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let cache = Arc::new(MemoryStoreCache::default());
    let store = new_store(&dir.path().join("missing"), cache, Durability::Strict);
    let doc = Entry::from(davfs::memory::new_fs().root().create_document("d").await.unwrap());

    let result = store
        .save_raw(&doc, &color(), PropertyValue::from("blue"), &cancel)
        .await;
    assert!(matches!(result, Err(Error::Io { .. })));
    assert!(store.load_raw(&doc, &color(), &cancel).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cancelled_before_write() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let doc = Entry::from(f.fs.root().create_document("f").await.unwrap());

    cancel.cancel();
    let result = f
        .store
        .save_raw(&doc, &color(), PropertyValue::from("blue"), &cancel)
        .await;
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(!f.dir.path().join(STORE_ENTRY_NAME).exists());
}

#[tokio::test]
async fn test_corrupt_sidecar() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let doc = Entry::from(f.fs.root().create_document("f").await.unwrap());
    std::fs::write(f.dir.path().join(STORE_ENTRY_NAME), b"{not json").unwrap();

    let result = f.store.load_raw(&doc, &color(), &cancel).await;
    assert!(matches!(result, Err(Error::CorruptStore { .. })));
}

#[tokio::test]
async fn test_dead_properties() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let doc = Entry::from(f.fs.root().create_document("f").await.unwrap());
    f.store
        .save_raw(&doc, &color(), PropertyValue::from("blue"), &cancel)
        .await
        .unwrap();

    let store: Arc<dyn PropertyStore> = f.store.clone();
    let mut props = load_and_create(&store, &doc, &cancel).await.unwrap();
    assert_eq!(props.len(), 1);
    let prop = &mut props[0];
    assert_eq!(prop.name(), &color());
    assert_eq!(prop.cached_value(), Some(&PropertyValue::from("blue")));

    prop.set(PropertyValue::from("black"), &cancel).await.unwrap();
    assert_eq!(
        f.store.load_raw(&doc, &color(), &cancel).await.unwrap(),
        Some(PropertyValue::from("black"))
    );

    prop.remove(&cancel).await.unwrap();
    assert!(prop.get(&cancel).await.unwrap().is_none());
}

struct LockEverything;

#[async_trait]
impl LockManager for LockEverything {
    async fn permits(&self, _path: &str, intent: LockIntent) -> bool {
        intent != LockIntent::Write
    }
}

#[tokio::test]
async fn test_dead_property_respects_locks() {
    let fs = FileSystem::builder(davfs::memory::MemoryDirectory::new_handle())
        .lock_manager(Arc::new(LockEverything))
        .build();
    let cancel = CancellationToken::new();
    let doc = Entry::from(fs.root().create_document("f").await.unwrap());
    let store: Arc<dyn PropertyStore> = Arc::new(davprops::InMemoryPropertyStore::default());
    store
        .save_raw(&doc, &color(), PropertyValue::from("blue"), &cancel)
        .await
        .unwrap();

    let mut props = load_and_create(&store, &doc, &cancel).await.unwrap();
    let result = props[0].set(PropertyValue::from("red"), &cancel).await;
    assert!(matches!(result, Err(Error::Fs(davfs::Error::Locked(_)))));
    assert_eq!(
        store.load_raw(&doc, &color(), &cancel).await.unwrap(),
        Some(PropertyValue::from("blue"))
    );
}

#[tokio::test]
async fn test_live_last_modified_follows_host() {
    let f = fixture();
    let cancel = CancellationToken::new();
    let doc = f.fs.root().create_document("dated").await.unwrap();
    doc.write_all(b"content").await.unwrap();
    let entry = Entry::from(doc);
    f.store
        .save_raw(&entry, &color(), PropertyValue::from("blue"), &cancel)
        .await
        .unwrap();

    let store: Arc<dyn PropertyStore> = f.store.clone();
    let mut props = load_properties(&store, &entry, &cancel).await.unwrap();
    assert_eq!(props.len(), 2);
    assert_eq!(props[0].name(), LastModifiedProperty::property_name());

    let on_host = std::fs::metadata(f.dir.path().join("dated"))
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(
        props[0].value(&cancel).await.unwrap(),
        Some(PropertyValue::from(format_http_date(&on_host.into())))
    );
}
