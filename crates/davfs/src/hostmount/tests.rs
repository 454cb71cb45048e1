// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Tests for the hostmount backend through the `FileSystem` API.

use crate::error::Error;
use crate::{EntryKind, SelectionResult};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

/// Create a temp directory with some test content
fn create_test_tree() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");

    std::fs::write(dir.path().join("hello.txt"), b"Hello, World!").unwrap();
    std::fs::write(dir.path().join("data.bin"), b"\x00\x01\x02\x03").unwrap();

    std::fs::create_dir(dir.path().join("subdir")).unwrap();
    std::fs::write(dir.path().join("subdir/nested.txt"), b"nested content").unwrap();

    dir
}

#[tokio::test]
async fn test_new_fs_nonexistent() {
    let result = super::new_fs("/nonexistent/path/foo".into());
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_new_fs_file_not_dir() {
    let dir = create_test_tree();
    let result = super::new_fs(dir.path().join("hello.txt"));
    assert!(matches!(result, Err(Error::NotACollection(_))));
}

#[tokio::test]
async fn test_children_sorted() {
    let dir = create_test_tree();
    let fs = super::new_fs(dir.path().to_path_buf()).unwrap();

    let children = fs.root().children().await.unwrap();
    let names: Vec<_> = children.iter().map(|e| e.name().to_string()).collect();
    assert_eq!(names, vec!["data.bin", "hello.txt", "subdir"]);
    assert_eq!(children[2].kind(), EntryKind::Collection);
}

#[tokio::test]
async fn test_read_nested_by_select() {
    let dir = create_test_tree();
    let fs = super::new_fs(dir.path().to_path_buf()).unwrap();

    let result = fs.select("subdir/nested.txt").await.unwrap();
    let doc = result.document().expect("document");
    assert_eq!(doc.path(), "subdir/nested.txt");
    assert_eq!(doc.parent().path(), "subdir");
    assert_eq!(doc.read_all().await.unwrap(), b"nested content");
    assert_eq!(doc.len().await.unwrap(), 14);
}

#[tokio::test]
async fn test_select_missing() {
    let dir = create_test_tree();
    let fs = super::new_fs(dir.path().to_path_buf()).unwrap();

    let result = fs.select("subdir/a/b").await.unwrap();
    match result {
        SelectionResult::Missing {
            collection,
            missing,
        } => {
            assert_eq!(collection.path(), "subdir");
            assert_eq!(missing, vec!["a", "b"]);
        }
        other => panic!("expected missing, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_and_write() {
    let dir = create_test_tree();
    let fs = super::new_fs(dir.path().to_path_buf()).unwrap();

    let sub = fs.root().create_collection("new").await.unwrap();
    let doc = sub.create_document("file.txt").await.unwrap();
    doc.write_all(b"written").await.unwrap();

    let on_disk = std::fs::read(dir.path().join("new/file.txt")).unwrap();
    assert_eq!(on_disk, b"written");
}

#[tokio::test]
async fn test_open_write_at_offset() {
    let dir = create_test_tree();
    let fs = super::new_fs(dir.path().to_path_buf()).unwrap();

    let doc = fs.select("hello.txt").await.unwrap().document().cloned().unwrap();
    let mut writer = doc.open_write(7).await.unwrap();
    writer.write_all(b"Pond!").await.unwrap();
    writer.shutdown().await.unwrap();

    assert_eq!(doc.read_all().await.unwrap(), b"Hello, Pond!!");
}

#[tokio::test]
async fn test_create_existing_fails() {
    let dir = create_test_tree();
    let fs = super::new_fs(dir.path().to_path_buf()).unwrap();

    let result = fs.root().create_document("hello.txt").await;
    assert!(matches!(result, Err(Error::AlreadyExists(p)) if p == "hello.txt"));
}

#[tokio::test]
async fn test_delete_collection_recursive() {
    let dir = create_test_tree();
    let fs = super::new_fs(dir.path().to_path_buf()).unwrap();

    let sub = fs.select("subdir").await.unwrap().collection().cloned().unwrap();
    sub.delete().await.unwrap();

    assert!(!dir.path().join("subdir").exists());
    assert!(fs.select("subdir").await.unwrap().is_missing());
}

#[tokio::test]
async fn test_read_only_host() {
    let dir = create_test_tree();
    let fs = crate::FileSystem::builder(super::root_handle(dir.path().to_path_buf()).unwrap())
        .read_only(true)
        .build();

    let doc = fs.select("hello.txt").await.unwrap().document().cloned().unwrap();
    assert!(matches!(doc.create().await, Err(Error::UnauthorizedAccess(_))));
    assert!(matches!(doc.delete().await, Err(Error::UnauthorizedAccess(_))));
    assert_eq!(doc.read_all().await.unwrap(), b"Hello, World!");
    assert!(dir.path().join("hello.txt").exists());
}

#[tokio::test]
async fn test_modified_from_host_metadata() {
    let dir = create_test_tree();
    let fs = super::new_fs(dir.path().to_path_buf()).unwrap();
    let doc = fs.select("hello.txt").await.unwrap().document().cloned().unwrap();

    let on_host = std::fs::metadata(dir.path().join("hello.txt"))
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(doc.modified().await.unwrap(), on_host);

    let past = std::time::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
    doc.set_modified(past).await.unwrap();
    assert_eq!(doc.modified().await.unwrap(), past);
    assert_eq!(
        std::fs::metadata(dir.path().join("hello.txt"))
            .unwrap()
            .modified()
            .unwrap(),
        past
    );

    let subdir = fs.select("subdir").await.unwrap().collection().cloned().unwrap();
    assert!(subdir.modified().await.is_ok());
}
