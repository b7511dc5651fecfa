//! Integration tests for version history persistence.

use automuse::store::VersionStore;
use serde_json::json;
use tempfile::TempDir;

use crate::common::fixtures::black_pixel;

#[test]
fn test_save_then_list_round_trips_config() {
    let tmp = TempDir::new().unwrap();
    let mut store = VersionStore::open(tmp.path()).unwrap();

    let config = json!({ "a": 1, "b": { "c": true } });
    store
        .create(None, &black_pixel(), config.clone(), None)
        .unwrap();

    let list = store.list();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].config, config);
    assert_eq!(list[0].parent_id, None);
    assert!(!list[0].id.is_empty());
}

#[test]
fn test_n_saves_yield_n_distinct_ids() {
    let tmp = TempDir::new().unwrap();
    let mut store = VersionStore::open(tmp.path()).unwrap();
    let png = black_pixel();

    for i in 0..10 {
        store.create(None, &png, json!({ "i": i }), None).unwrap();
    }

    let list = store.list();
    assert_eq!(list.len(), 10);
    for (i, a) in list.iter().enumerate() {
        for b in &list[i + 1..] {
            assert_ne!(a.id, b.id);
        }
    }
}

#[test]
fn test_delete_root_reattaches_child_to_null() {
    // Save a root, save a child of it, delete the root with a null
    // replacement; the child's parent becomes null and the root is gone.
    let tmp = TempDir::new().unwrap();
    let mut store = VersionStore::open(tmp.path()).unwrap();
    let png = black_pixel();

    let root = store.create(None, &png, json!({}), None).unwrap()[0].id.clone();
    store
        .create(Some(root.clone()), &png, json!({}), None)
        .unwrap();

    let list = store.delete(&root, None).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].parent_id, None);
    assert!(list.iter().all(|v| v.id != root));
}

#[test]
fn test_no_dangling_parents_after_delete_sequence() {
    let tmp = TempDir::new().unwrap();
    let mut store = VersionStore::open(tmp.path()).unwrap();
    let png = black_pixel();

    // Chain of five versions, each the child of the previous one.
    let mut parent: Option<String> = None;
    for _ in 0..5 {
        let list = store.create(parent.clone(), &png, json!({}), None).unwrap();
        parent = Some(list.last().unwrap().id.clone());
    }

    // Delete every other version, reattaching children to the deleted
    // node's own parent.
    let ids: Vec<String> = store.list().iter().map(|v| v.id.clone()).collect();
    for id in [&ids[1], &ids[3]] {
        let replacement = store
            .list()
            .iter()
            .find(|v| &v.id == id)
            .and_then(|v| v.parent_id.clone());
        let list = store.delete(id, replacement).unwrap();

        let surviving: Vec<&str> = list.iter().map(|v| v.id.as_str()).collect();
        for version in &list {
            if let Some(p) = &version.parent_id {
                assert!(
                    surviving.contains(&p.as_str()),
                    "dangling parent {p} after deleting {id}"
                );
            }
        }
    }

    assert_eq!(store.list().len(), 3);
}

#[test]
fn test_history_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let png = black_pixel();

    let before = {
        let mut store = VersionStore::open(tmp.path()).unwrap();
        store
            .create(None, &png, json!({ "seed": 42 }), Some("abc1234".into()))
            .unwrap();
        store.create(None, &png, json!({ "seed": 43 }), None).unwrap()
    };

    let store = VersionStore::open(tmp.path()).unwrap();
    assert_eq!(store.list(), before);
}

#[test]
fn test_version_images_are_served_from_store_dir() {
    let tmp = TempDir::new().unwrap();
    let mut store = VersionStore::open(tmp.path()).unwrap();
    let png = black_pixel();

    let list = store.create(None, &png, json!({}), None).unwrap();
    let image_path = tmp.path().join(&list[0].image);

    // The persisted snapshot is byte-identical to the capture and decodes
    // as a real image.
    assert_eq!(std::fs::read(&image_path).unwrap(), png);
    image::open(&image_path).unwrap();
}
