//! Tests for storage backends
//!
//! These tests verify:
//! - MemoryStorage get/set/remove and quota accounting
//! - FileStorage slot files, overwrite and removal
//! - Codec round trip through FileStorage

use addressbook::model::User;
use addressbook::persistence::{FileStorage, MemoryStorage, PersistenceCodec, StorageBackend};
use addressbook::store::{Collection, StoreState};
use addressbook::StoreError;
use tempfile::TempDir;

// =============================================================================
// MemoryStorage Tests
// =============================================================================

#[test]
fn test_memory_get_missing_is_none() {
    let storage = MemoryStorage::new();

    assert_eq!(storage.get_item("missing").unwrap(), None);
}

#[test]
fn test_memory_set_get_overwrite_remove() {
    let storage = MemoryStorage::new();

    storage.set_item("k", "one").unwrap();
    storage.set_item("k", "two").unwrap();
    assert_eq!(storage.get_item("k").unwrap(), Some("two".to_string()));

    storage.remove_item("k").unwrap();
    storage.remove_item("k").unwrap();
    assert_eq!(storage.get_item("k").unwrap(), None);
}

#[test]
fn test_memory_quota_rejects_and_keeps_previous() {
    let storage = MemoryStorage::with_quota(10);

    storage.set_item("k", "12345").unwrap();
    let err = storage.set_item("k", "1234567890").unwrap_err();

    assert!(matches!(err, StoreError::QuotaExceeded { needed: 11, quota: 10 }));
    assert_eq!(storage.get_item("k").unwrap(), Some("12345".to_string()));
    assert_eq!(storage.used_bytes(), 6);
}

#[test]
fn test_memory_quota_counts_replaced_slot_once() {
    let storage = MemoryStorage::with_quota(8);

    storage.set_item("k", "1234567").unwrap();
    storage.set_item("k", "7654321").unwrap();

    assert_eq!(storage.get_item("k").unwrap(), Some("7654321".to_string()));
}

#[test]
fn test_memory_lifting_quota_allows_writes() {
    let storage = MemoryStorage::with_quota(1);
    assert!(storage.set_item("k", "v").is_err());

    storage.set_quota(None);

    storage.set_item("k", "v").unwrap();
}

// =============================================================================
// FileStorage Tests
// =============================================================================

#[test]
fn test_file_storage_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("nested").join("store");

    let storage = FileStorage::open(&dir).unwrap();

    assert!(dir.exists());
    assert_eq!(storage.dir(), dir.as_path());
}

#[test]
fn test_file_storage_set_get_remove() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::open(temp_dir.path()).unwrap();

    assert_eq!(storage.get_item("slot").unwrap(), None);

    storage.set_item("slot", "{\"a\":1}").unwrap();
    assert!(storage.slot_path("slot").exists());
    assert_eq!(storage.get_item("slot").unwrap(), Some("{\"a\":1}".to_string()));

    storage.set_item("slot", "{}").unwrap();
    assert_eq!(storage.get_item("slot").unwrap(), Some("{}".to_string()));

    storage.remove_item("slot").unwrap();
    storage.remove_item("slot").unwrap();
    assert_eq!(storage.get_item("slot").unwrap(), None);
}

#[test]
fn test_file_storage_leaves_no_temp_files() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::open(temp_dir.path()).unwrap();

    for i in 0..5 {
        storage.set_item("slot", &i.to_string()).unwrap();
    }

    let files = std::fs::read_dir(temp_dir.path()).unwrap().count();
    assert_eq!(files, 1);
}

#[test]
fn test_codec_round_trip_through_files() {
    let temp_dir = TempDir::new().unwrap();
    let codec = PersistenceCodec::new(FileStorage::open(temp_dir.path()).unwrap(), "book");

    let mut state = StoreState::default();
    state.users = Collection::from_records(vec![
        User { id: 3, name: Some("C".into()), ..User::default() },
        User { id: 1, name: Some("A".into()), ..User::default() },
    ]);
    assert!(codec.save(&state));

    let reopened = PersistenceCodec::new(FileStorage::open(temp_dir.path()).unwrap(), "book");
    assert_eq!(reopened.load(), state);
}

#[test]
fn test_corrupt_file_loads_empty() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::open(temp_dir.path()).unwrap();
    std::fs::write(storage.slot_path("book"), b"\x00\x01garbage").unwrap();

    let codec = PersistenceCodec::new(storage, "book");

    assert_eq!(codec.load(), StoreState::default());
}
