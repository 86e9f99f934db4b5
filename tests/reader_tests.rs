//! Tests for SnapshotReader and CfIterator
//!
//! These tests verify:
//! - Iteration order and prefix stripping
//! - Family region boundaries
//! - Contract violations (invalid iterator, closed reader)
//! - Idempotent release

use cfstore::config::Config;
use cfstore::{
    KvIterator, Modify, RequestContext, StandaloneStorage, Storage, StorageReader, StoreError,
    CF_DEFAULT, CF_LOCK, CF_WRITE,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_storage() -> (TempDir, StandaloneStorage) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder().data_dir(temp_dir.path()).build();
    let storage = StandaloneStorage::new(config);
    storage.start().unwrap();
    (temp_dir, storage)
}

fn ctx() -> RequestContext {
    RequestContext::default()
}

fn collect_keys<I: KvIterator>(iter: &mut I) -> Vec<Vec<u8>> {
    let mut keys = Vec::new();
    while iter.valid() {
        keys.push(iter.key().unwrap().to_vec());
        iter.next().unwrap();
    }
    keys
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[test]
fn test_iterates_in_byte_order() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write(
            &ctx(),
            &[
                Modify::put(CF_DEFAULT, "c", "3"),
                Modify::put(CF_DEFAULT, "a", "1"),
                Modify::put(CF_DEFAULT, "b", "2"),
            ],
        )
        .unwrap();

    let reader = storage.reader(&ctx()).unwrap();
    let mut iter = reader.iter_cf(CF_DEFAULT).unwrap();

    assert_eq!(
        collect_keys(&mut iter),
        vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]
    );
}

#[test]
fn test_iterator_stays_inside_family() {
    let (_temp, storage) = setup_temp_storage();
    // Engine order of tags: "default_" < "lock_" < "write_"
    storage
        .write(
            &ctx(),
            &[
                Modify::put(CF_DEFAULT, "d1", "x"),
                Modify::put(CF_LOCK, "l1", "x"),
                Modify::put(CF_LOCK, "l2", "x"),
                Modify::put(CF_WRITE, "w1", "x"),
            ],
        )
        .unwrap();

    let reader = storage.reader(&ctx()).unwrap();

    let mut default_iter = reader.iter_cf(CF_DEFAULT).unwrap();
    assert_eq!(collect_keys(&mut default_iter), vec![b"d1".to_vec()]);

    let mut lock_iter = reader.iter_cf(CF_LOCK).unwrap();
    assert_eq!(
        collect_keys(&mut lock_iter),
        vec![b"l1".to_vec(), b"l2".to_vec()]
    );

    let mut write_iter = reader.iter_cf(CF_WRITE).unwrap();
    assert_eq!(collect_keys(&mut write_iter), vec![b"w1".to_vec()]);
}

#[test]
fn test_empty_family_is_exhausted() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write(&ctx(), &[Modify::put(CF_WRITE, "w", "x")])
        .unwrap();

    let reader = storage.reader(&ctx()).unwrap();
    let iter = reader.iter_cf(CF_LOCK).unwrap();

    assert!(!iter.valid());
}

#[test]
fn test_seek_past_last_key() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write(
            &ctx(),
            &[
                Modify::put(CF_DEFAULT, "a", "1"),
                Modify::put(CF_LOCK, "a", "neighbour"),
            ],
        )
        .unwrap();

    let reader = storage.reader(&ctx()).unwrap();
    let mut iter = reader.iter_cf(CF_DEFAULT).unwrap();
    iter.seek(b"z").unwrap();

    // The next engine key belongs to `lock`, which counts as exhaustion.
    assert!(!iter.valid());
}

#[test]
fn test_seek_restarts_iteration() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write(
            &ctx(),
            &[
                Modify::put(CF_DEFAULT, "a", "1"),
                Modify::put(CF_DEFAULT, "b", "2"),
            ],
        )
        .unwrap();

    let reader = storage.reader(&ctx()).unwrap();
    let mut iter = reader.iter_cf(CF_DEFAULT).unwrap();
    assert_eq!(collect_keys(&mut iter).len(), 2);

    iter.seek(b"").unwrap();
    assert_eq!(iter.key().unwrap(), b"a");
    assert_eq!(iter.value().unwrap(), b"1");
}

#[test]
fn test_seek_between_keys() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write(
            &ctx(),
            &[
                Modify::put(CF_DEFAULT, "aa", "1"),
                Modify::put(CF_DEFAULT, "ac", "2"),
            ],
        )
        .unwrap();

    let reader = storage.reader(&ctx()).unwrap();
    let mut iter = reader.iter_cf(CF_DEFAULT).unwrap();
    iter.seek(b"ab").unwrap();

    assert_eq!(iter.key().unwrap(), b"ac");
}

#[test]
fn test_iterator_ignores_later_commits() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write(&ctx(), &[Modify::put(CF_DEFAULT, "a", "1")])
        .unwrap();

    let reader = storage.reader(&ctx()).unwrap();
    storage
        .write(&ctx(), &[Modify::put(CF_DEFAULT, "b", "2")])
        .unwrap();

    let mut iter = reader.iter_cf(CF_DEFAULT).unwrap();
    assert_eq!(collect_keys(&mut iter), vec![b"a".to_vec()]);
}

// =============================================================================
// Contract Violation Tests
// =============================================================================

#[test]
fn test_key_and_value_on_exhausted_iterator() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write(&ctx(), &[Modify::put(CF_DEFAULT, "a", "1")])
        .unwrap();

    let reader = storage.reader(&ctx()).unwrap();
    let mut iter = reader.iter_cf(CF_DEFAULT).unwrap();
    iter.next().unwrap();

    assert!(!iter.valid());
    assert!(matches!(iter.key(), Err(StoreError::InvalidIterator)));
    assert!(matches!(iter.value(), Err(StoreError::InvalidIterator)));

    // Advancing an exhausted iterator keeps it exhausted.
    iter.next().unwrap();
    assert!(!iter.valid());
}

#[test]
fn test_unknown_family_on_reader() {
    let (_temp, storage) = setup_temp_storage();
    let reader = storage.reader(&ctx()).unwrap();

    assert!(matches!(
        reader.get_cf("nope", b"k"),
        Err(StoreError::UnknownColumnFamily(_))
    ));
    assert!(matches!(
        reader.iter_cf("nope"),
        Err(StoreError::UnknownColumnFamily(_))
    ));
}

#[test]
fn test_get_missing_key_is_none() {
    let (_temp, storage) = setup_temp_storage();
    let reader = storage.reader(&ctx()).unwrap();

    assert_eq!(reader.get_cf(CF_DEFAULT, b"missing").unwrap(), None);
}

// =============================================================================
// Release Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let (_temp, storage) = setup_temp_storage();
    storage
        .write(&ctx(), &[Modify::put(CF_DEFAULT, "k", "v")])
        .unwrap();

    let mut reader = storage.reader(&ctx()).unwrap();
    reader.close();
    reader.close();

    assert!(reader.is_closed());
    assert!(matches!(
        reader.get_cf(CF_DEFAULT, b"k"),
        Err(StoreError::ReaderClosed)
    ));
    assert!(matches!(
        reader.iter_cf(CF_DEFAULT),
        Err(StoreError::ReaderClosed)
    ));

    // The storage keeps working after the double release.
    storage
        .write(&ctx(), &[Modify::put(CF_DEFAULT, "k", "v2")])
        .unwrap();
    let fresh = storage.reader(&ctx()).unwrap();
    assert_eq!(fresh.get_cf(CF_DEFAULT, b"k").unwrap(), Some(b"v2".to_vec()));
}

#[test]
fn test_many_readers_released() {
    let (_temp, storage) = setup_temp_storage();

    for i in 0..100 {
        let mut reader = storage.reader(&RequestContext::new(i)).unwrap();
        assert_eq!(reader.get_cf(CF_DEFAULT, b"k").unwrap(), None);
        reader.close();
    }

    storage
        .write(&ctx(), &[Modify::put(CF_DEFAULT, "k", "v")])
        .unwrap();
    storage.stop().unwrap();
}
