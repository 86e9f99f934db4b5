//! Snapshot Reader
//!
//! A read-only view pinned to one engine snapshot. Every lookup and scan
//! made through one reader sees the same data, whatever commits in between.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::engine::Snapshot;
use crate::error::{Result, StoreError};
use crate::iterator::{CfIterator, KvIterator, KvPair};
use crate::keyspace::Keyspace;

/// Read capability handed to the request layer
pub trait StorageReader {
    /// Family-scoped iterator borrowing this reader
    type Iter<'a>: KvIterator
    where
        Self: 'a;

    /// Point lookup; `Ok(None)` when the key is absent
    fn get_cf(&self, cf: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Iterator over `cf`, positioned at the family's first key
    fn iter_cf(&self, cf: &str) -> Result<Self::Iter<'_>>;

    /// Release the snapshot. Safe to call more than once.
    fn close(&mut self);

    /// Up to `limit` pairs of `cf` starting at the first key >= `start`
    fn scan_cf(&self, cf: &str, start: &[u8], limit: usize) -> Result<Vec<KvPair>> {
        let mut pairs = Vec::new();
        if limit == 0 {
            return Ok(pairs);
        }

        let mut iter = self.iter_cf(cf)?;
        iter.seek(start)?;
        while iter.valid() && pairs.len() < limit {
            pairs.push(KvPair {
                key: iter.key()?.to_vec(),
                value: iter.value()?.to_vec(),
            });
            iter.next()?;
        }

        Ok(pairs)
    }
}

/// Reader owning exactly one engine snapshot
///
/// The snapshot is released by `close()` or on drop, whichever comes first.
pub struct SnapshotReader<S: Snapshot> {
    snapshot: Option<S>,
    keyspace: Arc<Keyspace>,
    engine_alive: Arc<AtomicBool>,
    request_id: u64,
}

impl<S: Snapshot> SnapshotReader<S> {
    pub(crate) fn new(
        snapshot: S,
        keyspace: Arc<Keyspace>,
        engine_alive: Arc<AtomicBool>,
        request_id: u64,
    ) -> Self {
        Self {
            snapshot: Some(snapshot),
            keyspace,
            engine_alive,
            request_id,
        }
    }

    /// Whether `close()` has been called
    pub fn is_closed(&self) -> bool {
        self.snapshot.is_none()
    }

    fn snapshot(&self) -> Result<&S> {
        let snapshot = self.snapshot.as_ref().ok_or(StoreError::ReaderClosed)?;
        if !self.engine_alive.load(Ordering::Acquire) {
            return Err(StoreError::EngineStopped);
        }
        Ok(snapshot)
    }
}

impl<S: Snapshot> StorageReader for SnapshotReader<S> {
    type Iter<'a> = CfIterator<'a, S::Cursor<'a>>
    where
        Self: 'a;

    fn get_cf(&self, cf: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let snapshot = self.snapshot()?;
        let family = self.keyspace.family(cf)?;
        snapshot.get(&family.encode(key))
    }

    fn iter_cf(&self, cf: &str) -> Result<Self::Iter<'_>> {
        let snapshot = self.snapshot()?;
        let family = self.keyspace.family(cf)?;

        let mut iter = CfIterator::new(snapshot.cursor()?, family, &self.engine_alive);
        iter.seek(&[])?;
        Ok(iter)
    }

    fn close(&mut self) {
        if self.snapshot.take().is_some() {
            tracing::debug!("Released reader snapshot (request {})", self.request_id);
        }
    }
}

impl<S: Snapshot> Drop for SnapshotReader<S> {
    fn drop(&mut self) {
        self.close();
    }
}
