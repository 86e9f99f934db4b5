//! Column-Family Iterator
//!
//! Scopes an engine cursor to one family's key region and strips the family
//! tag from the keys it returns.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::Cursor;
use crate::error::{Result, StoreError};
use crate::keyspace::ColumnFamily;

/// A decoded key-value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPair {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Ordered, seekable iteration over logical keys
pub trait KvIterator {
    /// Position at the first entry with key >= `start`
    fn seek(&mut self, start: &[u8]) -> Result<()>;

    /// Whether the iterator sits on an entry
    fn valid(&self) -> bool;

    /// Advance one entry; a no-op once exhausted
    fn next(&mut self) -> Result<()>;

    /// Current key. Errors with `InvalidIterator` when not valid.
    fn key(&self) -> Result<&[u8]>;

    /// Current value. Errors with `InvalidIterator` when not valid.
    fn value(&self) -> Result<&[u8]>;
}

/// Iterator over one column family of a snapshot
///
/// Borrows the reader that created it, so the reader cannot be closed
/// while the iterator is alive. If the owning storage stops the engine
/// first, every call that touches data fails with `EngineStopped`.
pub struct CfIterator<'a, C> {
    cursor: C,
    family: ColumnFamily<'a>,
    engine_alive: &'a AtomicBool,
}

impl<'a, C: Cursor> CfIterator<'a, C> {
    pub(crate) fn new(cursor: C, family: ColumnFamily<'a>, engine_alive: &'a AtomicBool) -> Self {
        Self {
            cursor,
            family,
            engine_alive,
        }
    }

    /// Name of the family this iterator walks
    pub fn cf(&self) -> &str {
        self.family.name()
    }

    /// Current entry as an owned pair
    pub fn item(&self) -> Result<KvPair> {
        Ok(KvPair {
            key: self.key()?.to_vec(),
            value: self.value()?.to_vec(),
        })
    }

    fn ensure_engine(&self) -> Result<()> {
        if self.engine_alive.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::EngineStopped)
        }
    }
}

impl<C: Cursor> KvIterator for CfIterator<'_, C> {
    fn seek(&mut self, start: &[u8]) -> Result<()> {
        self.ensure_engine()?;
        self.cursor.seek(&self.family.encode(start))
    }

    fn valid(&self) -> bool {
        // Leaving the family's region counts as exhaustion.
        self.cursor
            .key()
            .is_some_and(|engine_key| self.family.contains(engine_key))
    }

    fn next(&mut self) -> Result<()> {
        self.ensure_engine()?;
        if !self.valid() {
            return Ok(());
        }
        self.cursor.next()
    }

    fn key(&self) -> Result<&[u8]> {
        self.ensure_engine()?;
        self.cursor
            .key()
            .and_then(|engine_key| self.family.decode(engine_key))
            .ok_or(StoreError::InvalidIterator)
    }

    fn value(&self) -> Result<&[u8]> {
        self.ensure_engine()?;
        if !self.valid() {
            return Err(StoreError::InvalidIterator);
        }
        self.cursor.value().ok_or(StoreError::InvalidIterator)
    }
}
