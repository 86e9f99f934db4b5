//! redb-backed engine
//!
//! All engine keys live in one byte-keyed table; column families are layered
//! on top by the keyspace codec, not by redb tables.

use std::fs;
use std::ops::Bound;
use std::path::{Path, PathBuf};

use redb::{Database, ReadOnlyTable, ReadTransaction, ReadableTable, TableDefinition};

use crate::config::Config;
use crate::error::Result;

use super::{Cursor, Engine, Snapshot, WriteTxn};

/// The single flat table holding every engine key
const KV_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("kv");

type KvTable = ReadOnlyTable<&'static [u8], &'static [u8]>;

/// Durable engine stored in one redb database file
pub struct RedbEngine {
    db: Database,
}

impl RedbEngine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const DB_FILENAME: &'static str = "kv.redb";

    /// Path of the database file for a given data directory
    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::DB_FILENAME)
    }
}

impl Engine for RedbEngine {
    type Snapshot = RedbSnapshot;
    type WriteTxn = RedbWriteTxn;

    /// On open:
    /// 1. Create the data directory if allowed
    /// 2. Open/create the database file
    /// 3. Make sure the kv table exists so snapshots can always open it
    fn open(config: &Config) -> Result<Self> {
        if config.create_dir {
            fs::create_dir_all(&config.data_dir)?;
        }

        let path = Self::db_path(&config.data_dir);
        let db = Database::builder()
            .set_cache_size(config.cache_size)
            .create(&path)?;

        let txn = db.begin_write()?;
        txn.open_table(KV_TABLE)?;
        txn.commit()?;

        tracing::debug!("Opened redb database at {}", path.display());

        Ok(Self { db })
    }

    fn begin_read(&self) -> Result<RedbSnapshot> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(KV_TABLE)?;
        Ok(RedbSnapshot { table, _txn: txn })
    }

    fn begin_write(&self) -> Result<RedbWriteTxn> {
        Ok(RedbWriteTxn {
            txn: self.db.begin_write()?,
        })
    }

    fn close(self) -> Result<()> {
        // redb persists on every commit; dropping the handle releases the file lock.
        drop(self.db);
        Ok(())
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// A redb read transaction with the kv table already opened
pub struct RedbSnapshot {
    table: KvTable,
    _txn: ReadTransaction,
}

impl Snapshot for RedbSnapshot {
    type Cursor<'a> = RedbCursor<'a>;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn cursor(&self) -> Result<RedbCursor<'_>> {
        Ok(RedbCursor {
            table: &self.table,
            current: None,
        })
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// Cursor over a snapshot's kv table
///
/// Holds the current entry by value and re-enters the B-tree on each step,
/// so it never borrows a redb range across calls.
pub struct RedbCursor<'a> {
    table: &'a KvTable,
    current: Option<(Vec<u8>, Vec<u8>)>,
}

impl RedbCursor<'_> {
    /// First entry at or after `lower`
    fn first_from(&self, lower: Bound<&[u8]>) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        let mut range = self.table.range::<&[u8]>((lower, Bound::Unbounded))?;
        match range.next() {
            Some(entry) => {
                let (key, value) = entry?;
                Ok(Some((key.value().to_vec(), value.value().to_vec())))
            }
            None => Ok(None),
        }
    }
}

impl Cursor for RedbCursor<'_> {
    fn seek(&mut self, key: &[u8]) -> Result<()> {
        self.current = self.first_from(Bound::Included(key))?;
        Ok(())
    }

    fn valid(&self) -> bool {
        self.current.is_some()
    }

    fn next(&mut self) -> Result<()> {
        let Some((key, _)) = self.current.take() else {
            return Ok(());
        };
        self.current = self.first_from(Bound::Excluded(key.as_slice()))?;
        Ok(())
    }

    fn key(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(k, _)| k.as_slice())
    }

    fn value(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(_, v)| v.as_slice())
    }
}

// =============================================================================
// Write Transaction
// =============================================================================

/// A redb write transaction
pub struct RedbWriteTxn {
    txn: redb::WriteTransaction,
}

impl WriteTxn for RedbWriteTxn {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut table = self.txn.open_table(KV_TABLE)?;
        table.insert(key, value)?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        let mut table = self.txn.open_table(KV_TABLE)?;
        table.remove(key)?;
        Ok(())
    }

    fn commit(self) -> Result<()> {
        self.txn.commit()?;
        Ok(())
    }

    fn discard(self) -> Result<()> {
        self.txn.abort()?;
        Ok(())
    }
}
