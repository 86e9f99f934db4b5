//! Engine Module
//!
//! The capability this crate consumes from the embedded key-value engine.
//!
//! ## Responsibilities
//! - Open/close a durable, ordered keyspace of flat byte keys
//! - Hand out point-in-time snapshots for reads
//! - Hand out read-write transactions that commit or discard as a unit
//!
//! The engine's own internals (paging, durability, compaction) are not
//! modelled here. `RedbEngine` is the production implementation; anything
//! else implementing these traits can stand in for it.

mod redb_engine;

use crate::config::Config;
use crate::error::Result;

pub use redb_engine::{RedbCursor, RedbEngine, RedbSnapshot, RedbWriteTxn};

/// An embedded, ordered, snapshot-isolated key-value engine
///
/// ## Concurrency
/// - Snapshots are independent and may be used from any thread
/// - Write transactions are serialized by the engine itself; callers do
///   not hold any lock of their own across a transaction
pub trait Engine: Send + Sync + Sized + 'static {
    /// Read-only view pinned at creation time
    type Snapshot: Snapshot;

    /// Read-write transaction
    type WriteTxn: WriteTxn;

    /// Open or create the engine under `config.data_dir`
    fn open(config: &Config) -> Result<Self>;

    /// Take a consistent point-in-time snapshot
    fn begin_read(&self) -> Result<Self::Snapshot>;

    /// Begin a read-write transaction (blocks while another writer is active)
    fn begin_write(&self) -> Result<Self::WriteTxn>;

    /// Close the engine, flushing anything it still buffers
    fn close(self) -> Result<()>;
}

/// A point-in-time view of the engine keyspace
pub trait Snapshot: Send + 'static {
    /// Ordered cursor borrowing this snapshot
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Point lookup; `Ok(None)` when the key is absent
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Create an unpositioned cursor; call `seek` before reading from it
    fn cursor(&self) -> Result<Self::Cursor<'_>>;
}

/// An ordered cursor over engine keys
pub trait Cursor {
    /// Position at the first entry whose key is >= `key`
    fn seek(&mut self, key: &[u8]) -> Result<()>;

    /// Whether the cursor currently sits on an entry
    fn valid(&self) -> bool;

    /// Advance to the next entry (no-op once exhausted)
    fn next(&mut self) -> Result<()>;

    /// Key at the current position, `None` when not valid
    fn key(&self) -> Option<&[u8]>;

    /// Value at the current position, `None` when not valid
    fn value(&self) -> Option<&[u8]>;
}

/// A read-write engine transaction
///
/// Dropping a transaction without calling `commit` discards it.
pub trait WriteTxn {
    /// Insert or overwrite a key
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove a key (removing an absent key is not an error)
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Make every staged mutation visible atomically
    fn commit(self) -> Result<()>;

    /// Throw away every staged mutation
    fn discard(self) -> Result<()>;
}
