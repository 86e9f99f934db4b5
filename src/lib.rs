//! # cfstore
//!
//! The local storage layer of a single-node key-value service:
//! - Column families emulated by key prefixes over one flat keyspace
//! - Snapshot readers with point lookups and family-scoped iteration
//! - Atomic, all-or-nothing write batches
//! - Explicit start/stop lifecycle around one embedded engine
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Request Layer (caller)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  StandaloneStorage                           │
//! │           (start / stop / reader / write)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌──────────────┐         ┌──────────────┐
//!   │SnapshotReader│         │  apply_batch │
//!   │ + CfIterator │         │  (one txn)   │
//!   └──────┬───────┘         └──────┬───────┘
//!          │       Keyspace         │
//!          │   (family ⇄ engine)    │
//!          └────────────┬───────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │    Engine    │
//!               │    (redb)    │
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod keyspace;
pub mod engine;
pub mod iterator;
pub mod reader;
pub mod modify;
pub mod batch;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use config::{Config, CF_DEFAULT, CF_LOCK, CF_WRITE};
pub use iterator::{KvIterator, KvPair};
pub use keyspace::Keyspace;
pub use modify::Modify;
pub use reader::StorageReader;
pub use storage::{RequestContext, StandaloneStorage, Storage, StorageState};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cfstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
