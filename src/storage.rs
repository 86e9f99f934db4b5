//! Storage Facade
//!
//! Owns the engine for its whole running lifetime and is the only component
//! that opens or closes it.
//!
//! ## Lifecycle
//! ```text
//!   Unopened ──start()──▶ Running ──stop()──▶ Stopped
//! ```
//!
//! ## Concurrency Model
//! - `reader()` and `write()` hold the lifecycle lock in shared mode, so any
//!   number of them run concurrently
//! - Concurrent writes are ordered by the engine's own transaction admission;
//!   no lock of ours spans a batch exclusively
//! - `stop()` takes the lifecycle lock exclusively and waits for in-flight
//!   calls before closing the engine

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::batch::apply_batch;
use crate::config::Config;
use crate::engine::{Engine, RedbEngine};
use crate::error::{Result, StoreError};
use crate::keyspace::Keyspace;
use crate::modify::Modify;
use crate::reader::{SnapshotReader, StorageReader};

/// Lifecycle state of a storage instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageState {
    Unopened,
    Running,
    Stopped,
}

impl fmt::Display for StorageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageState::Unopened => "unopened",
            StorageState::Running => "running",
            StorageState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Per-request metadata passed down from the request layer
///
/// Only used to tag log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: u64,
}

impl RequestContext {
    pub fn new(request_id: u64) -> Self {
        Self { request_id }
    }
}

/// Storage capability consumed by the request layer
pub trait Storage {
    type Reader: StorageReader;

    /// Open the engine. Fails if the storage was started before.
    fn start(&self) -> Result<()>;

    /// Close the engine. Repeated calls are no-ops.
    fn stop(&self) -> Result<()>;

    /// Take a new snapshot reader
    fn reader(&self, ctx: &RequestContext) -> Result<Self::Reader>;

    /// Apply a batch atomically
    fn write(&self, ctx: &RequestContext, batch: &[Modify]) -> Result<()>;
}

/// Everything that exists only while the storage is running
struct Running<E> {
    engine: E,
    keyspace: Arc<Keyspace>,
    /// Shared with every reader; cleared on stop
    alive: Arc<AtomicBool>,
}

enum Lifecycle<E> {
    Unopened,
    Running(Running<E>),
    Stopped,
}

impl<E> Lifecycle<E> {
    fn state(&self) -> StorageState {
        match self {
            Lifecycle::Unopened => StorageState::Unopened,
            Lifecycle::Running(_) => StorageState::Running,
            Lifecycle::Stopped => StorageState::Stopped,
        }
    }
}

/// Single-node storage: one local engine, no replication
pub struct StandaloneStorage<E: Engine = RedbEngine> {
    config: Config,
    lifecycle: RwLock<Lifecycle<E>>,
}

impl StandaloneStorage {
    /// Create an unopened storage backed by redb
    pub fn new(config: Config) -> Self {
        Self::with_engine(config)
    }
}

impl<E: Engine> StandaloneStorage<E> {
    /// Create an unopened storage backed by engine `E`
    pub fn with_engine(config: Config) -> Self {
        Self {
            config,
            lifecycle: RwLock::new(Lifecycle::Unopened),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> StorageState {
        self.lifecycle.read().state()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `f` against the running engine, or fail with `NotRunning`
    fn with_running<T>(&self, f: impl FnOnce(&Running<E>) -> Result<T>) -> Result<T> {
        let lifecycle = self.lifecycle.read();
        match &*lifecycle {
            Lifecycle::Running(running) => f(running),
            other => Err(StoreError::NotRunning {
                state: other.state(),
            }),
        }
    }
}

impl<E: Engine> Storage for StandaloneStorage<E> {
    type Reader = SnapshotReader<E::Snapshot>;

    /// On start:
    /// 1. Validate the config
    /// 2. Build the keyspace codec against the configured families
    /// 3. Open the engine
    fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.write();
        match &*lifecycle {
            Lifecycle::Unopened => {}
            Lifecycle::Running(_) => return Err(StoreError::AlreadyStarted),
            Lifecycle::Stopped => {
                return Err(StoreError::NotRunning {
                    state: StorageState::Stopped,
                })
            }
        }

        self.config.validate()?;
        let keyspace = Keyspace::new(&self.config.column_families)?;
        let engine = E::open(&self.config).map_err(|e| {
            tracing::error!(
                "Failed to open engine at {}: {}",
                self.config.data_dir.display(),
                e
            );
            e
        })?;

        tracing::info!(
            "Storage started at {} with column families [{}]",
            self.config.data_dir.display(),
            keyspace.names().collect::<Vec<_>>().join(", ")
        );

        *lifecycle = Lifecycle::Running(Running {
            engine,
            keyspace: Arc::new(keyspace),
            alive: Arc::new(AtomicBool::new(true)),
        });

        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.write();
        if !matches!(*lifecycle, Lifecycle::Running(_)) {
            tracing::debug!("Stop ignored, storage is {}", lifecycle.state());
            return Ok(());
        }

        if let Lifecycle::Running(running) = std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            running.alive.store(false, Ordering::Release);
            running.engine.close()?;
            tracing::info!("Storage stopped");
        }

        Ok(())
    }

    fn reader(&self, ctx: &RequestContext) -> Result<Self::Reader> {
        self.with_running(|running| {
            let snapshot = running.engine.begin_read()?;
            tracing::debug!("Opened reader snapshot (request {})", ctx.request_id);
            Ok(SnapshotReader::new(
                snapshot,
                Arc::clone(&running.keyspace),
                Arc::clone(&running.alive),
                ctx.request_id,
            ))
        })
    }

    fn write(&self, ctx: &RequestContext, batch: &[Modify]) -> Result<()> {
        self.with_running(|running| {
            tracing::debug!(
                "Writing batch of {} modifications (request {})",
                batch.len(),
                ctx.request_id
            );
            apply_batch(&running.engine, &running.keyspace, batch)
        })
    }
}

impl<E: Engine> Drop for StandaloneStorage<E> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("Error closing engine on drop: {}", e);
        }
    }
}
