//! Write Batch Applier
//!
//! Applies an ordered list of modifications as one engine transaction.
//!
//! ## Steps
//! 1. Open a read-write transaction
//! 2. Encode and stage every modification in order
//! 3. On the first failure, discard the transaction and return that error
//! 4. Otherwise commit; a failed commit is returned as-is, never retried
//!
//! Later modifications of the same key overwrite earlier ones inside the
//! transaction, so the last write in the batch wins.

use crate::engine::{Engine, WriteTxn};
use crate::error::Result;
use crate::keyspace::Keyspace;
use crate::modify::Modify;

/// Apply `batch` atomically: either every modification becomes visible or none does
pub fn apply_batch<E: Engine>(engine: &E, keyspace: &Keyspace, batch: &[Modify]) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let mut txn = engine.begin_write()?;

    if let Err(e) = stage(&mut txn, keyspace, batch) {
        tracing::warn!("Aborting batch of {} modifications: {}", batch.len(), e);
        if let Err(discard_err) = txn.discard() {
            tracing::warn!("Discarding aborted batch failed: {}", discard_err);
        }
        return Err(e);
    }

    txn.commit()?;
    tracing::debug!("Committed batch of {} modifications", batch.len());

    Ok(())
}

/// Stage every modification into `txn`, stopping at the first error
fn stage<T: WriteTxn>(txn: &mut T, keyspace: &Keyspace, batch: &[Modify]) -> Result<()> {
    for modify in batch {
        let family = keyspace.family(modify.cf())?;
        let engine_key = family.encode(modify.key());

        match modify {
            Modify::Put { value, .. } => {
                tracing::trace!("put cf={} key_len={}", family.name(), modify.key().len());
                txn.set(&engine_key, value)?;
            }
            Modify::Delete { .. } => {
                tracing::trace!("delete cf={} key_len={}", family.name(), modify.key().len());
                txn.delete(&engine_key)?;
            }
        }
    }

    Ok(())
}
