//! Modification definitions
//!
//! A write batch is an ordered list of these.

use serde::{Deserialize, Serialize};

/// A single mutation of one logical key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modify {
    /// Put a key-value pair into a column family
    Put {
        cf: String,
        key: Vec<u8>,
        value: Vec<u8>,
    },

    /// Delete a key from a column family
    Delete { cf: String, key: Vec<u8> },
}

impl Modify {
    pub fn put(cf: impl Into<String>, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Modify::Put {
            cf: cf.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(cf: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Modify::Delete {
            cf: cf.into(),
            key: key.into(),
        }
    }

    /// Column family this mutation targets
    pub fn cf(&self) -> &str {
        match self {
            Modify::Put { cf, .. } | Modify::Delete { cf, .. } => cf,
        }
    }

    /// Raw key this mutation targets
    pub fn key(&self) -> &[u8] {
        match self {
            Modify::Put { key, .. } | Modify::Delete { key, .. } => key,
        }
    }

    /// Value for puts, `None` for deletes
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            Modify::Put { value, .. } => Some(value),
            Modify::Delete { .. } => None,
        }
    }
}
