//! Keyspace Codec
//!
//! Multiplexes several logical column families onto the engine's single
//! flat, byte-ordered keyspace.
//!
//! ## Encoding
//! ```text
//! ┌──────────────────────────┬─────────────────────────────┐
//! │ Tag: family name + '_'   │        Raw key bytes        │
//! └──────────────────────────┴─────────────────────────────┘
//! ```
//!
//! Every family owns the contiguous engine region that starts with its tag.
//! Within that region engine byte order equals raw key byte order, so a
//! prefix-bounded cursor walks one family in key order.
//!
//! The codec is built once against the configured family set. Construction
//! rejects any set where one tag is a prefix of another, since the region of
//! the shorter tag would then swallow keys of the longer one.

use crate::error::{Result, StoreError};

/// Byte appended to a family name to form its tag
pub const CF_SEPARATOR: u8 = b'_';

/// The validated set of column families and their engine tags
#[derive(Debug, Clone)]
pub struct Keyspace {
    families: Vec<FamilyTag>,
}

#[derive(Debug, Clone)]
struct FamilyTag {
    name: String,
    tag: Vec<u8>,
}

impl Keyspace {
    /// Build the codec for a closed set of family names
    ///
    /// Fails with `StoreError::Config` when the set is empty, a name is
    /// empty or repeated, or one family's tag is a prefix of another's.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut families: Vec<FamilyTag> = Vec::new();

        for name in names {
            let name = name.as_ref();
            if name.is_empty() {
                return Err(StoreError::Config(
                    "column family name must not be empty".to_string(),
                ));
            }
            if families.iter().any(|f| f.name == name) {
                return Err(StoreError::Config(format!(
                    "column family `{}` configured twice",
                    name
                )));
            }

            let mut tag = Vec::with_capacity(name.len() + 1);
            tag.extend_from_slice(name.as_bytes());
            tag.push(CF_SEPARATOR);

            if let Some(other) = families
                .iter()
                .find(|f| f.tag.starts_with(&tag) || tag.starts_with(&f.tag))
            {
                return Err(StoreError::Config(format!(
                    "column families `{}` and `{}` have overlapping key prefixes",
                    other.name, name
                )));
            }

            families.push(FamilyTag {
                name: name.to_string(),
                tag,
            });
        }

        if families.is_empty() {
            return Err(StoreError::Config(
                "at least one column family must be configured".to_string(),
            ));
        }

        Ok(Self { families })
    }

    /// Resolve a family name from a request
    pub fn family(&self, name: &str) -> Result<ColumnFamily<'_>> {
        self.families
            .iter()
            .find(|f| f.name == name)
            .map(|f| ColumnFamily {
                name: &f.name,
                tag: &f.tag,
            })
            .ok_or_else(|| StoreError::UnknownColumnFamily(name.to_string()))
    }

    /// Encode a logical key into an engine key
    pub fn encode(&self, family: &str, key: &[u8]) -> Result<Vec<u8>> {
        Ok(self.family(family)?.encode(key))
    }

    /// Split an engine key back into (family, raw key)
    ///
    /// Returns `None` for keys outside every configured family's region.
    pub fn decode<'k>(&self, engine_key: &'k [u8]) -> Option<(&str, &'k [u8])> {
        // At most one tag can match: no tag is a prefix of another.
        self.families.iter().find_map(|f| {
            engine_key
                .strip_prefix(f.tag.as_slice())
                .map(|key| (f.name.as_str(), key))
        })
    }

    /// Configured family names, in configuration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(|f| f.name.as_str())
    }
}

/// A resolved column family, borrowed from its `Keyspace`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnFamily<'a> {
    name: &'a str,
    tag: &'a [u8],
}

impl<'a> ColumnFamily<'a> {
    /// Family name
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Engine key prefix bounding this family's region
    pub fn prefix(&self) -> &'a [u8] {
        self.tag
    }

    /// `tag || key`
    pub fn encode(&self, key: &[u8]) -> Vec<u8> {
        let mut engine_key = Vec::with_capacity(self.tag.len() + key.len());
        engine_key.extend_from_slice(self.tag);
        engine_key.extend_from_slice(key);
        engine_key
    }

    /// Strip this family's tag, or `None` if the key lies outside the region
    pub fn decode<'k>(&self, engine_key: &'k [u8]) -> Option<&'k [u8]> {
        engine_key.strip_prefix(self.tag)
    }

    /// Whether an engine key lies inside this family's region
    pub fn contains(&self, engine_key: &[u8]) -> bool {
        engine_key.starts_with(self.tag)
    }
}
