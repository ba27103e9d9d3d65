//! Seed lookup context mapping design entities to stored base seeds.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, ErrorInfo};

/// Read-only access to previously chosen base seeds.
///
/// Generation passes take an implementation as an explicit argument; there is
/// no ambient store. Lookups must stay side-effect free so that concurrent
/// generation of independent sections stays deterministic.
pub trait SeedLookup {
    /// Returns the stored base seed for `id`, if any.
    fn seed_for(&self, id: &str) -> Option<u64>;
}

/// Stored seed for one section or block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedEntry<'a> {
    /// Identifier of the section or list the seed belongs to.
    pub id: &'a str,
    /// Base seed.
    pub value: u64,
}

/// Owned `{id, value}` record, as persisted in registry files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRecord {
    /// Identifier of the section or list the seed belongs to.
    pub id: String,
    /// Base seed.
    pub value: u64,
}

/// In-memory seed registry ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedRegistry {
    entries: BTreeMap<String, u64>,
}

impl SeedRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from persisted records; later duplicates win.
    pub fn from_records(records: impl IntoIterator<Item = SeedRecord>) -> Self {
        let mut registry = Self::new();
        registry.record_all(records);
        registry
    }

    /// Stores `value` as the base seed for `id`, replacing any previous entry.
    pub fn insert(&mut self, id: impl Into<String>, value: u64) -> Option<u64> {
        self.entries.insert(id.into(), value)
    }

    /// Returns the stored seed for `id`.
    pub fn get(&self, id: &str) -> Option<u64> {
        self.entries.get(id).copied()
    }

    /// Stores every record, typically the seeds reported by a generation pass.
    pub fn record_all(&mut self, records: impl IntoIterator<Item = SeedRecord>) {
        for record in records {
            self.entries.insert(record.id, record.value);
        }
    }

    /// Number of stored seeds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no seeds.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the stored entries in id order.
    pub fn entries(&self) -> impl Iterator<Item = SeedEntry<'_>> + '_ {
        self.entries.iter().map(|(id, value)| SeedEntry {
            id: id.as_str(),
            value: *value,
        })
    }

    /// Parses a JSON array of `{id, value}` records.
    pub fn from_json(json: &str) -> Result<Self, DesignError> {
        let records: Vec<SeedRecord> = serde_json::from_str(json).map_err(|err| {
            DesignError::Serde(ErrorInfo::new("seed-registry-deserialize", err.to_string()))
        })?;
        Ok(Self::from_records(records))
    }

    /// Serialises the registry as a JSON array of `{id, value}` records.
    pub fn to_json(&self) -> Result<String, DesignError> {
        let records: Vec<SeedEntry<'_>> = self.entries().collect();
        serde_json::to_string_pretty(&records).map_err(|err| {
            DesignError::Serde(ErrorInfo::new("seed-registry-serialize", err.to_string()))
        })
    }

    /// Loads a registry file. A missing file yields an empty registry.
    pub fn load(path: &Path) -> Result<Self, DesignError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = fs::read_to_string(path).map_err(|err| {
            DesignError::Serde(
                ErrorInfo::new("seed-registry-read", "failed to read seed registry")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        Self::from_json(&json)
    }

    /// Writes the registry file, replacing previous contents.
    pub fn save(&self, path: &Path) -> Result<(), DesignError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|err| {
            DesignError::Serde(
                ErrorInfo::new("seed-registry-write", "failed to write seed registry")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })
    }
}

impl SeedLookup for SeedRegistry {
    fn seed_for(&self, id: &str) -> Option<u64> {
        self.get(id)
    }
}

impl<T: SeedLookup + ?Sized> SeedLookup for &T {
    fn seed_for(&self, id: &str) -> Option<u64> {
        (**self).seed_for(id)
    }
}

/// Outcome of resolving a base seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSeed {
    /// Base seed to use.
    pub value: u64,
    /// `true` when the seed came from the lookup, `false` when freshly drawn.
    pub stored: bool,
}

/// Returns the stored seed for `id` or draws a fresh one in `[0, fallback_max]`.
pub fn resolve_seed(
    lookup: &dyn SeedLookup,
    id: &str,
    fallback_max: u64,
    rng: &mut dyn RngCore,
) -> ResolvedSeed {
    match lookup.seed_for(id) {
        Some(value) => ResolvedSeed {
            value,
            stored: true,
        },
        None => ResolvedSeed {
            value: rng.gen_range(0..=fallback_max),
            stored: false,
        },
    }
}
