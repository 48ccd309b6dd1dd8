// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Generation records and staleness tracking
//!
//! A store assigns a new [`Generation`] every time it replaces an object's
//! content. Generations are totally ordered; a larger value is newer.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, totally ordered version marker assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An observation of one generation of a named object.
///
/// Returned by the store when a generation is created, and handed back to a
/// proxy through `note_latest` when a newer generation is discovered
/// elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub name: String,
    pub generation: Generation,
    /// Length in bytes of this generation's content
    pub size: u64,
}

impl ObjectRecord {
    #[must_use]
    pub fn new<N: Into<String>>(name: N, generation: Generation, size: u64) -> Self {
        Self {
            name: name.into(),
            generation,
            size,
        }
    }
}

impl fmt::Display for ObjectRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} generation={} size={}",
            self.name, self.generation, self.size
        )
    }
}

/// Outcome of offering a record to a [`GenerationTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The record was strictly newer and is now tracked
    Accepted,
    /// The record was equal to or older than the tracked one
    Ignored,
}

/// Holds the newest known record for one object name.
#[derive(Debug, Clone)]
pub struct GenerationTracker {
    name: String,
    latest: Option<ObjectRecord>,
}

impl GenerationTracker {
    #[must_use]
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            latest: None,
        }
    }

    #[must_use]
    pub fn latest(&self) -> Option<&ObjectRecord> {
        self.latest.as_ref()
    }

    #[must_use]
    pub fn generation(&self) -> Option<Generation> {
        self.latest.as_ref().map(|r| r.generation)
    }

    /// Offer a record observed outside this tracker.
    ///
    /// Newest observed wins; there is no merging of concurrent writers. A
    /// record for another object is rejected without touching state.
    pub fn observe(&mut self, candidate: ObjectRecord) -> Result<Observation> {
        if candidate.name != self.name {
            return Err(Error::object_mismatch(&self.name, candidate.name));
        }
        match self.generation() {
            Some(current) if candidate.generation <= current => Ok(Observation::Ignored),
            _ => {
                self.latest = Some(candidate);
                Ok(Observation::Accepted)
            }
        }
    }

    /// Adopt a record produced by our own upload.
    ///
    /// The store just issued it, so it replaces the tracked record without
    /// the staleness test.
    pub fn adopt(&mut self, record: ObjectRecord) {
        self.latest = Some(record);
    }
}
