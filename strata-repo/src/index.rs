//! Digest membership index
//!
//! The pruning pass consults an external, persistent set of known digests.
//! From this crate's perspective the store is read-only and exposes exactly
//! one operation: a membership test. Population and insertion of new
//! canonical entries is owned by a separate collaborator.
use std::collections::BTreeSet;

use strata_instr::ticket::Digest;

/// Read-only membership test over the set of known digests.
pub trait DigestIndex {
    /// Check whether `digest` names a definition already held by the store.
    fn exists(&self, digest: &Digest) -> bool;
}

/// In-memory digest index.
///
/// Sufficient for tests and for driving the pruner against a pre-loaded
/// snapshot of a persistent store.
#[derive(Debug, Default, Clone)]
pub struct MemoryIndex {
    digests: BTreeSet<Digest>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `digest` as known. Returns false if it was already present.
    pub fn insert(&mut self, digest: Digest) -> bool {
        self.digests.insert(digest)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

impl DigestIndex for MemoryIndex {
    fn exists(&self, digest: &Digest) -> bool {
        self.digests.contains(digest)
    }
}
