//! Hashing session state
//!
//! Identity-numbering tables realizing alpha-equivalence: entities are
//! identified by the order in which a canonical traversal first meets them,
//! never by storage order or memory address, so digests are reproducible
//! across separate runs.
//!
//! [`HashSession`] is the explicit context object passed into every hash
//! computation. It owns the global numbering table, which may span multiple
//! hash computations (e.g. hashing every function of a module) so that
//! references to the same global object contribute the same serial number to
//! each digest. The local table ([`LocalNumbering`]) is created fresh for
//! every function-level computation; carrying stale numbering entries across
//! unrelated entities silently corrupts digests.
use std::collections::BTreeMap;

use strata_instr::modules::operand::{Label, Name};
use uuid::Uuid;

/// Identity of a function-local value: an SSA name or a basic block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LocalId {
    Name(Name),
    Block(Label),
}

impl From<Name> for LocalId {
    fn from(name: Name) -> Self {
        LocalId::Name(name)
    }
}

impl From<Label> for LocalId {
    fn from(label: Label) -> Self {
        LocalId::Block(label)
    }
}

/// First-use serial numbering of function-local identities.
///
/// Scoped to one hashing computation (one function at a time); assignment
/// order is first-use order during the canonical traversal.
#[derive(Debug, Default)]
pub struct LocalNumbering {
    numbers: BTreeMap<LocalId, u32>,
}

impl LocalNumbering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the serial number previously assigned to `id`, or assign the
    /// next sequential number (the current table size) on first use.
    pub fn number(&mut self, id: LocalId) -> u32 {
        let next = self.numbers.len() as u32;
        *self.numbers.entry(id).or_insert(next)
    }

    /// Forget every assignment.
    pub fn clear(&mut self) {
        self.numbers.clear();
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

/// Session-wide numbering of global object identities.
///
/// Shared across every hash computation of one session so that two functions
/// referencing the *same* global produce matching contributions, while
/// references to two *different* globals remain distinguishable even when
/// those globals are structurally identical to each other: identity, not
/// structure, is numbered here.
#[derive(Debug, Default)]
pub struct HashSession {
    global_numbers: BTreeMap<Uuid, u32>,
}

impl HashSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or assign the serial number of the global object `uuid`.
    pub fn global_number(&mut self, uuid: Uuid) -> u32 {
        let next = self.global_numbers.len() as u32;
        *self.global_numbers.entry(uuid).or_insert(next)
    }

    /// Forget every assignment, starting a fresh session.
    pub fn reset(&mut self) {
        self.global_numbers.clear();
    }
}
