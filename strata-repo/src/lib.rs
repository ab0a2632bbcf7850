//! Content-addressed deduplication for the strata instruction IR.
//!
//! This crate computes canonical structural digests over the entity graph
//! defined by `strata-instr` and prunes definitions that already exist in an
//! external content-addressed store:
//!
//! - [`accum`]: the tag-prefixed rolling digest accumulator.
//! - [`session`]: identity-numbering tables making digests independent of
//!   storage order and memory addresses.
//! - [`hasher`]: per-object digest computation for functions, global
//!   variables, and aliases.
//! - [`index`]: the read-only digest membership index consulted by the
//!   pruner.
//! - [`pruning`]: the pass reducing already-stored definitions to bare
//!   external references.
//!
//! Two definitions that are structurally equivalent up to consistent
//! renaming of local identifiers produce the same digest with overwhelming
//! probability; any structural difference (opcode, operand order, types,
//! attributes, literal content, or target context) changes it.

pub mod accum;
pub mod hasher;
pub mod index;
pub mod pruning;
pub mod session;

pub use accum::{DigestAccumulator, FieldTag};
pub use hasher::{AliasHasher, FunctionHasher, VariableHasher};
pub use index::{DigestIndex, MemoryIndex};
pub use pruning::{PruneStats, is_repo_triple, prune_module};
pub use session::HashSession;
pub use strata_instr::ticket::{Digest, Ticket};
