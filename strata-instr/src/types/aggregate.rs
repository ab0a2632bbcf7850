//! Aggregate types
//!
//! Composite types built from `Typeref` references stored in the central
//! `TypeRegistry`:
//! - `ArrayType`: a fixed-size array of elements referenced by `Typeref`.
//! - `StructType`: an ordered sequence of field `Typeref`s.
//!
//! Because fields are `Typeref`s rather than inline types, aggregates may
//! reference themselves (directly or through other aggregates). Consumers
//! that recurse through aggregate fields must therefore guard against cycles.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::Typeref;

/// Array type: element typeref + element count.
///
/// The number of elements MUST be known at compile time. This is inadequate
/// for representing dynamically sized arrays.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrayType {
    pub elem: Typeref,
    pub num_elements: u64,
}

/// Structure type: an ordered list of field typerefs.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StructType {
    pub fields: Vec<Typeref>,

    /// Packed structs have one-byte alignment with no padding between fields.
    pub packed: bool,
}
