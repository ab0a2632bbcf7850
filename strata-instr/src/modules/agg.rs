//! Aggregate value instructions
//!
//! Extraction and insertion of fields inside first-class aggregate values
//! (arrays and structs held in SSA registers, not in memory). Index
//! sequences are constant and step through nested aggregates one level per
//! index, in declared order.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    modules::{
        Instruction,
        operand::{Name, Operand},
    },
    types::Typeref,
};

/// Extract the sub-value at a constant index path of an aggregate.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AExtractValue {
    pub dest: Name,

    /// Type of the extracted sub-value.
    pub ty: Typeref,
    pub aggregate: Operand,
    pub indices: Vec<u32>,
}

impl Instruction for AExtractValue {
    fn operands(&self) -> impl Iterator<Item = &Operand> {
        std::iter::once(&self.aggregate)
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        std::iter::once(&mut self.aggregate)
    }

    fn destination(&self) -> Option<Name> {
        Some(self.dest)
    }

    fn set_destination(&mut self, name: Name) {
        self.dest = name;
    }

    fn destination_type(&self) -> Option<Typeref> {
        Some(self.ty)
    }
}

/// Produce a copy of an aggregate with the sub-value at a constant index
/// path replaced.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AInsertValue {
    pub dest: Name,

    /// Type of the resulting aggregate.
    pub ty: Typeref,
    pub aggregate: Operand,
    pub value: Operand,
    pub indices: Vec<u32>,
}

impl Instruction for AInsertValue {
    fn operands(&self) -> impl Iterator<Item = &Operand> {
        [&self.aggregate, &self.value].into_iter()
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        [&mut self.aggregate, &mut self.value].into_iter()
    }

    fn destination(&self) -> Option<Name> {
        Some(self.dest)
    }

    fn set_destination(&mut self, name: Name) {
        self.dest = name;
    }

    fn destination_type(&self) -> Option<Typeref> {
        Some(self.ty)
    }
}
