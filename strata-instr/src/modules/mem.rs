//! Memory operations
//!
//! Load and store instructions with alignment, volatility, and optional
//! atomic ordering semantics compatible with common language memory models
//! (C++/Java). Stack allocation and pointer arithmetic round out the family.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{
    consts::int::IConst,
    modules::{
        Instruction,
        operand::{Name, Operand},
    },
    types::Typeref,
};

/// Ordering for atomic memory operations.
///
/// Certain atomic instructions take ordering parameters that determine which
/// other atomic instructions on the same address they synchronize with. These
/// semantics implement the Java or C++ memory models; if these descriptions
/// aren't precise enough, check those specs
/// (see specs references on [cppreference](https://en.cppreference.com/w/cpp/atomic/memory_order)).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MemoryOrdering {
    Unordered,
    Monotonic,
    Acq,
    Rel,
    AcqRel,
    SeqCst,
}

impl MemoryOrdering {
    pub fn to_str(&self) -> &'static str {
        match self {
            MemoryOrdering::Unordered => "unordered",
            MemoryOrdering::Monotonic => "monotonic",
            MemoryOrdering::Acq => "acquire",
            MemoryOrdering::Rel => "release",
            MemoryOrdering::AcqRel => "acq_rel",
            MemoryOrdering::SeqCst => "seq_cst",
        }
    }
}

/// Synchronization scope of an atomic memory operation.
///
/// Cross-thread operations synchronize with every other thread of the
/// program; single-thread operations only synchronize with signal handlers
/// on the executing thread.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SyncScope {
    #[default]
    CrossThread,
    SingleThread,
}

/// An inclusive value-range hint attached to a load: the loaded value is
/// known to fall within `[lo, hi]`.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValueRange {
    pub lo: IConst,
    pub hi: IConst,
}

/// Load from memory into a destination SSA name.
///
/// When `volatile` is true, the operation is prevented from being removed or
/// merged by typical optimizations. If an `ordering` is specified, the load
/// is considered atomic with the given ordering.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MLoad {
    pub dest: Name,
    pub ty: Typeref,
    pub addr: Operand,
    pub alignment: Option<u32>,
    pub ordering: Option<MemoryOrdering>,
    pub scope: SyncScope,
    pub volatile: bool,

    /// Optional hint constraining the loaded value.
    pub range: Option<ValueRange>,
}

impl Instruction for MLoad {
    fn operands(&self) -> impl Iterator<Item = &Operand> {
        std::iter::once(&self.addr)
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        std::iter::once(&mut self.addr)
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

/// Store a value to memory.
///
/// When `volatile` is true, the operation is prevented from being removed or
/// merged by typical optimizations. If an `ordering` is specified, the store
/// is considered atomic with the given ordering.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MStore {
    pub addr: Operand,
    pub value: Operand,
    pub alignment: Option<u32>,
    pub ordering: Option<MemoryOrdering>,
    pub scope: SyncScope,
    pub volatile: bool,
}

impl Instruction for MStore {
    fn operands(&self) -> impl Iterator<Item = &Operand> {
        [&self.addr, &self.value].into_iter()
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        [&mut self.addr, &mut self.value].into_iter()
    }
}

/// Stack allocation instruction: reserves `count` elements of type `ty` and
/// yields the address of the reservation.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MAlloca {
    pub dest: Name,
    pub ty: Typeref,
    pub count: Operand,
    pub alignment: Option<u32>,
}

impl Instruction for MAlloca {
    fn operands(&self) -> impl Iterator<Item = &Operand> {
        std::iter::once(&self.count)
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        std::iter::once(&mut self.count)
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

/// Pointer arithmetic instruction: computes the address of a sub-element of
/// an aggregate in memory.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MGetElementPtr {
    pub dest: Name,

    /// The aggregate type the address computation steps through.
    pub source_ty: Typeref,
    pub addr: Operand,
    pub indices: Vec<Operand>,

    /// When true, the computed address is known to stay within the bounds of
    /// the allocated object.
    pub in_bounds: bool,
}

impl Instruction for MGetElementPtr {
    fn operands(&self) -> impl Iterator<Item = &Operand> {
        std::iter::once(&self.addr).chain(self.indices.iter())
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        std::iter::once(&mut self.addr).chain(self.indices.iter_mut())
    }

    fn destination(&self) -> Option<Name> {
        Some(self.dest)
    }

    fn set_destination(&mut self, name: Name) {
        self.dest = name;
    }

    fn destination_type(&self) -> Option<Typeref> {
        None
    }
}
