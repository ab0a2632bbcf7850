//! Calls, phis, and selection
//!
//! Instructions that don't belong to a single arithmetic family: function
//! invocation (with calling convention, attributes, and operand bundles),
//! control-flow value merging, and conditional selection.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    modules::{
        CallingConvention, Instruction,
        globals::FnAttr,
        operand::{Label, Name, Operand},
    },
    types::Typeref,
};

/// A tagged group of extra operands attached to an [`Invoke`].
///
/// Bundles carry out-of-band values to the callee or to the runtime (e.g.
/// deoptimization state). The bundle name selects the interpretation of its
/// operands.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperandBundle {
    pub name: String,
    pub operands: Vec<Operand>,
}

/// Function call instruction
///
/// The callee is described as an `Operand` to allow dynamic function calls
/// through function pointers as well as direct calls to module globals.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Invoke {
    /// The function to call: usually `Operand::Global`, but may be any
    /// pointer-valued operand for indirect calls.
    pub callee: Operand,

    /// The argument operands to pass to the function.
    pub args: Vec<Operand>,

    /// The destination SSA name for the return value, if any.
    pub dest: Option<Name>,

    /// The return type of the function being called. `None` for `void`
    /// functions.
    pub ty: Option<Typeref>,

    /// Calling convention of the call site. Must match the callee's.
    pub cconv: Option<CallingConvention>,

    /// Call-site attributes.
    pub attrs: Vec<FnAttr>,

    /// Operand bundles attached to the call site.
    pub bundles: Vec<OperandBundle>,
}

impl Instruction for Invoke {
    fn operands(&self) -> impl Iterator<Item = &Operand> {
        std::iter::once(&self.callee)
            .chain(self.args.iter())
            .chain(self.bundles.iter().flat_map(|b| b.operands.iter()))
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        std::iter::once(&mut self.callee)
            .chain(self.args.iter_mut())
            .chain(self.bundles.iter_mut().flat_map(|b| b.operands.iter_mut()))
    }

    fn destination(&self) -> Option<Name> {
        self.dest
    }

    fn set_destination(&mut self, name: Name) {
        // Cannot change a void return to a non-void return
        if self.dest.is_some() {
            self.dest = Some(name);
        }
    }

    fn destination_type(&self) -> Option<Typeref> {
        self.ty
    }
}

/// Phi instruction
///
/// Selects a value based on control flow. Used to merge values coming from
/// different basic blocks; must be placed at the beginning of a basic block.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Phi {
    /// The destination SSA name for the result of the phi instruction.
    pub dest: Name,

    /// The type of the value being selected.
    pub ty: Typeref,

    /// The incoming values and their corresponding predecessor basic blocks.
    pub incoming: Vec<(Label, Operand)>,
}

impl Instruction for Phi {
    fn operands(&self) -> impl Iterator<Item = &Operand> {
        self.incoming.iter().map(|(_, op)| op)
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        self.incoming.iter_mut().map(|(_, op)| op)
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

/// Select instruction
///
/// Selects one of two values based on a condition.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Select {
    /// The destination SSA name for the result of the select instruction.
    pub dest: Name,
    /// The condition operand. Should evaluate to a boolean value.
    pub condition: Operand,
    /// The operand to select if the condition is true.
    pub true_value: Operand,
    /// The operand to select if the condition is false.
    pub false_value: Operand,
    /// The type of the values being selected.
    pub ty: Typeref,
}

impl Instruction for Select {
    fn operands(&self) -> impl Iterator<Item = &Operand> {
        std::iter::once(&self.condition)
            .chain(std::iter::once(&self.true_value))
            .chain(std::iter::once(&self.false_value))
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        std::iter::once(&mut self.condition)
            .chain(std::iter::once(&mut self.true_value))
            .chain(std::iter::once(&mut self.false_value))
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
