//! Integer instructions
//!
//! Arithmetic, comparisons, shifts, and bitwise operations over integer
//! values. Each instruction carries its destination `Name`, a `Typeref`, and
//! its input operands. Overflow and signedness where relevant are explicit
//! parameters of the instruction.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::{
    modules::{
        Instruction,
        operand::{Name, Operand},
    },
    types::Typeref,
};

/// Overflow policies for integer operations
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverflowPolicy {
    /// Wrap around on overflow
    Wrap,
    /// Trap on overflow
    Trap,
    /// Saturate to the maximum or minimum value on overflow
    Saturate,
}

/// Signedness for integer operations
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IntegerSignedness {
    Signed,
    Unsigned,
}

impl IntegerSignedness {
    /// Creates an [`IntegerSignedness`] from its string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        IntegerSignedness::iter().find(|op| op.to_str() == s)
    }

    /// Returns the string representation of the [`IntegerSignedness`].
    pub fn to_str(&self) -> &'static str {
        match self {
            IntegerSignedness::Signed => "signed",
            IntegerSignedness::Unsigned => "unsigned",
        }
    }
}

/// Integer comparison operations
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ICmpVariant {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Unsigned greater than
    Ugt,
    /// Unsigned greater than or equal
    Uge,
    /// Unsigned less than
    Ult,
    /// Unsigned less than or equal
    Ule,
    /// Signed greater than
    Sgt,
    /// Signed greater than or equal
    Sge,
    /// Signed less than
    Slt,
    /// Signed less than or equal
    Sle,
}

impl ICmpVariant {
    /// Creates an [`ICmpVariant`] from its string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        ICmpVariant::iter().find(|op| op.to_str() == s)
    }

    /// Returns the string representation of the [`ICmpVariant`].
    pub fn to_str(&self) -> &'static str {
        match self {
            ICmpVariant::Eq => "eq",
            ICmpVariant::Ne => "ne",
            ICmpVariant::Ugt => "ugt",
            ICmpVariant::Uge => "uge",
            ICmpVariant::Ult => "ult",
            ICmpVariant::Ule => "ule",
            ICmpVariant::Sgt => "sgt",
            ICmpVariant::Sge => "sge",
            ICmpVariant::Slt => "slt",
            ICmpVariant::Sle => "sle",
        }
    }
}

/// Integer shift operations disambiguation
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IShiftVariant {
    /// Logical left shift
    Lsl,
    /// Logical right shift
    Lsr,
    /// Arithmetic right shift
    Asr,
    /// Rotate left
    Rol,
    /// Rotate right
    Ror,
}

impl IShiftVariant {
    /// Creates an [`IShiftVariant`] from its string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        IShiftVariant::iter().find(|op| op.to_str() == s)
    }

    /// Returns the string representation of the [`IShiftVariant`].
    pub fn to_str(&self) -> &'static str {
        match self {
            IShiftVariant::Lsl => "shl",
            IShiftVariant::Lsr => "lshr",
            IShiftVariant::Asr => "ashr",
            IShiftVariant::Rol => "rol",
            IShiftVariant::Ror => "ror",
        }
    }
}

macro_rules! define_int_binary {
    ($(#[$doc:meta])* $name:ident { $($field:ident : $fty:ty),* $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Hash, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name {
            pub dest: Name,
            pub ty: Typeref,
            pub lhs: Operand,
            pub rhs: Operand,
            $(pub $field: $fty,)*
        }

        impl Instruction for $name {
            fn operands(&self) -> impl Iterator<Item = &Operand> {
                [&self.lhs, &self.rhs].into_iter()
            }

            fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
                [&mut self.lhs, &mut self.rhs].into_iter()
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
    };
}

define_int_binary! {
    /// Integer addition instruction
    IAdd {
        signedness: IntegerSignedness,
        overflow: OverflowPolicy,
    }
}

define_int_binary! {
    /// Integer subtraction instruction
    ISub {
        signedness: IntegerSignedness,
        overflow: OverflowPolicy,
    }
}

define_int_binary! {
    /// Integer multiplication instruction
    IMul {
        signedness: IntegerSignedness,
        overflow: OverflowPolicy,
    }
}

define_int_binary! {
    /// Integer division instruction
    IDiv {
        signedness: IntegerSignedness,
    }
}

define_int_binary! {
    /// Integer remainder instruction
    IRem {
        signedness: IntegerSignedness,
    }
}

define_int_binary! {
    /// Integer comparison instruction
    ///
    /// `ty` is the type of the compared operands; the result is always `i1`.
    ICmp {
        op: ICmpVariant,
    }
}

define_int_binary! {
    /// Bitwise and instruction
    IAnd {}
}

define_int_binary! {
    /// Bitwise or instruction
    IOr {}
}

define_int_binary! {
    /// Bitwise xor instruction
    IXor {}
}

/// Integer shift/rotate instruction
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ISht {
    pub dest: Name,
    pub ty: Typeref,
    pub op: IShiftVariant,
    pub value: Operand,
    pub shift: Operand,
}

impl Instruction for ISht {
    fn operands(&self) -> impl Iterator<Item = &Operand> {
        [&self.value, &self.shift].into_iter()
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        [&mut self.value, &mut self.shift].into_iter()
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
