//! Floating-point instructions
//!
//! IEEE-754 oriented arithmetic operations and comparisons. Each instruction
//! specifies its destination `Name`, the floating-point `Typeref`, and input
//! operands.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{
    modules::{
        Instruction,
        operand::{Name, Operand},
    },
    types::Typeref,
};

/// Floating-point comparison operations
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FCmpVariant {
    /// Ordered and equal (i.e., neither operand is NaN and lhs == rhs)
    Oeq,
    /// Ordered and greater than
    Ogt,
    /// Ordered and greater than or equal
    Oge,
    /// Ordered and less than
    Olt,
    /// Ordered and less than or equal
    Ole,
    /// Ordered and not equal
    One,
    /// Unordered or equal (i.e., at least one operand is NaN or lhs == rhs)
    Ueq,
    /// Unordered or greater than
    Ugt,
    /// Unordered or greater than or equal
    Uge,
    /// Unordered or less than
    Ult,
    /// Unordered or less than or equal
    Ule,
    /// Unordered or not equal
    Une,
    /// Ordered (i.e., neither operand is NaN)
    Ord,
}

macro_rules! define_fp_binary {
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

define_fp_binary! {
    /// Floating-point addition instruction
    FAdd {}
}

define_fp_binary! {
    /// Floating-point subtraction instruction
    FSub {}
}

define_fp_binary! {
    /// Floating-point multiplication instruction
    FMul {}
}

define_fp_binary! {
    /// Floating-point division instruction
    FDiv {}
}

define_fp_binary! {
    /// Floating-point remainder instruction
    FRem {}
}

define_fp_binary! {
    /// Floating-point comparison instruction
    ///
    /// `ty` is the type of the compared operands; the result is always `i1`.
    FCmp {
        op: FCmpVariant,
    }
}

/// Floating-point negation instruction
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FNeg {
    pub dest: Name,
    pub ty: Typeref,
    pub value: Operand,
}

impl Instruction for FNeg {
    fn operands(&self) -> impl Iterator<Item = &Operand> {
        std::iter::once(&self.value)
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        std::iter::once(&mut self.value)
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
