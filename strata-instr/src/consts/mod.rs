//! Constant literals
//!
//! Immediate values usable as instruction operands and global variable
//! initializers. Scalar constants carry their literal payload inline;
//! aggregate constants reference their `Typeref` and recurse into element
//! constants, so a constant tree mirrors the shape of its aggregate type.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

use crate::{
    consts::{fp::FConst, int::IConst},
    types::{Typeref, primary::PtrType},
};

pub mod fp;
pub mod int;

/// An array literal: element type plus one constant per element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrayConst {
    pub ty: Typeref,
    pub elements: Vec<AnyConst>,
}

/// A struct literal: struct type plus one constant per field, in field order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StructConst {
    pub ty: Typeref,
    pub fields: Vec<AnyConst>,
}

/// A sum-type over every constant form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnyConst {
    /// Integer literal.
    Int(IConst),

    /// Floating-point literal.
    Float(FConst),

    /// The null pointer of the given pointer type.
    NullPtr(PtrType),

    /// An unspecified value of the given type.
    Undef(Typeref),

    /// Array literal.
    Array(ArrayConst),

    /// Struct literal.
    Struct(StructConst),
}

impl From<IConst> for AnyConst {
    fn from(value: IConst) -> Self {
        AnyConst::Int(value)
    }
}

impl From<FConst> for AnyConst {
    fn from(value: FConst) -> Self {
        AnyConst::Float(value)
    }
}

impl From<ArrayConst> for AnyConst {
    fn from(value: ArrayConst) -> Self {
        AnyConst::Array(value)
    }
}

impl From<StructConst> for AnyConst {
    fn from(value: StructConst) -> Self {
        AnyConst::Struct(value)
    }
}

impl std::fmt::Display for AnyConst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnyConst::Int(iconst) => write!(f, "{}", iconst),
            AnyConst::Float(fconst) => write!(f, "{}", fconst),
            AnyConst::NullPtr(_) => write!(f, "null"),
            AnyConst::Undef(_) => write!(f, "undef"),
            AnyConst::Array(array) => {
                write!(f, "[ ")?;
                for (i, elem) in array.elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, " ]")
            }
            AnyConst::Struct(structure) => {
                write!(f, "{{ ")?;
                for (i, field) in structure.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field)?;
                }
                write!(f, " }}")
            }
        }
    }
}
