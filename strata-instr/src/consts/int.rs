use num_bigint::BigInt;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::primary::IType;

/// An integer literal paired with its `IType`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IConst {
    pub ty: IType,
    pub value: BigInt,
}

impl IConst {
    /// Create a new `IConst` from its type and value.
    pub fn new(ty: IType, value: impl Into<BigInt>) -> Self {
        Self {
            ty,
            value: value.into(),
        }
    }
}

impl From<u8> for IConst {
    fn from(value: u8) -> Self {
        Self {
            ty: IType::I8,
            value: value.into(),
        }
    }
}

impl From<u16> for IConst {
    fn from(value: u16) -> Self {
        Self {
            ty: IType::I16,
            value: value.into(),
        }
    }
}

impl From<u32> for IConst {
    fn from(value: u32) -> Self {
        Self {
            ty: IType::I32,
            value: value.into(),
        }
    }
}

impl From<u64> for IConst {
    fn from(value: u64) -> Self {
        Self {
            ty: IType::I64,
            value: value.into(),
        }
    }
}

impl From<bool> for IConst {
    fn from(value: bool) -> Self {
        Self {
            ty: IType::I1,
            value: u32::from(value).into(),
        }
    }
}

impl std::fmt::Display for IConst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.ty, self.value)
    }
}
