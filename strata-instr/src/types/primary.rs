#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

/// Represents an integer type with a specific bit width.
///
/// Signedness is not represented here; all integer types are treated as plain
/// bit patterns. Instructions that operate on signed integers interpret the
/// bits accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct IType {
    num_bits: u32,
}

impl IType {
    /// Common integer types.
    pub const I1: Self = Self { num_bits: 1 };
    pub const I8: Self = Self { num_bits: 8 };
    pub const I16: Self = Self { num_bits: 16 };
    pub const I32: Self = Self { num_bits: 32 };
    pub const I64: Self = Self { num_bits: 64 };
    pub const I128: Self = Self { num_bits: 128 };
    pub const MIN_BITS: u32 = 1;
    pub const MAX_BITS: u32 = (1 << 23) - 1;

    /// Creates a new `IType` with the specified number of bits. Returns
    /// `None` if the width falls outside `[MIN_BITS, MAX_BITS]`.
    #[inline]
    pub const fn new(num_bits: u32) -> Option<Self> {
        if num_bits >= Self::MIN_BITS && num_bits <= Self::MAX_BITS {
            Some(Self { num_bits })
        } else {
            None
        }
    }

    /// Returns the number of bits of the integer type.
    #[inline]
    pub const fn num_bits(&self) -> u32 {
        self.num_bits
    }

    /// Returns the number of bytes required to store the integer type.
    #[inline]
    pub const fn byte_size(&self) -> u32 {
        self.num_bits.div_ceil(8)
    }
}

impl std::fmt::Display for IType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "i{}", self.num_bits)
    }
}

/// Represents a floating-point type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FType {
    /// 16-bit floating point value (IEEE-754 binary16), "half precision".
    Fp16,

    /// 16-bit "brain" floating point value (7-bit significand). Same exponent
    /// range as `FType::Fp32` with greatly reduced precision.
    Bf16,

    /// 32-bit floating point value (IEEE-754 binary32), "single precision".
    /// Corresponds to Rust's `f32` type.
    Fp32,

    /// 64-bit floating point value (IEEE-754 binary64), "double precision".
    /// Corresponds to Rust's `f64` type.
    Fp64,

    /// 128-bit floating point value (IEEE-754 binary128), "quadruple
    /// precision".
    Fp128,

    /// 80-bit floating point value (X87 extended precision). Mainly used on
    /// x86 architectures.
    X86Fp80,

    /// 128-bit floating point value (two 64-bit values).
    PPCFp128,
}

impl std::fmt::Display for FType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FType::Fp16 => "half",
            FType::Bf16 => "bfloat",
            FType::Fp32 => "float",
            FType::Fp64 => "double",
            FType::Fp128 => "fp128",
            FType::X86Fp80 => "x86_fp80",
            FType::PPCFp128 => "ppc_fp128",
        };
        write!(f, "{}", s)
    }
}

/// Pointer type, represented as a primary basic type.
///
/// Pointers are opaque and carry no pointee type; only the target address
/// space distinguishes two pointer types. Address space 0 is the default
/// (generic) address space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PtrType {
    pub address_space: u32,
}

impl PtrType {
    /// Pointer into the default address space.
    pub const DEFAULT: Self = Self { address_space: 0 };
}

impl std::fmt::Display for PtrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.address_space == 0 {
            write!(f, "ptr")
        } else {
            write!(f, "ptr addrspace({})", self.address_space)
        }
    }
}

/// Primary base types usable as vector elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrimaryBasicType {
    Int(IType),
    Float(FType),
    Ptr(PtrType),
}

impl From<IType> for PrimaryBasicType {
    fn from(itype: IType) -> Self {
        PrimaryBasicType::Int(itype)
    }
}

impl From<FType> for PrimaryBasicType {
    fn from(ftype: FType) -> Self {
        PrimaryBasicType::Float(ftype)
    }
}

impl From<PtrType> for PrimaryBasicType {
    fn from(ptrtype: PtrType) -> Self {
        PrimaryBasicType::Ptr(ptrtype)
    }
}

impl std::fmt::Display for PrimaryBasicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimaryBasicType::Int(itype) => itype.fmt(f),
            PrimaryBasicType::Float(ftype) => ftype.fmt(f),
            PrimaryBasicType::Ptr(ptrtype) => ptrtype.fmt(f),
        }
    }
}

/// Size of a vector type, either fixed or scalable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VectorSize {
    /// Fixed size vector with the given number of elements.
    Fixed(u16),

    /// Scalable vector where the number of elements is an unknown hardware
    /// multiple of the given factor.
    Scalable(u16),
}

/// A vector of primary elements operated on in parallel (SIMD).
///
/// Vector types are considered primary types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VcType {
    pub ty: PrimaryBasicType,
    pub size: VectorSize,
}

impl std::fmt::Display for VcType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.size {
            VectorSize::Fixed(num) => write!(f, "<{} x {}>", num, self.ty),
            VectorSize::Scalable(num) => write!(f, "<vscale {} x {}>", num, self.ty),
        }
    }
}

/// The void type: no value. Only usable as a function return "type".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoidType;

impl std::fmt::Display for VoidType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "void")
    }
}

/// The label type represents code labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LblType;

impl std::fmt::Display for LblType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "label")
    }
}

/// The metadata type. Values of this type carry out-of-band annotations and
/// never participate in computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MdType;

impl std::fmt::Display for MdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "metadata")
    }
}

/// Represents any primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumTryAs, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrimaryType {
    Void(VoidType),
    Int(IType),
    Float(FType),
    Ptr(PtrType),
    Vc(VcType),
    Lbl(LblType),
    Md(MdType),
}

macro_rules! primary_type_from {
    ($typ:ty, $lbl:ident) => {
        impl From<$typ> for PrimaryType {
            fn from(value: $typ) -> Self {
                PrimaryType::$lbl(value)
            }
        }
    };
}

primary_type_from! { VoidType, Void }
primary_type_from! { IType, Int }
primary_type_from! { FType, Float }
primary_type_from! { PtrType, Ptr }
primary_type_from! { VcType, Vc }
primary_type_from! { LblType, Lbl }
primary_type_from! { MdType, Md }

impl std::fmt::Display for PrimaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimaryType::Void(void_type) => void_type.fmt(f),
            PrimaryType::Int(itype) => itype.fmt(f),
            PrimaryType::Float(ftype) => ftype.fmt(f),
            PrimaryType::Ptr(ptr_type) => ptr_type.fmt(f),
            PrimaryType::Vc(vc_type) => vc_type.fmt(f),
            PrimaryType::Lbl(lbl_type) => lbl_type.fmt(f),
            PrimaryType::Md(md_type) => md_type.fmt(f),
        }
    }
}
