//! The instruction sum-type.
//!
//! [`AnyInstr`] is a tagged union over every concrete instruction form. Use
//! it to store heterogeneous instruction streams and to pattern-match on
//! specific operations. The generated [`InstrKind`] discriminant (via
//! `strum`) gives fast, exhaustive classification; its numeric value is the
//! instruction's stable opcode.
use auto_enums::auto_enum;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumDiscriminants, EnumIs, EnumIter, EnumTryAs};

use crate::{
    modules::{
        Instruction, agg, fp,
        int::{self, IShiftVariant, IntegerSignedness, OverflowPolicy},
        mem, misc,
        operand::{Name, Operand},
    },
    types::Typeref,
};

/// Discriminated union covering all public instruction kinds.
#[derive(Debug, Clone, Hash, PartialEq, Eq, EnumIs, EnumTryAs, EnumDiscriminants)]
#[strum_discriminants(name(InstrKind))]
#[strum_discriminants(derive(EnumIter, Hash))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnyInstr {
    // Integer instructions
    IAdd(int::IAdd),
    ISub(int::ISub),
    IMul(int::IMul),
    IDiv(int::IDiv),
    IRem(int::IRem),
    ICmp(int::ICmp),
    ISht(int::ISht),

    // Bitwise instructions
    IAnd(int::IAnd),
    IOr(int::IOr),
    IXor(int::IXor),

    // Floating-point instructions
    FAdd(fp::FAdd),
    FSub(fp::FSub),
    FMul(fp::FMul),
    FDiv(fp::FDiv),
    FRem(fp::FRem),
    FCmp(fp::FCmp),
    FNeg(fp::FNeg),

    // Memory instructions
    MLoad(mem::MLoad),
    MStore(mem::MStore),
    MAlloca(mem::MAlloca),
    MGetElementPtr(mem::MGetElementPtr),

    // Aggregate value instructions
    AExtractValue(agg::AExtractValue),
    AInsertValue(agg::AInsertValue),

    // Calls, phis, selection
    Invoke(misc::Invoke),
    Phi(misc::Phi),
    Select(misc::Select),
}

fn signedness_bit(signedness: IntegerSignedness) -> u64 {
    match signedness {
        IntegerSignedness::Signed => 0,
        IntegerSignedness::Unsigned => 1,
    }
}

fn overflow_bits(overflow: OverflowPolicy) -> u64 {
    match overflow {
        OverflowPolicy::Wrap => 0,
        OverflowPolicy::Trap => 1,
        OverflowPolicy::Saturate => 2,
    }
}

fn shift_bits(op: IShiftVariant) -> u64 {
    match op {
        IShiftVariant::Lsl => 0,
        IShiftVariant::Lsr => 1,
        IShiftVariant::Asr => 2,
        IShiftVariant::Rol => 3,
        IShiftVariant::Ror => 4,
    }
}

impl AnyInstr {
    /// Classify this instruction.
    pub fn kind(&self) -> InstrKind {
        InstrKind::from(self)
    }

    /// Stable numeric opcode of this instruction.
    pub fn opcode(&self) -> u16 {
        self.kind() as u16
    }

    /// Opcode-specific flag fields packed into one word.
    ///
    /// Covers the small policy markers that modify an operation without
    /// changing its operand structure (signedness, overflow policy, shift
    /// variant, bounds marker). Larger opcode-specific payloads (predicates,
    /// orderings, alignments, index paths) stay on the instruction struct.
    pub fn subclass_data(&self) -> u64 {
        match self {
            AnyInstr::IAdd(i) => signedness_bit(i.signedness) | (overflow_bits(i.overflow) << 1),
            AnyInstr::ISub(i) => signedness_bit(i.signedness) | (overflow_bits(i.overflow) << 1),
            AnyInstr::IMul(i) => signedness_bit(i.signedness) | (overflow_bits(i.overflow) << 1),
            AnyInstr::IDiv(i) => signedness_bit(i.signedness),
            AnyInstr::IRem(i) => signedness_bit(i.signedness),
            AnyInstr::ICmp(_) => 0,
            AnyInstr::ISht(i) => shift_bits(i.op),
            AnyInstr::IAnd(_) | AnyInstr::IOr(_) | AnyInstr::IXor(_) => 0,
            AnyInstr::FAdd(_)
            | AnyInstr::FSub(_)
            | AnyInstr::FMul(_)
            | AnyInstr::FDiv(_)
            | AnyInstr::FRem(_)
            | AnyInstr::FCmp(_)
            | AnyInstr::FNeg(_) => 0,
            AnyInstr::MLoad(_) | AnyInstr::MStore(_) | AnyInstr::MAlloca(_) => 0,
            AnyInstr::MGetElementPtr(i) => u64::from(i.in_bounds),
            AnyInstr::AExtractValue(_) | AnyInstr::AInsertValue(_) => 0,
            AnyInstr::Invoke(_) | AnyInstr::Phi(_) | AnyInstr::Select(_) => 0,
        }
    }
}

macro_rules! define_instr_any_instr {
    (
        $($variant:ident),*
    ) => {
        impl Instruction for AnyInstr {
            #[auto_enum(Iterator)]
            fn operands(&self) -> impl Iterator<Item = &Operand> {
                match self {
                    $(
                        AnyInstr::$variant(instr) => instr.operands(),
                    )*
                }
            }

            #[auto_enum(Iterator)]
            fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
                match self {
                    $(
                        AnyInstr::$variant(instr) => instr.operands_mut(),
                    )*
                }
            }

            fn destination(&self) -> Option<Name> {
                match self {
                    $(
                        AnyInstr::$variant(instr) => instr.destination(),
                    )*
                }
            }

            fn set_destination(&mut self, name: Name) {
                match self {
                    $(
                        AnyInstr::$variant(instr) => instr.set_destination(name),
                    )*
                }
            }

            fn destination_type(&self) -> Option<Typeref> {
                match self {
                    $(
                        AnyInstr::$variant(instr) => instr.destination_type(),
                    )*
                }
            }
        }
    };
}

define_instr_any_instr! {
    IAdd,
    ISub,
    IMul,
    IDiv,
    IRem,
    ICmp,
    ISht,
    IAnd,
    IOr,
    IXor,
    FAdd,
    FSub,
    FMul,
    FDiv,
    FRem,
    FCmp,
    FNeg,
    MLoad,
    MStore,
    MAlloca,
    MGetElementPtr,
    AExtractValue,
    AInsertValue,
    Invoke,
    Phi,
    Select
}

macro_rules! define_instr_from {
    ($typ:ty, $variant:ident) => {
        impl From<$typ> for AnyInstr {
            fn from(inst: $typ) -> Self {
                AnyInstr::$variant(inst)
            }
        }
    };
}

define_instr_from!(int::IAdd, IAdd);
define_instr_from!(int::ISub, ISub);
define_instr_from!(int::IMul, IMul);
define_instr_from!(int::IDiv, IDiv);
define_instr_from!(int::IRem, IRem);
define_instr_from!(int::ICmp, ICmp);
define_instr_from!(int::ISht, ISht);
define_instr_from!(int::IAnd, IAnd);
define_instr_from!(int::IOr, IOr);
define_instr_from!(int::IXor, IXor);

define_instr_from!(fp::FAdd, FAdd);
define_instr_from!(fp::FSub, FSub);
define_instr_from!(fp::FMul, FMul);
define_instr_from!(fp::FDiv, FDiv);
define_instr_from!(fp::FRem, FRem);
define_instr_from!(fp::FCmp, FCmp);
define_instr_from!(fp::FNeg, FNeg);

define_instr_from!(mem::MLoad, MLoad);
define_instr_from!(mem::MStore, MStore);
define_instr_from!(mem::MAlloca, MAlloca);
define_instr_from!(mem::MGetElementPtr, MGetElementPtr);

define_instr_from!(agg::AExtractValue, AExtractValue);
define_instr_from!(agg::AInsertValue, AInsertValue);

define_instr_from!(misc::Invoke, Invoke);
define_instr_from!(misc::Phi, Phi);
define_instr_from!(misc::Select, Select);
