//! Rolling digest accumulator
//!
//! [`DigestAccumulator`] folds a stream of tagged fields into a 128-bit
//! [`Digest`]. Every heterogeneous field fed into the stream MUST be preceded
//! by a [`FieldTag`] selecting what kind of field follows, and variable-width
//! content is length-prefixed, so that concatenations of different field
//! sequences can never alias to the same byte stream (hashing "1" then "23"
//! must differ from hashing "12" then "3"). This framing discipline is the
//! load-bearing correctness property of every hasher built on top.
use strata_instr::ticket::Digest;

/// Closed enumeration of field kinds fed into the accumulator.
///
/// One variant per distinguishable field position in the hashing rules.
/// Adding a new hashed field means adding a variant here; reusing a tag for
/// two different field meanings reintroduces the aliasing problem the tags
/// exist to prevent.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTag {
    // Literals
    IntLiteral,
    FloatLiteral,
    NullPtr,
    Undef,
    ArrayLiteral,
    StructLiteral,

    // Entity identity
    Type,
    TypeBackRef,
    Constant,
    Value,
    GlobalValue,

    // Attributes
    AttributeEnum,
    AttributeInt,
    AttributeString,
    AttributeList,

    // Function signature fields
    Signature,
    SignatureCc,
    SignatureGc,
    SignatureSection,
    SignaturePersonality,
    SignatureVarArg,

    // Instruction stream
    Instruction,
    LoadInst,
    StoreInst,
    AllocaInst,
    GetElementPtrInst,
    CmpInst,
    InvokeInst,
    PhiInst,
    SelectInst,
    ExtractValueInst,
    InsertValueInst,
    OperandBundles,
    RangeHint,
    Ordering,
    SyncScope,
    Terminator,
    BasicBlock,

    // Global objects
    GlobalFunction,
    GlobalVariable,
    GlobalAlias,
    GvConstant,
    GvAlignment,
    GvComdat,
    GvInitValue,

    // Module context
    DataLayout,
    Triple,
}

/// A stateful, tag-prefixed byte-stream hash accumulator with 128-bit
/// output.
///
/// The accumulator is exclusively owned by one hashing computation and must
/// be [`DigestAccumulator::reset`] (not merely reused) between unrelated
/// entities.
#[derive(Default)]
pub struct DigestAccumulator {
    hash: blake3::Hasher,
}

impl DigestAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all accumulated state.
    pub fn reset(&mut self) {
        self.hash.reset();
    }

    /// Feed a field tag. Callers invoke this before every heterogeneous
    /// field.
    pub fn tag(&mut self, tag: FieldTag) {
        self.hash.update(&[tag as u8]);
    }

    /// Feed the raw bytes of a fixed-width scalar.
    pub fn number_hash(&mut self, v: u64) {
        self.hash.update(&v.to_le_bytes());
    }

    /// Feed a boolean flag.
    pub fn bool_hash(&mut self, v: bool) {
        self.hash.update(&[u8::from(v)]);
    }

    /// Feed arbitrary byte content (e.g. string data), length-prefixed so
    /// adjacent variable-width fields cannot alias.
    pub fn mem_hash(&mut self, bytes: &[u8]) {
        self.hash.update(&(bytes.len() as u64).to_le_bytes());
        self.hash.update(bytes);
    }

    /// Extract the finalized 128-bit digest. The accumulator state is left
    /// untouched; reset it before starting an unrelated entity.
    pub fn finish(&self) -> Digest {
        let mut bytes = [0u8; 16];
        self.hash.finalize_xof().fill(&mut bytes);
        Digest(bytes)
    }
}
