//! Structural entity hashing
//!
//! Recursive hashing rules over the entity graph, built on the
//! [`DigestAccumulator`](crate::accum::DigestAccumulator) plus the two
//! identity-numbering tables of a [`HashSession`](crate::session::HashSession).
//! [`EntityHasher`] implements the shared primitives (types, constants,
//! values, globals, attributes); the per-object hashers in [`function`],
//! [`variable`], and [`alias`] drive it.
//!
//! Two invariants carried by every rule here:
//! - every heterogeneous field is preceded by a [`FieldTag`];
//! - identities are numbered by first use in canonical traversal order,
//!   never by storage order or address.
use num_bigint::Sign;
use strata_instr::{
    consts::{AnyConst, fp::FConst, int::IConst},
    modules::{
        CallingConvention, Module,
        globals::FnAttr,
        mem::MemoryOrdering,
        operand::{GlobalRef, Operand},
    },
    ticket::Digest,
    types::{
        AnyType, TypeRegistry, Typeref,
        primary::{PrimaryBasicType, PrimaryType, VectorSize},
    },
};

use crate::{
    accum::{DigestAccumulator, FieldTag},
    session::{HashSession, LocalId, LocalNumbering},
};

pub mod alias;
pub mod function;
pub mod variable;

pub use alias::AliasHasher;
pub use function::FunctionHasher;
pub use variable::VariableHasher;

fn sign_code(sign: Sign) -> u64 {
    match sign {
        Sign::Minus => 0,
        Sign::NoSign => 1,
        Sign::Plus => 2,
    }
}

/// Shared hashing primitives over one entity.
///
/// An `EntityHasher` is exclusively owned by one hash computation: the
/// accumulator and the local numbering table start empty and are discarded
/// with the hasher after [`EntityHasher::finish`]. Only the global numbering
/// table (borrowed from the session) outlives the computation.
pub(crate) struct EntityHasher<'a> {
    pub(crate) acc: DigestAccumulator,
    pub(crate) locals: LocalNumbering,
    pub(crate) registry: &'a TypeRegistry,
    pub(crate) session: &'a mut HashSession,
}

impl<'a> EntityHasher<'a> {
    pub(crate) fn new(registry: &'a TypeRegistry, session: &'a mut HashSession) -> Self {
        Self {
            acc: DigestAccumulator::new(),
            locals: LocalNumbering::new(),
            registry,
            session,
        }
    }

    /// Accumulate a type hash.
    ///
    /// Primitive kinds hash by kind code alone; integers add their width,
    /// pointers their address space, vectors their size and element type.
    /// Aggregates recurse through their field types. Re-entering a type
    /// already on the current recursion path hashes a back-reference to its
    /// position on the path instead of recursing, so self-referential
    /// aggregate types terminate.
    pub(crate) fn type_hash(&mut self, typeref: Typeref) {
        let mut path = Vec::new();
        self.type_hash_guarded(typeref, &mut path);
    }

    fn type_hash_guarded(&mut self, typeref: Typeref, path: &mut Vec<Typeref>) {
        if let Some(pos) = path.iter().position(|on_path| *on_path == typeref) {
            self.acc.tag(FieldTag::TypeBackRef);
            self.acc.number_hash(pos as u64);
            return;
        }

        let ty = self.registry.resolve(typeref).unwrap_or_else(|| {
            panic!("dangling typeref {typeref:?}: no definition in the type registry")
        });

        self.acc.tag(FieldTag::Type);
        match ty {
            AnyType::Primary(primary) => match primary {
                PrimaryType::Void(_) => self.acc.number_hash(0),
                PrimaryType::Int(itype) => {
                    self.acc.number_hash(1);
                    self.acc.number_hash(u64::from(itype.num_bits()));
                }
                PrimaryType::Float(ftype) => {
                    self.acc.number_hash(2);
                    self.acc.number_hash(ftype as u64);
                }
                PrimaryType::Ptr(ptr) => {
                    self.acc.number_hash(3);
                    self.acc.number_hash(u64::from(ptr.address_space));
                }
                PrimaryType::Vc(vc) => {
                    self.acc.number_hash(4);
                    let (scalable, count) = match vc.size {
                        VectorSize::Fixed(n) => (0, n),
                        VectorSize::Scalable(n) => (1, n),
                    };
                    self.acc.number_hash(scalable);
                    self.acc.number_hash(u64::from(count));
                    self.primary_basic_hash(vc.ty);
                }
                PrimaryType::Lbl(_) => self.acc.number_hash(5),
                PrimaryType::Md(_) => self.acc.number_hash(6),
            },
            AnyType::Array(array) => {
                self.acc.number_hash(7);
                self.acc.number_hash(array.num_elements);
                path.push(typeref);
                self.type_hash_guarded(array.elem, path);
                path.pop();
            }
            AnyType::Struct(structure) => {
                self.acc.number_hash(8);
                self.acc.bool_hash(structure.packed);
                self.acc.number_hash(structure.fields.len() as u64);
                path.push(typeref);
                for field in &structure.fields {
                    self.type_hash_guarded(*field, path);
                }
                path.pop();
            }
        }
    }

    fn primary_basic_hash(&mut self, ty: PrimaryBasicType) {
        match ty {
            PrimaryBasicType::Int(itype) => {
                self.acc.number_hash(1);
                self.acc.number_hash(u64::from(itype.num_bits()));
            }
            PrimaryBasicType::Float(ftype) => {
                self.acc.number_hash(2);
                self.acc.number_hash(ftype as u64);
            }
            PrimaryBasicType::Ptr(ptr) => {
                self.acc.number_hash(3);
                self.acc.number_hash(u64::from(ptr.address_space));
            }
        }
    }

    pub(crate) fn int_literal_hash(&mut self, constant: &IConst) {
        self.acc.tag(FieldTag::IntLiteral);
        self.acc.number_hash(u64::from(constant.ty.num_bits()));
        let (sign, magnitude) = constant.value.to_bytes_le();
        self.acc.number_hash(sign_code(sign));
        self.acc.mem_hash(&magnitude);
    }

    fn float_literal_hash(&mut self, constant: &FConst) {
        self.acc.tag(FieldTag::FloatLiteral);
        self.acc.number_hash(constant.ty as u64);
        // Normalize first: 1.0 and 1.00 carry the same value and must hash
        // identically.
        let (digits, exponent) = constant.value.normalized().as_bigint_and_exponent();
        let (sign, magnitude) = digits.to_bytes_le();
        self.acc.number_hash(sign_code(sign));
        self.acc.mem_hash(&magnitude);
        self.acc.number_hash(exponent as u64);
    }

    /// Accumulate a constant hash: tag, then either the literal content
    /// (scalars) or the recursive hash of each sub-constant (aggregates).
    pub(crate) fn const_hash(&mut self, constant: &AnyConst) {
        self.acc.tag(FieldTag::Constant);
        match constant {
            AnyConst::Int(iconst) => self.int_literal_hash(iconst),
            AnyConst::Float(fconst) => self.float_literal_hash(fconst),
            AnyConst::NullPtr(ptr) => {
                self.acc.tag(FieldTag::NullPtr);
                self.acc.number_hash(u64::from(ptr.address_space));
            }
            AnyConst::Undef(ty) => {
                self.acc.tag(FieldTag::Undef);
                self.type_hash(*ty);
            }
            AnyConst::Array(array) => {
                self.acc.tag(FieldTag::ArrayLiteral);
                self.type_hash(array.ty);
                self.acc.number_hash(array.elements.len() as u64);
                for element in &array.elements {
                    self.const_hash(element);
                }
            }
            AnyConst::Struct(structure) => {
                self.acc.tag(FieldTag::StructLiteral);
                self.type_hash(structure.ty);
                self.acc.number_hash(structure.fields.len() as u64);
                for field in &structure.fields {
                    self.const_hash(field);
                }
            }
        }
    }

    /// Assign or look up the serial number for a function-local identity.
    /// Numbers are assigned in the order visited, which realizes
    /// alpha-equivalence: renaming locals never changes the digest, but
    /// using them in a different relative order does.
    pub(crate) fn value_hash(&mut self, id: LocalId) {
        let number = self.locals.number(id);
        self.acc.tag(FieldTag::Value);
        self.acc.number_hash(u64::from(number));
    }

    /// Accumulate a global object reference by session-wide identity number,
    /// so that two hash computations referencing the same global produce
    /// matching contributions.
    pub(crate) fn global_value_hash(&mut self, gref: GlobalRef) {
        let number = self.session.global_number(gref.0);
        self.acc.tag(FieldTag::GlobalValue);
        self.acc.number_hash(u64::from(number));
    }

    /// Dispatch one operand by kind: local value, constant, or global.
    pub(crate) fn operand_hash(&mut self, operand: &Operand) {
        match operand {
            Operand::Reg(name) => self.value_hash((*name).into()),
            Operand::Imm(constant) => self.const_hash(constant),
            Operand::Global(gref) => self.global_value_hash(*gref),
        }
    }

    pub(crate) fn attr_hash(&mut self, attr: &FnAttr) {
        match attr {
            FnAttr::Enum(kind) => {
                self.acc.tag(FieldTag::AttributeEnum);
                self.acc.number_hash(*kind as u64);
            }
            FnAttr::Int(kind, value) => {
                self.acc.tag(FieldTag::AttributeInt);
                self.acc.number_hash(*kind as u64);
                self.acc.number_hash(*value);
            }
            FnAttr::Str(key, value) => {
                self.acc.tag(FieldTag::AttributeString);
                self.acc.mem_hash(key.as_bytes());
                self.acc.mem_hash(value.as_bytes());
            }
        }
    }

    pub(crate) fn attr_list_hash(&mut self, attrs: &[FnAttr]) {
        self.acc.tag(FieldTag::AttributeList);
        self.acc.number_hash(attrs.len() as u64);
        for attr in attrs {
            self.attr_hash(attr);
        }
    }

    pub(crate) fn cconv_hash(&mut self, cconv: CallingConvention) {
        self.acc.tag(FieldTag::SignatureCc);
        let (code, arg) = match cconv {
            CallingConvention::C => (0, 0),
            CallingConvention::Fast => (1, 0),
            CallingConvention::Cold => (2, 0),
            CallingConvention::PreserveMost => (3, 0),
            CallingConvention::PreserveAll => (4, 0),
            CallingConvention::Tail => (5, 0),
            CallingConvention::Swift => (6, 0),
            CallingConvention::Numbered(n) => (7, u64::from(n)),
        };
        self.acc.number_hash(code);
        self.acc.number_hash(arg);
    }

    pub(crate) fn ordering_hash(&mut self, ordering: Option<MemoryOrdering>) {
        self.acc.tag(FieldTag::Ordering);
        match ordering {
            Some(ordering) => {
                self.acc.bool_hash(true);
                self.acc.number_hash(ordering as u64);
            }
            None => self.acc.bool_hash(false),
        }
    }

    pub(crate) fn opt_number(&mut self, value: Option<u64>) {
        match value {
            Some(value) => {
                self.acc.bool_hash(true);
                self.acc.number_hash(value);
            }
            None => self.acc.bool_hash(false),
        }
    }

    /// Fold the module-context fields (target data layout descriptor and
    /// target triple) into the stream. Both affect code-generation
    /// semantics: two definitions identical in IR but compiled for different
    /// targets must not collide.
    pub(crate) fn module_hash(&mut self, module: &Module) {
        self.acc.tag(FieldTag::DataLayout);
        self.acc.mem_hash(module.data_layout.as_bytes());
        self.acc.tag(FieldTag::Triple);
        self.acc.mem_hash(module.triple.as_bytes());
    }

    pub(crate) fn finish(&self) -> Digest {
        self.acc.finish()
    }
}
