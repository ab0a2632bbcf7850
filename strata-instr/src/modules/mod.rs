//! Instruction IR modules
//!
//! This module groups the building blocks of the strata instruction IR. Each
//! instruction is represented as a small data structure with public fields,
//! making it easy to construct and inspect. Submodules contain families of
//! operations:
//!
//! - `int`: integer arithmetic, comparisons, shifts and bitwise ops
//! - `fp`: floating-point arithmetic and comparisons
//! - `mem`: memory loads and stores with optional atomic semantics
//! - `agg`: aggregate value extraction/insertion
//! - `misc`: calls, phis, selection
//! - `control_flow`: basic-block terminators
//! - `operand`: shared operand and SSA name types
//! - `globals`: global variables, aliases, attributes, comdats
//!
//! You typically manipulate instructions via the [`instructions::AnyInstr`]
//! enum which is a tagged union of all concrete instruction forms, and whole
//! translation units via [`Module`].
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    modules::{
        globals::{Comdat, FnAttr, GlobalAlias, GlobalVariable, MdMap},
        instructions::AnyInstr,
        operand::{GlobalRef, Label, Name, Operand},
    },
    ticket::Ticket,
    types::Typeref,
    utils::Error,
};

pub mod agg;
pub mod control_flow;
pub mod fp;
pub mod globals;
pub mod instructions;
pub mod int;
pub mod mem;
pub mod misc;
pub mod operand;

/// Common interface implemented by every instruction node.
///
/// This trait provides lightweight, zero-allocation iteration over an
/// instruction's input operands and exposes its optional destination SSA
/// name when present.
pub trait Instruction {
    /// Iterate over all input operands for this instruction.
    fn operands(&self) -> impl Iterator<Item = &Operand>;

    /// Mutably iterate over all input operands for this instruction.
    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand>;

    /// Return the destination SSA name if the instruction produces a result.
    fn destination(&self) -> Option<Name> {
        None
    }

    /// Update the destination SSA name for this instruction. No-op if the
    /// instruction does not produce a result.
    fn set_destination(&mut self, _name: Name) {}

    /// Type of the produced result, if any.
    fn destination_type(&self) -> Option<Typeref> {
        None
    }

    /// Convenience iterator over referenced SSA names (i.e., register
    /// operands). Immediates and globals are ignored.
    fn name_dependencies(&self) -> impl Iterator<Item = Name> {
        self.operands().filter_map(|op| match op {
            Operand::Reg(reg) => Some(*reg),
            _ => None,
        })
    }
}

/// All global variables and functions have one of the following types of
/// linkage:
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Linkage {
    /// Only directly accessible by objects in the current module; never
    /// shows up in any symbol table in the object file.
    #[default]
    Private,

    /// Similar to `Linkage::Private`, but the value shows as a local symbol
    /// in the object file. This corresponds to the notion of the `static`
    /// keyword in C.
    Internal,

    /// May be referenced by other modules, and may also be defined in other
    /// modules.
    External,

    /// A definition known to exist elsewhere; the local body is kept only so
    /// optimizers can inspect it and is discarded at emission. Equivalent to
    /// a declaration for linking purposes.
    AvailableExternally,
}

/// All global variables and functions have one of the following visibility
/// styles:
///
/// Note: A symbol with internal or private linkage must have default
/// visibility.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Visibility {
    /// The declaration is visible to other modules and, in shared libraries,
    /// may be overridden.
    Default,

    /// The symbol is not placed into the dynamic symbol table, so no other
    /// module can reference it directly.
    #[default]
    Hidden,

    /// The symbol is placed in the dynamic symbol table, but references
    /// within the defining module bind to the local symbol: it cannot be
    /// overridden by another module.
    Protected,
}

/// Calling convention of a function or call site. The conventions of any
/// dynamic caller/callee pair must match, or the behavior of the program is
/// undefined.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CallingConvention {
    /// The target's C calling convention; supports varargs and tolerates
    /// prototype mismatches.
    #[default]
    C,

    /// Makes calls as fast as possible (e.g. by passing arguments in
    /// registers), without conforming to an externally specified ABI.
    Fast,

    /// Assumes the call is rarely executed; preserves as many registers as
    /// possible to keep the caller's live ranges intact.
    Cold,

    /// Preserves most registers to minimize caller save/restore while using
    /// C argument passing.
    PreserveMost,

    /// Like `PreserveMost` but preserves an even larger register set.
    PreserveAll,

    /// Guarantees tail call optimization when possible; requires exact
    /// prototype match.
    Tail,

    /// Swift language convention.
    Swift,

    /// Numbered/target-specific calling convention. Targets reserve numbers
    /// starting at 64 for custom conventions.
    Numbered(u32),
}

/// A basic block within a function, containing a sequence of instructions
/// and ending with a control flow terminator.
///
/// This structure allows to define a group of instructions that execute
/// sequentially, followed by a control flow instruction that determines the
/// next block to execute.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BasicBlock {
    pub instructions: Vec<AnyInstr>,
    pub terminator: control_flow::Terminator,
}

/// A function made of basic blocks and signature metadata.
///
/// A `Function` owns its control-flow graph (`body`) keyed by block
/// [`Label`]; by convention the entrypoint is the basic block with
/// [`Label::NIL`]. A function without a body is a declaration. Parameters
/// are represented as a list of `(Name, Typeref)` pairs.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Function {
    pub uuid: Uuid,
    pub name: String,
    pub params: Vec<(Name, Typeref)>,

    /// `None` for `void` functions.
    pub return_type: Option<Typeref>,
    pub is_vararg: bool,
    pub cconv: CallingConvention,
    pub linkage: Linkage,
    pub visibility: Visibility,
    pub attrs: Vec<FnAttr>,

    /// Name of the garbage-collection strategy in effect for this function.
    pub gc: Option<String>,

    /// Object-file section this function is placed in.
    pub section: Option<String>,

    /// Global handling language-level unwinding out of this function.
    pub personality: Option<GlobalRef>,
    pub comdat: Option<Comdat>,

    /// `None` makes this function a declaration.
    pub body: Option<BTreeMap<Label, BasicBlock>>,
    pub metadata: MdMap,

    /// Structural digest of this definition, attached out-of-band.
    pub ticket: Option<Ticket>,
}

impl Function {
    /// A function without a body is a declaration.
    pub fn is_declaration(&self) -> bool {
        self.body.is_none()
    }

    /// Reference this function from an instruction operand.
    pub fn as_ref(&self) -> GlobalRef {
        GlobalRef(self.uuid)
    }

    /// The entry basic block, if this function has a body.
    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.body.as_ref().and_then(|body| body.get(&Label::NIL))
    }

    /// Find next available [`Name`] not used by any parameter or
    /// instruction destination.
    pub fn next_available_name(&self) -> Name {
        let mut max_index = 0;
        for (name, _) in &self.params {
            max_index = max_index.max(name.0);
        }

        for bb in self.body.iter().flat_map(|body| body.values()) {
            for instr in &bb.instructions {
                if let Some(dest) = instr.destination() {
                    max_index = max_index.max(dest.0);
                }
            }
        }

        Name(max_index + 1)
    }

    /// Verify SSA form:
    /// 1) The entry block exists (definitions only).
    /// 2) Each name is defined exactly once.
    /// 3) Each operand refers to a defined name.
    /// 4) Every referenced label names a block of this function.
    pub fn check_ssa(&self) -> Result<(), Error> {
        let Some(body) = &self.body else {
            return Ok(());
        };

        if !body.contains_key(&Label::NIL) {
            return Err(Error::MissingEntryBlock);
        }

        let mut defined_names = BTreeSet::new();
        for (name, _) in self.params.iter() {
            if !defined_names.insert(*name) {
                return Err(Error::DuplicateSSAName { duplicate: *name });
            }
        }

        for bb in body.values() {
            for instr in &bb.instructions {
                if let Some(dest) = instr.destination() {
                    if !defined_names.insert(dest) {
                        return Err(Error::DuplicateSSAName { duplicate: dest });
                    }
                }
            }
        }

        // Now ensure all operands refer to defined names
        for bb in body.values() {
            for instr in &bb.instructions {
                for name in instr.name_dependencies() {
                    if !defined_names.contains(&name) {
                        return Err(Error::UndefinedSSAName { undefined: name });
                    }
                }
            }
            for name in bb.terminator.dependencies() {
                if !defined_names.contains(&name) {
                    return Err(Error::UndefinedSSAName { undefined: name });
                }
            }
        }

        for bb in body.values() {
            for target in bb.terminator.iter_targets() {
                if !body.contains_key(&target) {
                    return Err(Error::UndefinedBasicBlock {
                        function: self.name.clone(),
                        label: target,
                    });
                }
            }
        }

        Ok(())
    }
}

/// A module containing defined global objects.
///
/// `Module` acts as the compilation unit boundary for symbol visibility. It
/// also carries the two target context strings (data layout descriptor and
/// target triple) that affect code-generation semantics for everything
/// defined inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Module {
    pub name: String,

    /// Target data layout descriptor string.
    pub data_layout: String,

    /// Target triple string.
    pub triple: String,

    pub functions: BTreeMap<Uuid, Function>,
    pub globals: BTreeMap<Uuid, GlobalVariable>,
    pub aliases: BTreeMap<Uuid, GlobalAlias>,
}

impl Module {
    /// Create an empty module for the given target.
    pub fn new(
        name: impl Into<String>,
        data_layout: impl Into<String>,
        triple: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_layout: data_layout.into(),
            triple: triple.into(),
            functions: BTreeMap::new(),
            globals: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }

    /// Add a function, keyed by its UUID.
    pub fn add_function(&mut self, function: Function) -> GlobalRef {
        let gref = function.as_ref();
        self.functions.insert(function.uuid, function);
        gref
    }

    /// Add a global variable, keyed by its UUID.
    pub fn add_global(&mut self, global: GlobalVariable) -> GlobalRef {
        let gref = global.as_ref();
        self.globals.insert(global.uuid, global);
        gref
    }

    /// Add an alias, keyed by its UUID.
    pub fn add_alias(&mut self, alias: GlobalAlias) -> GlobalRef {
        let gref = alias.as_ref();
        self.aliases.insert(alias.uuid, alias);
        gref
    }

    /// Verify SSA form of every function of the module.
    pub fn verify(&self) -> Result<(), Error> {
        for function in self.functions.values() {
            function.check_ssa()?;
        }
        Ok(())
    }
}
