//! Global variable digest computation
//!
//! Analogous to function hashing for non-function global objects. The
//! top-level object-kind tag guarantees a variable can never collide with a
//! function or alias digest even if the remaining byte patterns coincide.
use strata_instr::modules::{Module, globals::GlobalVariable};
use strata_instr::ticket::Digest;
use strata_instr::types::TypeRegistry;

use crate::{accum::FieldTag, hasher::EntityHasher, session::HashSession};

/// Computes the structural digest of one global variable.
pub struct VariableHasher<'a> {
    global: &'a GlobalVariable,
    hash: EntityHasher<'a>,
}

impl<'a> VariableHasher<'a> {
    pub fn new(
        global: &'a GlobalVariable,
        registry: &'a TypeRegistry,
        session: &'a mut HashSession,
    ) -> Self {
        Self {
            global,
            hash: EntityHasher::new(registry, session),
        }
    }

    /// Calculate the digest for the global variable: object-kind tag,
    /// constant flag, alignment, type, initializer (when a definition is
    /// present), comdat grouping, and module context.
    pub fn calculate(&mut self, module: &Module) -> Digest {
        let global = self.global;

        self.hash.acc.tag(FieldTag::GlobalVariable);

        self.hash.acc.tag(FieldTag::GvConstant);
        self.hash.acc.bool_hash(global.is_constant);

        self.hash.acc.tag(FieldTag::GvAlignment);
        self.hash.opt_number(global.alignment.map(u64::from));

        self.hash.type_hash(global.ty);

        self.hash.acc.tag(FieldTag::GvInitValue);
        match &global.initializer {
            Some(initializer) => {
                self.hash.acc.bool_hash(true);
                self.hash.const_hash(initializer);
            }
            None => self.hash.acc.bool_hash(false),
        }

        self.hash.acc.tag(FieldTag::GvComdat);
        match &global.comdat {
            Some(comdat) => {
                self.hash.acc.bool_hash(true);
                self.hash.acc.mem_hash(comdat.name.as_bytes());
                self.hash.acc.number_hash(comdat.kind as u64);
            }
            None => self.hash.acc.bool_hash(false),
        }

        self.hash.module_hash(module);
        self.hash.finish()
    }
}
