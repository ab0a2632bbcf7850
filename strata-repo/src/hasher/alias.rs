//! Global alias digest computation
//!
//! Aliases inherit identity from their target: when the aliasee is another
//! global object of the module, the alias digest **is** that object's digest
//! unchanged. Only when the aliasee is a general constant expression is the
//! digest computed structurally from the expression.
use strata_instr::modules::{
    Module,
    globals::{Aliasee, GlobalAlias},
    operand::GlobalRef,
};
use strata_instr::ticket::Digest;
use strata_instr::types::TypeRegistry;

use crate::{
    accum::FieldTag,
    hasher::{EntityHasher, FunctionHasher, VariableHasher},
    session::HashSession,
};

/// Computes the structural digest of one global alias.
pub struct AliasHasher<'a> {
    alias: &'a GlobalAlias,
}

impl<'a> AliasHasher<'a> {
    pub fn new(alias: &'a GlobalAlias) -> Self {
        Self { alias }
    }

    /// Calculate the digest for the alias.
    pub fn calculate(
        &self,
        module: &Module,
        registry: &TypeRegistry,
        session: &mut HashSession,
    ) -> Digest {
        match &self.alias.aliasee {
            Aliasee::Global(gref) => self.target_digest(*gref, module, registry, session),
            Aliasee::Expr(expr) => {
                let mut hash = EntityHasher::new(registry, session);
                hash.acc.tag(FieldTag::GlobalAlias);
                hash.const_hash(expr);
                hash.module_hash(module);
                hash.finish()
            }
        }
    }

    /// Resolve the aliased global object and return its digest: the already
    /// attached ticket digest when present, a fresh computation otherwise.
    fn target_digest(
        &self,
        gref: GlobalRef,
        module: &Module,
        registry: &TypeRegistry,
        session: &mut HashSession,
    ) -> Digest {
        if let Some(function) = module.functions.get(&gref.0) {
            if let Some(ticket) = &function.ticket {
                return ticket.digest;
            }
            return FunctionHasher::new(function, registry, session).calculate(module);
        }

        if let Some(global) = module.globals.get(&gref.0) {
            if let Some(ticket) = &global.ticket {
                return ticket.digest;
            }
            return VariableHasher::new(global, registry, session).calculate(module);
        }

        if let Some(target) = module.aliases.get(&gref.0) {
            if let Some(ticket) = &target.ticket {
                return ticket.digest;
            }
            return AliasHasher::new(target).calculate(module, registry, session);
        }

        panic!(
            "alias `{}` names global object `{}` which is not defined in module `{}`",
            self.alias.name, gref, module.name
        );
    }
}
