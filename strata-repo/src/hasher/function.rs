//! Function digest computation
//!
//! [`FunctionHasher`] computes one digest per function from its signature,
//! module context, and canonically ordered basic blocks. Basic blocks are
//! visited in canonical control-flow order: starting at the entry block,
//! following each block's successors in the order they appear on its
//! terminator, discovering new blocks exactly once, in first-discovery
//! order. Reordering basic-block storage without changing control flow
//! therefore never changes the digest; blocks unreachable from the entry
//! never contribute.
use std::collections::{BTreeSet, VecDeque};

use strata_instr::modules::{
    BasicBlock, Function, Instruction, Module, control_flow::Terminator, instructions::AnyInstr,
    misc::OperandBundle, operand::Label,
};
use strata_instr::ticket::Digest;
use strata_instr::types::TypeRegistry;

use crate::{accum::FieldTag, hasher::EntityHasher, session::HashSession};

/// Computes the structural digest of one function.
pub struct FunctionHasher<'a> {
    function: &'a Function,
    hash: EntityHasher<'a>,
}

impl<'a> FunctionHasher<'a> {
    pub fn new(
        function: &'a Function,
        registry: &'a TypeRegistry,
        session: &'a mut HashSession,
    ) -> Self {
        Self {
            function,
            hash: EntityHasher::new(registry, session),
        }
    }

    /// Calculate the digest for the function.
    ///
    /// Stages, fed in order into one accumulator: object-kind tag,
    /// signature, module context, canonically ordered basic blocks.
    pub fn calculate(&mut self, module: &Module) -> Digest {
        self.hash.acc.tag(FieldTag::GlobalFunction);
        self.signature_hash();
        self.hash.module_hash(module);
        self.body_hash();
        self.hash.finish()
    }

    /// Accumulate the hash for the signature and other general attributes of
    /// the function: calling convention, GC strategy, section, personality,
    /// vararg flag, parameter types, return type, attribute list.
    fn signature_hash(&mut self) {
        let function = self.function;

        self.hash.acc.tag(FieldTag::Signature);
        self.hash.cconv_hash(function.cconv);

        self.hash.acc.tag(FieldTag::SignatureGc);
        match &function.gc {
            Some(gc) => {
                self.hash.acc.bool_hash(true);
                self.hash.acc.mem_hash(gc.as_bytes());
            }
            None => self.hash.acc.bool_hash(false),
        }

        self.hash.acc.tag(FieldTag::SignatureSection);
        match &function.section {
            Some(section) => {
                self.hash.acc.bool_hash(true);
                self.hash.acc.mem_hash(section.as_bytes());
            }
            None => self.hash.acc.bool_hash(false),
        }

        self.hash.acc.tag(FieldTag::SignaturePersonality);
        match function.personality {
            Some(gref) => {
                self.hash.acc.bool_hash(true);
                self.hash.global_value_hash(gref);
            }
            None => self.hash.acc.bool_hash(false),
        }

        self.hash.acc.tag(FieldTag::SignatureVarArg);
        self.hash.acc.bool_hash(function.is_vararg);

        self.hash.acc.number_hash(function.params.len() as u64);
        for (_, ty) in &function.params {
            self.hash.type_hash(*ty);
        }
        match function.return_type {
            Some(ty) => {
                self.hash.acc.bool_hash(true);
                self.hash.type_hash(ty);
            }
            None => self.hash.acc.bool_hash(false),
        }

        self.hash.attr_list_hash(&function.attrs);
    }

    /// Walk the control-flow graph in canonical order, hashing each
    /// discovered block exactly once.
    fn body_hash(&mut self) {
        let function = self.function;
        let Some(body) = &function.body else {
            // Declarations have no blocks to contribute.
            return;
        };

        let mut queue = VecDeque::from([Label::NIL]);
        let mut discovered = BTreeSet::from([Label::NIL]);

        while let Some(label) = queue.pop_front() {
            let block = body.get(&label).unwrap_or_else(|| {
                panic!(
                    "function `{}` references basic block `{}` which is not defined",
                    function.name, label
                )
            });

            self.basic_block_hash(label, block);

            for target in block.terminator.iter_targets() {
                if discovered.insert(target) {
                    queue.push_back(target);
                }
            }
        }
    }

    /// Accumulate the hash for one basic block: block identity (by traversal
    /// serial number), then each instruction in storage order, then the
    /// terminator.
    fn basic_block_hash(&mut self, label: Label, block: &BasicBlock) {
        self.hash.acc.tag(FieldTag::BasicBlock);
        self.hash.value_hash(label.into());
        self.hash.acc.number_hash(block.instructions.len() as u64);

        for instr in &block.instructions {
            self.instruction_hash(instr);
        }

        self.terminator_hash(&block.terminator);
    }

    /// Calculate one instruction's hash.
    ///
    /// Stages:
    /// 1. Opcode, as a number.
    /// 2. Number of operands.
    /// 3. Result type.
    /// 4. Opcode-specific flag word (`subclass_data`).
    /// 5. Each operand, dispatched by kind (value / constant / global).
    /// 6. Opcode-specific extra fields; see the per-kind arms. The match is
    ///    deliberately exhaustive: an instruction kind this stage does not
    ///    know about must fail to compile, never silently hash as "nothing
    ///    special".
    fn instruction_hash(&mut self, instr: &AnyInstr) {
        self.hash.acc.tag(FieldTag::Instruction);
        self.hash.acc.number_hash(u64::from(instr.opcode()));
        self.hash.acc.number_hash(instr.operands().count() as u64);

        match instr.destination_type() {
            Some(ty) => {
                self.hash.acc.bool_hash(true);
                self.hash.type_hash(ty);
            }
            None => self.hash.acc.bool_hash(false),
        }

        self.hash.acc.number_hash(instr.subclass_data());

        for operand in instr.operands() {
            self.hash.operand_hash(operand);
        }

        match instr {
            AnyInstr::IAdd(_)
            | AnyInstr::ISub(_)
            | AnyInstr::IMul(_)
            | AnyInstr::IDiv(_)
            | AnyInstr::IRem(_)
            | AnyInstr::ISht(_)
            | AnyInstr::IAnd(_)
            | AnyInstr::IOr(_)
            | AnyInstr::IXor(_)
            | AnyInstr::FAdd(_)
            | AnyInstr::FSub(_)
            | AnyInstr::FMul(_)
            | AnyInstr::FDiv(_)
            | AnyInstr::FRem(_)
            | AnyInstr::FNeg(_) => {}

            AnyInstr::ICmp(cmp) => {
                self.hash.acc.tag(FieldTag::CmpInst);
                self.hash.acc.number_hash(cmp.op as u64);
            }
            AnyInstr::FCmp(cmp) => {
                self.hash.acc.tag(FieldTag::CmpInst);
                self.hash.acc.number_hash(cmp.op as u64);
            }

            AnyInstr::MLoad(load) => {
                self.hash.acc.tag(FieldTag::LoadInst);
                self.hash.acc.bool_hash(load.volatile);
                self.hash.opt_number(load.alignment.map(u64::from));
                self.hash.ordering_hash(load.ordering);
                self.hash.acc.tag(FieldTag::SyncScope);
                self.hash.acc.number_hash(load.scope as u64);
                match &load.range {
                    Some(range) => {
                        self.hash.acc.bool_hash(true);
                        self.hash.acc.tag(FieldTag::RangeHint);
                        self.hash.int_literal_hash(&range.lo);
                        self.hash.int_literal_hash(&range.hi);
                    }
                    None => self.hash.acc.bool_hash(false),
                }
            }
            AnyInstr::MStore(store) => {
                self.hash.acc.tag(FieldTag::StoreInst);
                self.hash.acc.bool_hash(store.volatile);
                self.hash.opt_number(store.alignment.map(u64::from));
                self.hash.ordering_hash(store.ordering);
                self.hash.acc.tag(FieldTag::SyncScope);
                self.hash.acc.number_hash(store.scope as u64);
            }
            AnyInstr::MAlloca(alloca) => {
                self.hash.acc.tag(FieldTag::AllocaInst);
                self.hash.opt_number(alloca.alignment.map(u64::from));
            }
            AnyInstr::MGetElementPtr(gep) => {
                self.hash.acc.tag(FieldTag::GetElementPtrInst);
                self.hash.type_hash(gep.source_ty);
            }

            AnyInstr::AExtractValue(extract) => {
                self.hash.acc.tag(FieldTag::ExtractValueInst);
                self.hash.acc.number_hash(extract.indices.len() as u64);
                for index in &extract.indices {
                    self.hash.acc.number_hash(u64::from(*index));
                }
            }
            AnyInstr::AInsertValue(insert) => {
                self.hash.acc.tag(FieldTag::InsertValueInst);
                self.hash.acc.number_hash(insert.indices.len() as u64);
                for index in &insert.indices {
                    self.hash.acc.number_hash(u64::from(*index));
                }
            }

            AnyInstr::Invoke(invoke) => {
                self.hash.acc.tag(FieldTag::InvokeInst);
                match invoke.cconv {
                    Some(cconv) => {
                        self.hash.acc.bool_hash(true);
                        self.hash.cconv_hash(cconv);
                    }
                    None => self.hash.acc.bool_hash(false),
                }
                self.hash.attr_list_hash(&invoke.attrs);
                self.operand_bundles_hash(&invoke.bundles);
            }
            AnyInstr::Phi(phi) => {
                self.hash.acc.tag(FieldTag::PhiInst);
                self.hash.acc.number_hash(phi.incoming.len() as u64);
                // Incoming values were hashed by the operand stage in
                // declared order; their predecessor blocks follow here in
                // the same order, which preserves the pairing.
                for (label, _) in &phi.incoming {
                    self.hash.value_hash((*label).into());
                }
            }
            AnyInstr::Select(_) => {
                self.hash.acc.tag(FieldTag::SelectInst);
            }
        }
    }

    /// Accumulate the hash of a block terminator: kind, operands, successor
    /// labels in canonical successor order, then any case literals.
    fn terminator_hash(&mut self, terminator: &Terminator) {
        self.hash.acc.tag(FieldTag::Terminator);
        let code: u64 = match terminator {
            Terminator::CBranch(_) => 0,
            Terminator::Jump(_) => 1,
            Terminator::Switch(_) => 2,
            Terminator::Ret(_) => 3,
            Terminator::Trap(_) => 4,
        };
        self.hash.acc.number_hash(code);

        self.hash.acc.number_hash(terminator.operands().count() as u64);
        for operand in terminator.operands() {
            self.hash.operand_hash(operand);
        }

        let targets: Vec<Label> = terminator.iter_targets().collect();
        self.hash.acc.number_hash(targets.len() as u64);
        for target in targets {
            self.hash.value_hash(target.into());
        }

        if let Terminator::Switch(switch) = terminator {
            // Case labels were hashed just above (default first, then cases
            // in declared order); the literals follow in the same order.
            for (case, _) in &switch.cases {
                self.hash.int_literal_hash(case);
            }
        }
    }

    /// Accumulate operand-bundle hashes: tag, bundle count, then per bundle
    /// its name and each bundle operand's hash.
    fn operand_bundles_hash(&mut self, bundles: &[OperandBundle]) {
        self.hash.acc.tag(FieldTag::OperandBundles);
        self.hash.acc.number_hash(bundles.len() as u64);
        for bundle in bundles {
            self.hash.acc.mem_hash(bundle.name.as_bytes());
            self.hash.acc.number_hash(bundle.operands.len() as u64);
            for operand in &bundle.operands {
                self.hash.operand_hash(operand);
            }
        }
    }
}
