//! Shared builders for the integration tests: small modules, functions, and
//! globals assembled by hand.
#![allow(dead_code)]

use std::collections::BTreeMap;

use strata_instr::{
    consts::int::IConst,
    modules::{
        BasicBlock, CallingConvention, Function, Linkage, Module, Visibility,
        control_flow::Ret,
        globals::GlobalVariable,
        int::{IAdd, IntegerSignedness, OverflowPolicy},
        mem::{MLoad, SyncScope},
        misc::Invoke,
        operand::{GlobalRef, Label, Name, Operand},
    },
    ticket::Digest,
    types::{TypeRegistry, Typeref, primary::IType},
};
use strata_repo::{FunctionHasher, HashSession};
use uuid::Uuid;

pub const REPO_TRIPLE: &str = "x86_64-unknown-linux-repo";
pub const HOSTED_TRIPLE: &str = "x86_64-unknown-linux-gnu";
pub const DATA_LAYOUT: &str = "e-m:e-i64:64-f80:128-n8:16:32:64-S128";

/// An empty module targeting repository-based linking.
pub fn repo_module(name: &str) -> Module {
    Module::new(name, DATA_LAYOUT, REPO_TRIPLE)
}

/// A function with every optional knob at its default and no body.
pub fn function_shell(name: &str) -> Function {
    Function {
        uuid: Uuid::new_v4(),
        name: name.to_string(),
        params: Vec::new(),
        return_type: None,
        is_vararg: false,
        cconv: CallingConvention::C,
        linkage: Linkage::External,
        visibility: Visibility::Default,
        attrs: Vec::new(),
        gc: None,
        section: None,
        personality: None,
        comdat: None,
        body: None,
        metadata: BTreeMap::new(),
        ticket: None,
    }
}

/// A global variable declaration with every optional knob at its default.
pub fn variable_shell(name: &str, ty: Typeref) -> GlobalVariable {
    GlobalVariable {
        uuid: Uuid::new_v4(),
        name: name.to_string(),
        ty,
        initializer: None,
        is_constant: false,
        alignment: None,
        linkage: Linkage::External,
        visibility: Visibility::Default,
        comdat: None,
        metadata: BTreeMap::new(),
        ticket: None,
    }
}

/// `fn(x: i32) -> i32 { x + 1 }`, the smallest interesting definition.
pub fn increment_function(name: &str, registry: &TypeRegistry) -> Function {
    let i32_ty = registry.search_or_insert(IType::I32.into());

    let mut function = function_shell(name);
    function.params = vec![(Name(0), i32_ty)];
    function.return_type = Some(i32_ty);

    let add = IAdd {
        dest: Name(1),
        ty: i32_ty,
        lhs: Operand::Reg(Name(0)),
        rhs: Operand::Imm(IConst::from(1u32).into()),
        signedness: IntegerSignedness::Signed,
        overflow: OverflowPolicy::Wrap,
    };
    let entry = BasicBlock {
        instructions: vec![add.into()],
        terminator: Ret {
            value: Some(Operand::Reg(Name(1))),
        }
        .into(),
    };
    function.body = Some(BTreeMap::from([(Label::NIL, entry)]));
    function
}

/// `fn(p: ptr) -> i32 { *p }` with a configurable load alignment.
pub fn load_function(name: &str, registry: &TypeRegistry, alignment: Option<u32>) -> Function {
    let i32_ty = registry.search_or_insert(IType::I32.into());
    let ptr_ty = registry.search_or_insert(
        strata_instr::types::primary::PtrType::DEFAULT.into(),
    );

    let mut function = function_shell(name);
    function.params = vec![(Name(0), ptr_ty)];
    function.return_type = Some(i32_ty);

    let load = MLoad {
        dest: Name(1),
        ty: i32_ty,
        addr: Operand::Reg(Name(0)),
        alignment,
        ordering: None,
        scope: SyncScope::CrossThread,
        volatile: false,
        range: None,
    };
    let entry = BasicBlock {
        instructions: vec![load.into()],
        terminator: Ret {
            value: Some(Operand::Reg(Name(1))),
        }
        .into(),
    };
    function.body = Some(BTreeMap::from([(Label::NIL, entry)]));
    function
}

/// `fn() -> i32 { target() }` for global-reference discrimination tests.
pub fn caller_function(name: &str, registry: &TypeRegistry, target: GlobalRef) -> Function {
    let i32_ty = registry.search_or_insert(IType::I32.into());

    let mut function = function_shell(name);
    function.return_type = Some(i32_ty);

    let call = Invoke {
        callee: Operand::Global(target),
        args: Vec::new(),
        dest: Some(Name(0)),
        ty: Some(i32_ty),
        cconv: None,
        attrs: Vec::new(),
        bundles: Vec::new(),
    };
    let entry = BasicBlock {
        instructions: vec![call.into()],
        terminator: Ret {
            value: Some(Operand::Reg(Name(0))),
        }
        .into(),
    };
    function.body = Some(BTreeMap::from([(Label::NIL, entry)]));
    function
}

/// Compute a function digest with the given session.
pub fn digest_of(
    function: &Function,
    module: &Module,
    registry: &TypeRegistry,
    session: &mut HashSession,
) -> Digest {
    FunctionHasher::new(function, registry, session).calculate(module)
}
