//! Structural validation of hand-assembled functions and modules.
use std::collections::BTreeMap;

use strata_instr::{
    consts::int::IConst,
    modules::{
        BasicBlock, CallingConvention, Function, Linkage, Module, Visibility,
        control_flow::{Jump, Ret},
        int::{IAdd, IntegerSignedness, OverflowPolicy},
        operand::{Label, Name, Operand},
    },
    types::{TypeRegistry, primary::IType},
    utils::Error,
};
use uuid::Uuid;

fn function_shell(name: &str) -> Function {
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

fn add_instr(registry: &TypeRegistry, dest: Name, lhs: Operand, rhs: Operand) -> IAdd {
    let i32_ty = registry.search_or_insert(IType::I32.into());
    IAdd {
        dest,
        ty: i32_ty,
        lhs,
        rhs,
        signedness: IntegerSignedness::Signed,
        overflow: OverflowPolicy::Wrap,
    }
}

fn increment_function(registry: &TypeRegistry) -> Function {
    let i32_ty = registry.search_or_insert(IType::I32.into());
    let mut function = function_shell("increment");
    function.params = vec![(Name(0), i32_ty)];
    function.return_type = Some(i32_ty);

    let add = add_instr(
        registry,
        Name(1),
        Operand::Reg(Name(0)),
        Operand::Imm(IConst::from(1u32).into()),
    );
    function.body = Some(BTreeMap::from([(
        Label::NIL,
        BasicBlock {
            instructions: vec![add.into()],
            terminator: Ret {
                value: Some(Operand::Reg(Name(1))),
            }
            .into(),
        },
    )]));
    function
}

#[test]
fn well_formed_function_passes_ssa_check() {
    let registry = TypeRegistry::new([0; 6]);
    let function = increment_function(&registry);
    function.check_ssa().expect("well-formed SSA");

    let mut module = Module::new("m", "e-i64:64", "x86_64-unknown-linux-repo");
    module.add_function(function);
    module.verify().expect("module verifies");
}

#[test]
fn declarations_trivially_verify() {
    let function = function_shell("declared_elsewhere");
    assert!(function.is_declaration());
    function.check_ssa().expect("declarations have nothing to check");
}

#[test]
fn duplicate_destinations_are_rejected() {
    let registry = TypeRegistry::new([0; 6]);
    let mut function = increment_function(&registry);
    let entry = function
        .body
        .as_mut()
        .and_then(|body| body.get_mut(&Label::NIL))
        .expect("entry block");
    // Second definition of %1.
    let duplicate = add_instr(
        &registry,
        Name(1),
        Operand::Reg(Name(0)),
        Operand::Reg(Name(0)),
    );
    entry.instructions.push(duplicate.into());

    assert_eq!(
        function.check_ssa(),
        Err(Error::DuplicateSSAName { duplicate: Name(1) })
    );
}

#[test]
fn missing_entry_block_is_rejected() {
    let registry = TypeRegistry::new([0; 6]);
    let mut function = increment_function(&registry);
    let body = function.body.as_mut().expect("body present");
    let entry = body.remove(&Label::NIL).expect("entry block");
    body.insert(Label(3), entry);

    assert_eq!(function.check_ssa(), Err(Error::MissingEntryBlock));
}

#[test]
fn undefined_operands_are_rejected() {
    let registry = TypeRegistry::new([0; 6]);
    let mut function = increment_function(&registry);
    let entry = function
        .body
        .as_mut()
        .and_then(|body| body.get_mut(&Label::NIL))
        .expect("entry block");
    let stray = add_instr(
        &registry,
        Name(2),
        Operand::Reg(Name(40)),
        Operand::Reg(Name(0)),
    );
    entry.instructions.push(stray.into());

    assert_eq!(
        function.check_ssa(),
        Err(Error::UndefinedSSAName { undefined: Name(40) })
    );
}

#[test]
fn dangling_branch_targets_are_rejected() {
    let registry = TypeRegistry::new([0; 6]);
    let mut function = increment_function(&registry);
    let entry = function
        .body
        .as_mut()
        .and_then(|body| body.get_mut(&Label::NIL))
        .expect("entry block");
    entry.terminator = Jump { target: Label(9) }.into();

    assert_eq!(
        function.check_ssa(),
        Err(Error::UndefinedBasicBlock {
            function: "increment".to_string(),
            label: Label(9),
        })
    );
}

#[test]
fn next_available_name_skips_existing_definitions() {
    let registry = TypeRegistry::new([0; 6]);
    let function = increment_function(&registry);
    assert_eq!(function.next_available_name(), Name(2));
}
