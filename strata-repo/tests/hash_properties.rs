//! End-to-end properties of the structural hashers: equality on structural
//! twins, sensitivity to every hashed field, alpha-invariance over local
//! names and block labels, global-identity discrimination, alias digest
//! inheritance, and target-context sensitivity.
mod common;

use std::collections::BTreeMap;

use common::*;
use strata_instr::{
    consts::{AnyConst, int::IConst},
    modules::{
        BasicBlock, CallingConvention, Function, Module,
        control_flow::{CBranch, Jump, Ret},
        globals::{Aliasee, FnAttr, FnAttrKind, GlobalAlias},
        instructions::AnyInstr,
        int::{IAdd, ISub, IntegerSignedness, OverflowPolicy},
        operand::{Label, Name, Operand},
    },
    ticket::Ticket,
    types::{TypeRegistry, aggregate::StructType, primary::IType},
};
use strata_repo::{AliasHasher, HashSession, VariableHasher};
use uuid::Uuid;

#[test]
fn structural_twins_hash_equal() {
    let registry = TypeRegistry::new([0; 6]);
    let module = repo_module("twins");
    let mut session = HashSession::new();

    let f = increment_function("f", &registry);
    let g = increment_function("g", &registry);

    // Different UUIDs and names, identical structure.
    assert_ne!(f.uuid, g.uuid);
    assert_eq!(
        digest_of(&f, &module, &registry, &mut session),
        digest_of(&g, &module, &registry, &mut session),
    );
}

#[test]
fn opcode_change_flips_digest() {
    let registry = TypeRegistry::new([0; 6]);
    let module = repo_module("opcode");
    let mut session = HashSession::new();

    let f = increment_function("f", &registry);
    let mut g = increment_function("g", &registry);
    let body = g.body.as_mut().expect("g has a body");
    let entry = body.get_mut(&Label::NIL).expect("entry block");
    let AnyInstr::IAdd(add) = entry.instructions[0].clone() else {
        panic!("expected the increment to be an integer add");
    };
    entry.instructions[0] = ISub {
        dest: add.dest,
        ty: add.ty,
        lhs: add.lhs,
        rhs: add.rhs,
        signedness: add.signedness,
        overflow: add.overflow,
    }
    .into();

    assert_ne!(
        digest_of(&f, &module, &registry, &mut session),
        digest_of(&g, &module, &registry, &mut session),
    );
}

#[test]
fn operand_order_flips_digest() {
    let registry = TypeRegistry::new([0; 6]);
    let module = repo_module("operands");
    let mut session = HashSession::new();

    let f = increment_function("f", &registry);
    let mut g = increment_function("g", &registry);
    let entry = g
        .body
        .as_mut()
        .and_then(|body| body.get_mut(&Label::NIL))
        .expect("entry block");
    if let AnyInstr::IAdd(add) = &mut entry.instructions[0] {
        std::mem::swap(&mut add.lhs, &mut add.rhs);
    }

    assert_ne!(
        digest_of(&f, &module, &registry, &mut session),
        digest_of(&g, &module, &registry, &mut session),
    );
}

#[test]
fn literal_change_flips_digest() {
    let registry = TypeRegistry::new([0; 6]);
    let module = repo_module("literal");
    let mut session = HashSession::new();

    let f = increment_function("f", &registry);
    let mut g = increment_function("g", &registry);
    let entry = g
        .body
        .as_mut()
        .and_then(|body| body.get_mut(&Label::NIL))
        .expect("entry block");
    if let AnyInstr::IAdd(add) = &mut entry.instructions[0] {
        add.rhs = Operand::Imm(IConst::from(2u32).into());
    }

    assert_ne!(
        digest_of(&f, &module, &registry, &mut session),
        digest_of(&g, &module, &registry, &mut session),
    );
}

#[test]
fn alignment_change_flips_digest() {
    let registry = TypeRegistry::new([0; 6]);
    let module = repo_module("alignment");
    let mut session = HashSession::new();

    let four = load_function("f", &registry, Some(4));
    let eight = load_function("g", &registry, Some(8));
    let none = load_function("h", &registry, None);

    let d_four = digest_of(&four, &module, &registry, &mut session);
    let d_eight = digest_of(&eight, &module, &registry, &mut session);
    let d_none = digest_of(&none, &module, &registry, &mut session);

    assert_ne!(d_four, d_eight);
    assert_ne!(d_four, d_none);
    assert_ne!(d_eight, d_none);
}

#[test]
fn calling_convention_flips_digest() {
    let registry = TypeRegistry::new([0; 6]);
    let module = repo_module("cconv");
    let mut session = HashSession::new();

    let f = increment_function("f", &registry);
    let mut g = increment_function("g", &registry);
    g.cconv = CallingConvention::Fast;

    assert_ne!(
        digest_of(&f, &module, &registry, &mut session),
        digest_of(&g, &module, &registry, &mut session),
    );
}

#[test]
fn attribute_change_flips_digest() {
    let registry = TypeRegistry::new([0; 6]);
    let module = repo_module("attrs");
    let mut session = HashSession::new();

    let f = increment_function("f", &registry);
    let mut g = increment_function("g", &registry);
    g.attrs.push(FnAttr::Enum(FnAttrKind::Cold));

    assert_ne!(
        digest_of(&f, &module, &registry, &mut session),
        digest_of(&g, &module, &registry, &mut session),
    );
}

#[test]
fn renaming_locals_preserves_digest() {
    let registry = TypeRegistry::new([0; 6]);
    let module = repo_module("alpha");
    let mut session = HashSession::new();
    let i32_ty = registry.search_or_insert(IType::I32.into());

    let f = increment_function("f", &registry);

    // Same structure with wildly different SSA names, identical use order.
    let mut g = function_shell("g");
    g.params = vec![(Name(40), i32_ty)];
    g.return_type = Some(i32_ty);
    let add = IAdd {
        dest: Name(77),
        ty: i32_ty,
        lhs: Operand::Reg(Name(40)),
        rhs: Operand::Imm(IConst::from(1u32).into()),
        signedness: IntegerSignedness::Signed,
        overflow: OverflowPolicy::Wrap,
    };
    g.body = Some(BTreeMap::from([(
        Label::NIL,
        BasicBlock {
            instructions: vec![add.into()],
            terminator: Ret {
                value: Some(Operand::Reg(Name(77))),
            }
            .into(),
        },
    )]));

    assert_eq!(
        digest_of(&f, &module, &registry, &mut session),
        digest_of(&g, &module, &registry, &mut session),
    );
}

/// Entry jumps to a single follow-up block carrying the increment.
fn two_block_function(name: &str, registry: &TypeRegistry, then_label: Label) -> Function {
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
    function.body = Some(BTreeMap::from([
        (
            Label::NIL,
            BasicBlock {
                instructions: Vec::new(),
                terminator: Jump { target: then_label }.into(),
            },
        ),
        (
            then_label,
            BasicBlock {
                instructions: vec![add.into()],
                terminator: Ret {
                    value: Some(Operand::Reg(Name(1))),
                }
                .into(),
            },
        ),
    ]));
    function
}

#[test]
fn relabeling_blocks_preserves_digest() {
    let registry = TypeRegistry::new([0; 6]);
    let module = repo_module("labels");
    let mut session = HashSession::new();

    let f = two_block_function("f", &registry, Label(1));
    let g = two_block_function("g", &registry, Label(9));

    assert_eq!(
        digest_of(&f, &module, &registry, &mut session),
        digest_of(&g, &module, &registry, &mut session),
    );
}

/// Entry branches on its parameter; the taken order of the two return
/// blocks is the structure under test.
fn branch_function(
    name: &str,
    registry: &TypeRegistry,
    target_true: Label,
    target_false: Label,
) -> Function {
    let i32_ty = registry.search_or_insert(IType::I32.into());

    let mut function = function_shell(name);
    function.params = vec![(Name(0), i32_ty)];
    function.return_type = Some(i32_ty);

    function.body = Some(BTreeMap::from([
        (
            Label::NIL,
            BasicBlock {
                instructions: Vec::new(),
                terminator: CBranch {
                    cond: Operand::Reg(Name(0)),
                    target_true,
                    target_false,
                }
                .into(),
            },
        ),
        (
            target_true,
            BasicBlock {
                instructions: Vec::new(),
                terminator: Ret {
                    value: Some(Operand::Imm(IConst::from(1u32).into())),
                }
                .into(),
            },
        ),
        (
            target_false,
            BasicBlock {
                instructions: Vec::new(),
                terminator: Ret {
                    value: Some(Operand::Imm(IConst::from(2u32).into())),
                }
                .into(),
            },
        ),
    ]));
    function
}

#[test]
fn successor_order_is_structural() {
    let registry = TypeRegistry::new([0; 6]);
    let module = repo_module("successors");
    let mut session = HashSession::new();

    let f = branch_function("f", &registry, Label(1), Label(2));
    // Identical blocks under fresh labels: alpha-equivalent.
    let g = branch_function("g", &registry, Label(5), Label(7));
    assert_eq!(
        digest_of(&f, &module, &registry, &mut session),
        digest_of(&g, &module, &registry, &mut session),
    );

    // Swapping which successor returns 1 and which returns 2 is a real
    // structural change.
    let mut h = branch_function("h", &registry, Label(1), Label(2));
    if let Some(body) = h.body.as_mut() {
        let block_1 = body.remove(&Label(1)).expect("true block");
        let block_2 = body.remove(&Label(2)).expect("false block");
        body.insert(Label(1), block_2);
        body.insert(Label(2), block_1);
    }
    assert_ne!(
        digest_of(&f, &module, &registry, &mut session),
        digest_of(&h, &module, &registry, &mut session),
    );
}

#[test]
fn global_references_discriminate_by_identity() {
    let registry = TypeRegistry::new([0; 6]);
    let mut module = repo_module("globals");
    // One session across all three computations: global identity numbering
    // must span the functions being hashed together.
    let mut session = HashSession::new();

    // Two structurally identical callees.
    let t1 = module.add_function(increment_function("t1", &registry));
    let t2 = module.add_function(increment_function("t2", &registry));

    let calls_t1 = caller_function("calls_t1", &registry, t1);
    let calls_t2 = caller_function("calls_t2", &registry, t2);
    let also_calls_t1 = caller_function("also_calls_t1", &registry, t1);

    let d1 = digest_of(&calls_t1, &module, &registry, &mut session);
    let d2 = digest_of(&calls_t2, &module, &registry, &mut session);
    let d3 = digest_of(&also_calls_t1, &module, &registry, &mut session);

    assert_ne!(d1, d2, "distinct globals must stay distinguishable");
    assert_eq!(d1, d3, "references to the same global must agree");
}

#[test]
fn alias_digest_inherits_from_target() {
    let registry = TypeRegistry::new([0; 6]);
    let mut module = repo_module("aliases");
    let mut session = HashSession::new();
    let i32_ty = registry.search_or_insert(IType::I32.into());

    // Target with a pre-attached ticket: the alias must surface exactly the
    // ticket digest.
    let mut f = increment_function("f", &registry);
    let f_digest = digest_of(&f, &module, &registry, &mut session);
    f.ticket = Some(Ticket::new(f_digest));
    let f_ref = module.add_function(f);

    let alias_f = GlobalAlias {
        uuid: Uuid::new_v4(),
        name: "f_alias".to_string(),
        aliasee: Aliasee::Global(f_ref),
        linkage: strata_instr::modules::Linkage::External,
        visibility: strata_instr::modules::Visibility::Default,
        metadata: BTreeMap::new(),
        ticket: None,
    };
    assert_eq!(
        AliasHasher::new(&alias_f).calculate(&module, &registry, &mut session),
        f_digest,
    );

    // Target without a ticket: the alias digest is the target's computed
    // digest.
    let mut v = variable_shell("v", i32_ty);
    v.initializer = Some(AnyConst::Int(IConst::from(11u32)));
    let v_digest = VariableHasher::new(&v, &registry, &mut session).calculate(&module);
    let v_ref = module.add_global(v);

    let alias_v = GlobalAlias {
        uuid: Uuid::new_v4(),
        name: "v_alias".to_string(),
        aliasee: Aliasee::Global(v_ref),
        linkage: strata_instr::modules::Linkage::External,
        visibility: strata_instr::modules::Visibility::Default,
        metadata: BTreeMap::new(),
        ticket: None,
    };
    assert_eq!(
        AliasHasher::new(&alias_v).calculate(&module, &registry, &mut session),
        v_digest,
    );
}

#[test]
fn recursive_types_hash_deterministically() {
    let registry = TypeRegistry::new([0; 6]);
    let module = repo_module("recursive");
    let i32_ty = registry.search_or_insert(IType::I32.into());

    // A struct that mentions itself: the visited-path guard must cut the
    // recursion instead of diverging.
    let node = registry.reserve();
    registry
        .define(
            node,
            StructType {
                fields: vec![i32_ty, node],
                packed: false,
            }
            .into(),
        )
        .expect("recursive struct definition");

    let mut v = variable_shell("list_head", node);
    v.initializer = Some(AnyConst::Undef(node));

    let mut session = HashSession::new();
    let first = VariableHasher::new(&v, &registry, &mut session).calculate(&module);
    let mut session = HashSession::new();
    let second = VariableHasher::new(&v, &registry, &mut session).calculate(&module);

    assert_eq!(first, second, "recursive type hashing must be reproducible");
}

#[test]
fn target_context_flips_every_digest() {
    let registry = TypeRegistry::new([0; 6]);
    let mut session = HashSession::new();
    let i32_ty = registry.search_or_insert(IType::I32.into());

    let module_repo = repo_module("target_a");
    let module_hosted = Module::new("target_b", DATA_LAYOUT, HOSTED_TRIPLE);
    let module_layout = Module::new("target_c", "e-m:e-i64:64-n8:16:32:64-S128", REPO_TRIPLE);

    let f = increment_function("f", &registry);
    let d_repo = digest_of(&f, &module_repo, &registry, &mut session);
    let d_hosted = digest_of(&f, &module_hosted, &registry, &mut session);
    let d_layout = digest_of(&f, &module_layout, &registry, &mut session);

    assert_ne!(d_repo, d_hosted);
    assert_ne!(d_repo, d_layout);

    let mut v = variable_shell("v", i32_ty);
    v.initializer = Some(AnyConst::Int(IConst::from(3u32)));
    let v_repo = VariableHasher::new(&v, &registry, &mut session).calculate(&module_repo);
    let v_hosted = VariableHasher::new(&v, &registry, &mut session).calculate(&module_hosted);
    assert_ne!(v_repo, v_hosted);
}
