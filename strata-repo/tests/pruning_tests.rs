//! Behavior of the pruning pass: the hit/miss scenario, idempotence, scope
//! rules for declarations and available-externally objects, target gating,
//! the missing-store no-op, and the missing-ticket contract violation.
mod common;

use std::collections::BTreeMap;

use common::*;
use strata_instr::{
    consts::{AnyConst, int::IConst},
    modules::{
        Linkage, Visibility,
        globals::{Aliasee, Comdat, ComdatKind, GlobalAlias, MdValue},
    },
    ticket::{Digest, Ticket},
    types::{TypeRegistry, primary::IType},
};
use strata_repo::{HashSession, MemoryIndex, prune_module};
use uuid::Uuid;

#[test]
fn hit_is_pruned_and_miss_is_untouched() {
    let registry = TypeRegistry::new([0; 6]);
    let mut module = repo_module("scenario");
    let mut session = HashSession::new();

    let mut f = increment_function("f", &registry);
    let d1 = digest_of(&f, &module, &registry, &mut session);
    f.ticket = Some(Ticket::new(d1));
    f.metadata
        .insert("source".to_string(), MdValue::Str("f.c".to_string()));
    f.comdat = Some(Comdat {
        name: "f".to_string(),
        kind: ComdatKind::Any,
    });
    let f_uuid = f.uuid;
    module.add_function(f);

    let mut g = load_function("g", &registry, Some(4));
    let d2 = digest_of(&g, &module, &registry, &mut session);
    g.ticket = Some(Ticket::new(d2));
    let g_uuid = g.uuid;
    module.add_function(g);

    // The store knows f's digest but not g's.
    let mut index = MemoryIndex::new();
    index.insert(d1);

    let stats = prune_module(&mut module, Some(&index));
    assert_eq!(stats.functions, 1);
    assert_eq!(stats.total(), 1);

    let f = &module.functions[&f_uuid];
    assert!(f.is_declaration(), "a pruned function loses its body");
    assert_eq!(f.linkage, Linkage::External);
    assert!(f.comdat.is_none(), "comdat grouping is dropped");
    assert!(f.metadata.is_empty(), "unrelated metadata is stripped");
    let ticket = f.ticket.as_ref().expect("the ticket survives pruning");
    assert!(ticket.pruned);
    assert_eq!(ticket.digest, d1, "the pruner never recomputes a ticket");

    let g = &module.functions[&g_uuid];
    assert!(!g.is_declaration(), "a store miss leaves the body in place");
    assert!(!g.ticket.as_ref().expect("ticket still attached").pruned);
}

#[test]
fn pruning_twice_changes_nothing() {
    let registry = TypeRegistry::new([0; 6]);
    let mut module = repo_module("idempotent");
    let mut session = HashSession::new();
    let i32_ty = registry.search_or_insert(IType::I32.into());

    let mut f = increment_function("f", &registry);
    let d_f = digest_of(&f, &module, &registry, &mut session);
    f.ticket = Some(Ticket::new(d_f));
    module.add_function(f);

    let mut v = variable_shell("v", i32_ty);
    v.initializer = Some(AnyConst::Int(IConst::from(5u32)));
    let d_v = strata_repo::VariableHasher::new(&v, &registry, &mut session).calculate(&module);
    v.ticket = Some(Ticket::new(d_v));
    let v_uuid = v.uuid;
    module.add_global(v);

    let alias = GlobalAlias {
        uuid: Uuid::new_v4(),
        name: "v_alias".to_string(),
        aliasee: Aliasee::Global(strata_instr::modules::operand::GlobalRef(v_uuid)),
        linkage: Linkage::External,
        visibility: Visibility::Default,
        metadata: BTreeMap::new(),
        ticket: Some(Ticket::new(d_v)),
    };
    module.add_alias(alias);

    let mut index = MemoryIndex::new();
    index.insert(d_f);
    index.insert(d_v);

    let first = prune_module(&mut module, Some(&index));
    assert_eq!(first.functions, 1);
    assert_eq!(first.variables, 1);
    assert_eq!(first.aliases, 1);

    let snapshot = module.clone();
    let second = prune_module(&mut module, Some(&index));
    assert!(second.is_unchanged(), "the second run must report nothing");
    assert_eq!(module, snapshot, "the second run must change nothing");
}

#[test]
fn declarations_and_available_externally_are_skipped() {
    let registry = TypeRegistry::new([0; 6]);
    let mut module = repo_module("scope");
    let mut session = HashSession::new();

    // A declaration carries no ticket; the pruner must skip it before the
    // ticket contract check.
    let declaration = function_shell("external_fn");
    let decl_uuid = declaration.uuid;
    module.add_function(declaration);

    let mut hint = increment_function("inline_hint", &registry);
    let d = digest_of(&hint, &module, &registry, &mut session);
    hint.ticket = Some(Ticket::new(d));
    hint.linkage = Linkage::AvailableExternally;
    let hint_uuid = hint.uuid;
    module.add_function(hint);

    let mut index = MemoryIndex::new();
    index.insert(d);

    let stats = prune_module(&mut module, Some(&index));
    assert!(stats.is_unchanged());

    assert!(module.functions[&decl_uuid].is_declaration());
    let hint = &module.functions[&hint_uuid];
    assert!(!hint.is_declaration());
    assert!(!hint.ticket.as_ref().expect("ticket kept").pruned);
}

#[test]
fn non_repo_targets_are_never_pruned() {
    let registry = TypeRegistry::new([0; 6]);
    let mut module =
        strata_instr::modules::Module::new("hosted", DATA_LAYOUT, HOSTED_TRIPLE);
    let mut session = HashSession::new();

    let mut f = increment_function("f", &registry);
    let d = digest_of(&f, &module, &registry, &mut session);
    f.ticket = Some(Ticket::new(d));
    let f_uuid = f.uuid;
    module.add_function(f);

    let mut index = MemoryIndex::new();
    index.insert(d);

    let stats = prune_module(&mut module, Some(&index));
    assert!(stats.is_unchanged());
    assert!(!module.functions[&f_uuid].is_declaration());
}

#[test]
fn missing_index_is_a_noop() {
    let registry = TypeRegistry::new([0; 6]);
    let mut module = repo_module("no_store");
    let mut session = HashSession::new();

    let mut f = increment_function("f", &registry);
    let d = digest_of(&f, &module, &registry, &mut session);
    f.ticket = Some(Ticket::new(d));
    let f_uuid = f.uuid;
    module.add_function(f);

    let stats = prune_module(&mut module, None);
    assert!(stats.is_unchanged());
    assert!(!module.functions[&f_uuid].is_declaration());

    // An empty index behaves the same: nothing matches, nothing changes.
    let empty = MemoryIndex::new();
    let stats = prune_module(&mut module, Some(&empty));
    assert!(stats.is_unchanged());
}

#[test]
fn pruned_variable_loses_initializer_but_keeps_ticket() {
    let registry = TypeRegistry::new([0; 6]);
    let mut module = repo_module("variables");
    let mut session = HashSession::new();
    let i32_ty = registry.search_or_insert(IType::I32.into());

    let mut v = variable_shell("v", i32_ty);
    v.initializer = Some(AnyConst::Int(IConst::from(9u32)));
    v.comdat = Some(Comdat {
        name: "v".to_string(),
        kind: ComdatKind::Largest,
    });
    v.metadata
        .insert("align_hint".to_string(), MdValue::Int(8));
    let d = strata_repo::VariableHasher::new(&v, &registry, &mut session).calculate(&module);
    v.ticket = Some(Ticket::new(d));
    let v_uuid = v.uuid;
    module.add_global(v);

    let mut index = MemoryIndex::new();
    index.insert(d);

    let stats = prune_module(&mut module, Some(&index));
    assert_eq!(stats.variables, 1);

    let v = &module.globals[&v_uuid];
    assert!(v.is_declaration());
    assert_eq!(v.linkage, Linkage::External);
    assert!(v.comdat.is_none());
    assert!(v.metadata.is_empty());
    let ticket = v.ticket.as_ref().expect("ticket survives");
    assert!(ticket.pruned);
    assert_eq!(ticket.digest, d);
}

#[test]
#[should_panic(expected = "carries no repository ticket")]
fn defined_object_without_ticket_is_a_contract_violation() {
    let registry = TypeRegistry::new([0; 6]);
    let mut module = repo_module("violation");

    // Defined, but nobody attached a ticket.
    let f = increment_function("f", &registry);
    module.add_function(f);

    let index = MemoryIndex::new();
    prune_module(&mut module, Some(&index));
}

#[test]
fn unrelated_digests_never_match() {
    let mut index = MemoryIndex::new();
    index.insert(Digest([1; 16]));
    let registry = TypeRegistry::new([0; 6]);
    let mut module = repo_module("mismatch");
    let mut session = HashSession::new();

    let mut f = increment_function("f", &registry);
    let d = digest_of(&f, &module, &registry, &mut session);
    f.ticket = Some(Ticket::new(d));
    let f_uuid = f.uuid;
    module.add_function(f);

    let stats = prune_module(&mut module, Some(&index));
    assert!(stats.is_unchanged());
    assert!(!module.functions[&f_uuid].is_declaration());
}
