//! Repository pruning pass
//!
//! Removes the redundant definitions of a module: every defined global
//! object whose pre-attached ticket digest is already present in the
//! external digest index is destructively reduced to a bare external
//! reference, eliminating redundant storage and compilation work across
//! translation units. The real definition is expected to be resolved
//! externally against the canonical store entry.
//!
//! The pass never computes a ticket itself: a defined object without a
//! ticket is a contract violation and panics. Declarations and
//! available-externally objects are skipped, and a module with no index to
//! consult is left untouched.
use log::{debug, info};
use strata_instr::modules::{Linkage, Module};
use strata_instr::ticket::{Digest, Ticket};

use crate::index::DigestIndex;

/// Counts of pruned global objects, reported for observability.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneStats {
    pub functions: usize,
    pub variables: usize,
    pub aliases: usize,
}

impl PruneStats {
    /// Total number of pruned global objects.
    pub fn total(&self) -> usize {
        self.functions + self.variables + self.aliases
    }

    /// True if the pass left the module untouched.
    pub fn is_unchanged(&self) -> bool {
        self.total() == 0
    }
}

/// Whether `triple` designates repository-based (content-addressed) linking.
///
/// Pruning is only meaningful for such targets; for every other triple the
/// pass is a no-op.
pub fn is_repo_triple(triple: &str) -> bool {
    triple.rsplit('-').next() == Some("repo")
}

fn ticket_digest(ticket: Option<&Ticket>, kind: &str, name: &str) -> Digest {
    match ticket {
        Some(ticket) => ticket.digest,
        None => panic!(
            "{kind} `{name}` carries no repository ticket; tickets must be attached before the pruning pass runs, it never computes them itself"
        ),
    }
}

/// Prune every redundant definition of `module` against `index`.
///
/// A `None` index (store unavailable) makes the whole pass a no-op with zero
/// reported prunings, as does a non-repository target triple. The module is
/// fully pruned before this function returns; no caller can observe it
/// half-pruned.
pub fn prune_module(module: &mut Module, index: Option<&dyn DigestIndex>) -> PruneStats {
    let mut stats = PruneStats::default();

    if !is_repo_triple(&module.triple) {
        return stats;
    }
    let Some(index) = index else {
        return stats;
    };

    for global in module.globals.values_mut() {
        if global.is_declaration() || matches!(global.linkage, Linkage::AvailableExternally) {
            continue;
        }
        let digest = ticket_digest(global.ticket.as_ref(), "global variable", &global.name);
        if !index.exists(&digest) {
            continue;
        }

        global.comdat = None;
        // Remove all metadata; the ticket lives out-of-band and survives.
        global.metadata.clear();
        if let Some(ticket) = global.ticket.as_mut() {
            ticket.pruned = true;
        }
        global.initializer = None;
        global.linkage = Linkage::External;
        stats.variables += 1;
        debug!("pruned global variable `{}` ({digest})", global.name);
    }

    for function in module.functions.values_mut() {
        if function.is_declaration() || matches!(function.linkage, Linkage::AvailableExternally) {
            continue;
        }
        let digest = ticket_digest(function.ticket.as_ref(), "function", &function.name);
        if !index.exists(&digest) {
            continue;
        }

        function.comdat = None;
        function.metadata.clear();
        if let Some(ticket) = function.ticket.as_mut() {
            ticket.pruned = true;
        }
        function.body = None;
        function.linkage = Linkage::External;
        stats.functions += 1;
        debug!("pruned function `{}` ({digest})", function.name);
    }

    for alias in module.aliases.values_mut() {
        if matches!(alias.linkage, Linkage::AvailableExternally) {
            continue;
        }
        let digest = ticket_digest(alias.ticket.as_ref(), "global alias", &alias.name);
        // Aliases keep their aliasee when pruned, so the pruned flag is the
        // only marker distinguishing an already-processed alias.
        if alias.ticket.as_ref().is_some_and(|ticket| ticket.pruned) {
            continue;
        }
        if !index.exists(&digest) {
            continue;
        }

        alias.metadata.clear();
        if let Some(ticket) = alias.ticket.as_mut() {
            ticket.pruned = true;
        }
        alias.linkage = Linkage::External;
        stats.aliases += 1;
        debug!("pruned global alias `{}` ({digest})", alias.name);
    }

    if !stats.is_unchanged() {
        info!(
            "pruned module `{}`: {} functions, {} variables, {} aliases removed",
            module.name, stats.functions, stats.variables, stats.aliases
        );
    }

    stats
}
