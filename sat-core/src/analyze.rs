//! First-unique-implication-point (1-UIP) conflict analysis.
//!
//! Walks the implication graph backwards from the conflicting clause, resolving away every literal
//! assigned at the current decision level except the last one reached, which becomes the
//! asserting literal. No learned-clause minimization or proof bookkeeping is performed.
use sat_formula::Lit;

use crate::assignment::Trail;
use crate::clause::{ClauseId, ClauseStore};
use crate::variables::{Reason, VariableStore};
use crate::vsids::Vsids;

/// Resolves `conflict` backwards against the trail to its 1-UIP clause.
///
/// Returns the learned clause (the asserting literal last) and the level to backtrack to before
/// it can propagate: the second-highest level among its literals, or 0 if it has only one.
///
/// Must only be called with a conflict found above decision level 0; a conflict at level 0 has no
/// decision to analyze away from and is an unconditional UNSAT, for the caller to detect directly.
pub fn analyze(
    trail: &Trail,
    vars: &mut VariableStore,
    vsids: &mut Vsids,
    clauses: &ClauseStore,
    conflict: ClauseId,
) -> (Vec<Lit>, u32) {
    let current_level = trail.current_level();
    debug_assert!(current_level > 0, "a level-0 conflict is unconditional UNSAT");

    let mut seen = vec![false; vars.len()];
    let mut learned = Vec::new();
    let mut pending_at_current_level = 0u32;
    let mut trail_index = trail.trail().len();
    let mut resolving_clause = conflict;
    let mut pivot: Option<Lit> = None;

    loop {
        for &lit in clauses.literals(resolving_clause) {
            if pivot.map_or(false, |p| p.var() == lit.var()) {
                continue;
            }
            let var = lit.var();
            if seen[var.index()] {
                continue;
            }
            seen[var.index()] = true;

            let level = vars.level(var);
            if level == current_level {
                pending_at_current_level += 1;
            } else if level > 0 {
                learned.push(lit);
            }
        }

        loop {
            trail_index -= 1;
            let candidate = trail.trail()[trail_index];
            if seen[candidate.var().index()] {
                pivot = Some(candidate);
                break;
            }
        }

        let pivot_var = pivot.unwrap().var();
        seen[pivot_var.index()] = false;
        pending_at_current_level -= 1;
        if pending_at_current_level == 0 {
            break;
        }

        resolving_clause = match vars.reason(pivot_var) {
            Reason::Propagated(clause) => clause,
            Reason::Decision => unreachable!("a decision variable can never be a resolution pivot"),
        };
    }

    let asserting = !pivot.unwrap();
    let backtrack_level = learned
        .iter()
        .map(|lit| vars.level(lit.var()))
        .max()
        .unwrap_or(0);
    learned.push(asserting);

    for &lit in &learned {
        vsids.bump(vars, lit.var());
    }

    (learned, backtrack_level)
}
