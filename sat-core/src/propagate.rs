//! Boolean constraint propagation: drains the trail's propagation queue against the watchlists
//! until a fixpoint is reached or a clause is found conflicting.
use std::mem;

use crate::assignment::{enqueue_assignment, Trail};
use crate::clause::{ClauseId, ClauseStore, Watcher, WatchOutcome};
use crate::variables::{Reason, VariableStore};
use crate::vsids::Vsids;
use crate::watch::{WatchEntry, Watchlists};

/// Propagates every literal currently queued on the trail.
///
/// Returns the id of a clause found conflicting, if any; on `None` the trail is fully propagated
/// (a fixpoint: every assigned literal's consequences have been applied).
pub fn propagate(
    trail: &mut Trail,
    vars: &mut VariableStore,
    vsids: &mut Vsids,
    clauses: &mut ClauseStore,
    watchlists: &mut Watchlists,
) -> Option<ClauseId> {
    while let Some(lit) = trail.pop_queue() {
        let mut entries = mem::take(watchlists.watched_by_mut(lit));
        let mut write = 0;
        let mut read = 0;
        let mut conflict = None;

        while read < entries.len() {
            let entry = entries[read];
            read += 1;

            if vars.is_satisfied(entry.blocking) {
                entries[write] = entry;
                write += 1;
                continue;
            }

            let leaving = lit.var();
            let literals = clauses.literals_mut(entry.clause);
            let slot = if literals[0].var() == leaving { 0 } else { 1 };

            match Watcher::replace(literals, vars, leaving) {
                WatchOutcome::Watched => {
                    let new_lit = literals[slot];
                    let blocking = literals[1 - slot];
                    watchlists.add_watch(
                        !new_lit,
                        WatchEntry {
                            clause: entry.clause,
                            blocking,
                        },
                    );
                }
                WatchOutcome::Unit => {
                    let unit_lit = literals[1 - slot];
                    entries[write] = entry;
                    write += 1;
                    if vars.is_free(unit_lit) {
                        enqueue_assignment(
                            trail,
                            vars,
                            vsids,
                            unit_lit,
                            Reason::Propagated(entry.clause),
                        );
                    }
                }
                WatchOutcome::Conflict => {
                    entries[write] = entry;
                    write += 1;
                    conflict = Some(entry.clause);
                    break;
                }
            }
        }

        while read < entries.len() {
            entries[write] = entries[read];
            write += 1;
            read += 1;
        }
        entries.truncate(write);
        *watchlists.watched_by_mut(lit) = entries;

        if conflict.is_some() {
            return conflict;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::SolverConfig;

    fn watch(clauses: &mut ClauseStore, watchlists: &mut Watchlists, vars: &VariableStore, mut literals: Vec<sat_formula::Lit>) {
        let outcome = Watcher::build(&mut literals, vars);
        assert_eq!(outcome, WatchOutcome::Watched, "test clauses must start with two free literals");
        let lits = [literals[0], literals[1]];
        let id = clauses.insert(literals, false);
        watchlists.watch_clause(id, lits);
    }

    #[test]
    fn chained_unit_propagation() {
        let mut vars = VariableStore::new();
        let a = vars.insert();
        let b = vars.insert();
        let c = vars.insert();
        vars.set_var_count(3);

        let mut clauses = ClauseStore::new();
        let mut watchlists = Watchlists::new();
        watchlists.set_var_count(3);

        watch(&mut clauses, &mut watchlists, &vars, vec![a.negative(), b.positive()]);
        watch(&mut clauses, &mut watchlists, &vars, vec![b.negative(), c.positive()]);

        let mut trail = Trail::new();
        let mut vsids = Vsids::new(&SolverConfig::default());
        vsids.set_var_count(&vars, 3);

        trail.new_decision_level();
        enqueue_assignment(&mut trail, &mut vars, &mut vsids, a.positive(), Reason::Decision);

        let conflict = propagate(&mut trail, &mut vars, &mut vsids, &mut clauses, &mut watchlists);

        assert!(conflict.is_none());
        assert!(vars.is_satisfied(b.positive()));
        assert!(vars.is_satisfied(c.positive()));
        assert!(trail.fully_propagated());
    }

    #[test]
    fn detects_conflict_between_two_unit_clauses() {
        let mut vars = VariableStore::new();
        let a = vars.insert();
        let b = vars.insert();
        vars.set_var_count(2);

        let mut clauses = ClauseStore::new();
        let mut watchlists = Watchlists::new();
        watchlists.set_var_count(2);

        watch(&mut clauses, &mut watchlists, &vars, vec![a.negative(), b.positive()]);
        let conflicting_clause = {
            let mut literals = vec![a.negative(), b.negative()];
            let outcome = Watcher::build(&mut literals, &vars);
            assert_eq!(outcome, WatchOutcome::Watched);
            let lits = [literals[0], literals[1]];
            let id = clauses.insert(literals, false);
            watchlists.watch_clause(id, lits);
            id
        };

        let mut trail = Trail::new();
        let mut vsids = Vsids::new(&SolverConfig::default());
        vsids.set_var_count(&vars, 2);

        trail.new_decision_level();
        enqueue_assignment(&mut trail, &mut vars, &mut vsids, a.positive(), Reason::Decision);

        let conflict = propagate(&mut trail, &mut vars, &mut vsids, &mut clauses, &mut watchlists);

        assert_eq!(conflict, Some(conflicting_clause));
    }
}
