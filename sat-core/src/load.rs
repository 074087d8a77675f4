//! Builds the mutable solver state — variables, clauses, watchlists, VSIDS activity and the trail
//! — from an immutable [`sat_formula::Model`].
use sat_formula::Model;

use crate::assignment::{enqueue_assignment, Trail};
use crate::clause::{ClauseId, ClauseStore, Watcher, WatchOutcome};
use crate::config::SolverConfig;
use crate::variables::{Reason, VariableStore};
use crate::vsids::Vsids;
use crate::watch::Watchlists;

/// Everything a solver needs to start searching: the stores initialized from a formula, plus any
/// conflict already present before propagation has run a single step.
pub struct LoadedFormula {
    pub vars: VariableStore,
    pub clauses: ClauseStore,
    pub watchlists: Watchlists,
    pub vsids: Vsids,
    pub trail: Trail,
    /// Set if some clause in the formula had no free literal at load time. Such a clause can never
    /// be noticed by the watchlist-driven propagator (it never gets watches installed), so the
    /// driver must check this before starting search and report UNSAT directly.
    pub root_conflict: Option<ClauseId>,
}

/// Builds a [`LoadedFormula`] from `model`, per `config`'s VSIDS parameters.
///
/// Bumps every variable's activity once per literal occurrence in the formula, matching the
/// initial-activity convention used by most VSIDS implementations: a variable's starting position
/// in the decision order reflects how often it appears. Each clause is then classified by
/// [`Watcher::build`]: a conflicting clause is recorded in `root_conflict` (the first one found; a
/// formula can have more than one but only the first is needed to report UNSAT); a unit clause has
/// its one free literal enqueued immediately, unless it already agrees or disagrees with an
/// earlier unit clause on the same formula, in which case it is a no-op or another root conflict; a
/// clause with two or more free literals gets its two watches registered.
pub fn from_model(model: &Model, config: &SolverConfig) -> LoadedFormula {
    let mut vars = VariableStore::new();
    vars.set_var_count(model.var_count());

    let mut watchlists = Watchlists::new();
    watchlists.set_var_count(model.var_count());

    let mut vsids = Vsids::new(config);
    vsids.set_var_count(&vars, model.var_count());

    let mut clauses = ClauseStore::new();
    let mut trail = Trail::new();
    let mut root_conflict = None;

    for clause in model.iter() {
        for &lit in clause {
            vsids.bump(&mut vars, lit.var());
        }

        let mut literals = clause.to_vec();
        match Watcher::build(&mut literals, &vars) {
            WatchOutcome::Conflict => {
                let id = clauses.insert(literals, false);
                root_conflict.get_or_insert(id);
            }
            WatchOutcome::Unit => {
                let id = clauses.insert(literals, false);
                let unit_lit = clauses.literals(id)[0];
                match vars.lit_value(unit_lit) {
                    Some(true) => {}
                    Some(false) => {
                        root_conflict.get_or_insert(id);
                    }
                    None => {
                        enqueue_assignment(
                            &mut trail,
                            &mut vars,
                            &mut vsids,
                            unit_lit,
                            Reason::Propagated(id),
                        );
                    }
                }
            }
            WatchOutcome::Watched => {
                let id = clauses.insert(literals, false);
                let lits = {
                    let installed = clauses.literals(id);
                    [installed[0], installed[1]]
                };
                watchlists.watch_clause(id, lits);
            }
        }
    }

    LoadedFormula {
        vars,
        clauses,
        watchlists,
        vsids,
        trail,
        root_conflict,
    }
}
