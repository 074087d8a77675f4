//! The top-level solver driver: combines store initialisation, propagation, conflict analysis,
//! backtracking, VSIDS decisions and restarts into the `solve(N)` loop.
use log::{debug, info, warn};

use sat_formula::{Lit, Model};

use crate::assignment::{backtrack, enqueue_assignment, Trail};
use crate::clause::{ClauseStore, Watcher, WatchOutcome};
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::load::{self, LoadedFormula};
use crate::propagate::propagate;
use crate::restart::RestartPolicy;
use crate::stats::Stats;
use crate::variables::{Reason, VariableStore};
use crate::vsids::Vsids;
use crate::watch::Watchlists;

/// How many solutions a `solve` call should collect: a bounded count, or every solution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolveTarget {
    Count(u32),
    All,
}

impl From<u32> for SolveTarget {
    fn from(count: u32) -> SolveTarget {
        SolveTarget::Count(count)
    }
}

impl SolveTarget {
    fn is_satisfied_by(self, found: u32) -> bool {
        match self {
            SolveTarget::Count(n) => found >= n,
            SolveTarget::All => false,
        }
    }
}

/// A satisfying assignment: one literal per variable, carrying its final polarity.
///
/// Variables that never occur in any clause keep the positive phase by convention.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    literals: Vec<Lit>,
}

impl Solution {
    fn capture(vars: &VariableStore) -> Solution {
        let literals = vars
            .variables()
            .map(|var| match vars.assignment(var) {
                Some(true) => var.positive(),
                Some(false) => var.negative(),
                None => var.positive(),
            })
            .collect();
        Solution { literals }
    }

    /// The solution's literals, one per variable, in variable-index order.
    pub fn literals(&self) -> &[Lit] {
        &self.literals
    }
}

impl IntoIterator for Solution {
    type Item = Lit;
    type IntoIter = std::vec::IntoIter<Lit>;

    fn into_iter(self) -> Self::IntoIter {
        self.literals.into_iter()
    }
}

/// High-level outcome of a `solve` call, without the solutions payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SatState {
    Searching,
    Sat,
    Unsat,
}

/// A CDCL solver instance, owning every store the search needs.
///
/// Single-threaded cooperative: one `solve` call runs to completion with no internal suspension.
/// A solver that has reported `solver-error` must not be reused; every other state supports
/// further `solve` calls (e.g. requesting more solutions after an initial batch).
pub struct Solver {
    vars: VariableStore,
    clauses: ClauseStore,
    watchlists: Watchlists,
    vsids: Vsids,
    trail: Trail,
    restart: RestartPolicy,
    config: SolverConfig,
    stats: Stats,
    root_conflict: bool,
    state: SatState,
}

impl Solver {
    /// Builds a solver over `model`, validating `config` first: a `configuration-error` fails
    /// construction before any store is built.
    pub fn new(model: &Model, config: SolverConfig) -> Result<Solver, SolverError> {
        config.validate()?;

        let LoadedFormula {
            vars,
            clauses,
            watchlists,
            vsids,
            trail,
            root_conflict,
        } = load::from_model(model, &config);

        info!(
            "loaded formula with {} variables and {} clauses",
            vars.len(),
            clauses.len()
        );

        Ok(Solver {
            vars,
            clauses,
            watchlists,
            vsids,
            trail,
            restart: RestartPolicy::new(&config),
            config,
            stats: Stats::new(),
            root_conflict: root_conflict.is_some(),
            state: SatState::Searching,
        })
    }

    pub fn statistics(&self) -> Stats {
        self.stats
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Runs the search loop, collecting up to `requested` solutions.
    ///
    /// Returns an empty vector on UNSAT. `solve(0)` is a no-op: an immediate empty result, with no
    /// propagation or search performed at all.
    pub fn solve(&mut self, requested: impl Into<SolveTarget>) -> Result<Vec<Solution>, SolverError> {
        let requested = requested.into();
        if requested == SolveTarget::Count(0) {
            return Ok(vec![]);
        }

        if self.state == SatState::Unsat {
            return Ok(vec![]);
        }

        let mut solutions = Vec::new();

        if self.root_conflict {
            self.state = SatState::Unsat;
            info!("UNSAT");
            return Ok(solutions);
        }

        if self.propagate_and_count().is_some() {
            debug_assert_eq!(self.trail.current_level(), 0);
            self.state = SatState::Unsat;
            info!("UNSAT");
            return Ok(solutions);
        }

        loop {
            match self.propagate_and_count() {
                Some(conflict) => {
                    self.stats.conflicts += 1;

                    if self.trail.current_level() == 0 {
                        self.state = SatState::Unsat;
                        info!("UNSAT");
                        return Ok(solutions);
                    }

                    let (learned, backtrack_level) = crate::analyze::analyze(
                        &self.trail,
                        &mut self.vars,
                        &mut self.vsids,
                        &self.clauses,
                        conflict,
                    );
                    self.vsids.decay(&mut self.vars);

                    if learned.is_empty() {
                        self.state = SatState::Unsat;
                        info!("UNSAT");
                        return Ok(solutions);
                    }

                    backtrack(&mut self.trail, &mut self.vars, &mut self.vsids, backtrack_level);
                    self.stats.backtracks += 1;

                    let (id, asserting) = install_learned_clause(
                        &self.vars,
                        &mut self.clauses,
                        &mut self.watchlists,
                        learned,
                    );
                    self.stats.learned_clauses += 1;
                    debug!("learned clause {:?} backtracking to level {}", id, backtrack_level);

                    enqueue_assignment(
                        &mut self.trail,
                        &mut self.vars,
                        &mut self.vsids,
                        asserting,
                        Reason::Propagated(id),
                    );

                    if self.restart.record_conflict() {
                        self.stats.restarts += 1;
                        backtrack(&mut self.trail, &mut self.vars, &mut self.vsids, 0);
                        debug!("restart #{}", self.stats.restarts);
                    }
                }
                None => {
                    if let Some(var) = self.vsids.next(&self.vars) {
                        self.trail.new_decision_level();
                        self.stats.decisions += 1;
                        self.stats.note_decision_level(self.trail.current_level());
                        enqueue_assignment(
                            &mut self.trail,
                            &mut self.vars,
                            &mut self.vsids,
                            var.positive(),
                            Reason::Decision,
                        );
                    } else if self.all_clauses_satisfied() {
                        let solution = Solution::capture(&self.vars);
                        solutions.push(solution.clone());
                        info!("found solution #{}", solutions.len());

                        // Block this solution (and backtrack to level 0) before ever returning,
                        // even if `requested` is already satisfied: a later `solve` call on the
                        // same solver resumes search from here, and it must not rediscover the
                        // same assignment.
                        backtrack(&mut self.trail, &mut self.vars, &mut self.vsids, 0);
                        self.stats.backtracks += 1;
                        let exhausted = !self.block_solution(&solution);

                        if exhausted {
                            // The blocking clause conflicts immediately at level 0: every
                            // variable was already pinned by root propagation, so the search
                            // space is exhausted and no further solution can differ from this one.
                            // This takes priority over `requested` being already satisfied: a
                            // later `solve` call must see `Unsat` and short-circuit, rather than
                            // resuming into a solver with an unregistered conflicting clause.
                            self.state = SatState::Unsat;
                            return Ok(solutions);
                        }

                        if requested.is_satisfied_by(solutions.len() as u32) {
                            self.state = SatState::Sat;
                            return Ok(solutions);
                        }
                    } else {
                        warn!("fixpoint reached with unsatisfied clauses and no decision possible");
                        return Err(SolverError::Stuck {
                            trail: self.trail.trail().to_vec(),
                        });
                    }
                }
            }
        }
    }

    fn propagate_and_count(&mut self) -> Option<crate::clause::ClauseId> {
        let before = self.trail.trail().len();
        let conflict = propagate(
            &mut self.trail,
            &mut self.vars,
            &mut self.vsids,
            &mut self.clauses,
            &mut self.watchlists,
        );
        self.stats.propagations += (self.trail.trail().len() - before) as u64;
        conflict
    }

    fn all_clauses_satisfied(&self) -> bool {
        self.clauses
            .ids()
            .all(|id| is_clause_satisfied(&self.vars, self.clauses.literals(id)))
    }

    /// Adds the blocking clause for `solution`: the disjunction of each variable's negated current
    /// literal, so the same assignment can never satisfy the formula again.
    ///
    /// Must be called after backtracking to level 0, so the clause's watches are built against the
    /// variables propagation actually left free at the root. Returns `false` if the clause
    /// conflicts immediately (every variable was already pinned at level 0), meaning the search
    /// space is exhausted.
    fn block_solution(&mut self, solution: &Solution) -> bool {
        let literals: Vec<Lit> = solution.literals().iter().map(|&lit| !lit).collect();
        let (id, outcome) =
            install_clause(&self.vars, &mut self.clauses, &mut self.watchlists, literals, false);

        match outcome {
            WatchOutcome::Conflict => false,
            WatchOutcome::Unit => {
                let asserting = self.clauses.literals(id)[0];
                enqueue_assignment(
                    &mut self.trail,
                    &mut self.vars,
                    &mut self.vsids,
                    asserting,
                    Reason::Propagated(id),
                );
                true
            }
            WatchOutcome::Watched => true,
        }
    }
}

/// Installs a clause learned by conflict analysis, with `learned`'s asserting literal last (as
/// [`crate::analyze::analyze`] returns it).
///
/// Unlike [`install_clause`], this does not call [`Watcher::build`]: right after the backjump to
/// its assertion level, a 1-UIP clause always has exactly its asserting literal free and every
/// other literal falsified, so a generic free-literal scan would always classify it as unit and
/// never register it in the watchlists. That would be correct for *this* decision level, but the
/// clause must survive future restarts and backjumps below its assertion level, at which point its
/// asserting literal can become unassigned again and the clause needs its two-watch invariant to
/// pick the fact back up through ordinary propagation.
///
/// So the two watches are chosen deliberately: the asserting literal (currently free), and, among
/// the rest, the one whose variable was assigned last (highest decision level) — the one most
/// likely to become unassigned next as the trail unwinds further, which keeps the watched pair
/// meaningful across restarts. Returns the clause's id and its asserting literal, which the caller
/// must still enqueue: this function only installs watches, it does not touch the trail.
fn install_learned_clause(
    vars: &VariableStore,
    clauses: &mut ClauseStore,
    watchlists: &mut Watchlists,
    mut learned: Vec<Lit>,
) -> (crate::clause::ClauseId, Lit) {
    let asserting_index = learned.len() - 1;
    learned.swap(0, asserting_index);

    if learned.len() > 1 {
        let (second_index, _) = learned[1..]
            .iter()
            .enumerate()
            .max_by_key(|(_, lit)| vars.level(lit.var()))
            .expect("non-empty slice");
        learned.swap(1, 1 + second_index);
    }

    let asserting = learned[0];
    let id = clauses.insert(learned, true);

    if clauses.literals(id).len() >= 2 {
        let installed = clauses.literals(id);
        let lits = [installed[0], installed[1]];
        watchlists.watch_clause(id, lits);
    }

    (id, asserting)
}

fn is_clause_satisfied(vars: &VariableStore, literals: &[Lit]) -> bool {
    literals.iter().any(|&lit| vars.is_satisfied(lit))
}

/// Builds watches for `literals` (as `load::from_model` does for input clauses) and registers the
/// clause in the store, returning its id and the watch outcome.
fn install_clause(
    vars: &VariableStore,
    clauses: &mut ClauseStore,
    watchlists: &mut Watchlists,
    mut literals: Vec<Lit>,
    learned: bool,
) -> (crate::clause::ClauseId, WatchOutcome) {
    let outcome = Watcher::build(&mut literals, vars);
    let id = clauses.insert(literals, learned);

    if outcome == WatchOutcome::Watched {
        let installed = clauses.literals(id);
        let lits = [installed[0], installed[1]];
        watchlists.watch_clause(id, lits);
    }

    (id, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::*;

    use sat_formula::cnf_model;
    use sat_formula::test::{sat_model, sgen_unsat_model};

    fn solve_all(model: &Model) -> Vec<Solution> {
        let mut solver = Solver::new(model, SolverConfig::default()).unwrap();
        solver.solve(SolveTarget::All).unwrap()
    }

    #[test]
    fn single_variable_unit_clause_is_sat() {
        let model = cnf_model![1;];
        let solutions = solve_all(&model);
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].literals(), &[Lit::from_dimacs(1)]);
    }

    #[test]
    fn contradictory_unit_clauses_are_unsat() {
        let model = cnf_model![1; -1;];
        let solutions = solve_all(&model);
        assert!(solutions.is_empty());
    }

    #[test]
    fn two_clauses_yield_two_solutions() {
        let model = cnf_model![1; -1, -2;];
        let solutions = solve_all(&model);
        assert_eq!(solutions.len(), 2);
        for solution in &solutions {
            assert_eq!(solution.literals()[0], Lit::from_dimacs(1));
            assert_eq!(solution.literals()[1], Lit::from_dimacs(-2));
        }
        let polarities: std::collections::HashSet<bool> = solutions
            .iter()
            .map(|s| s.literals()[2].is_positive())
            .collect();
        assert_eq!(polarities.len(), 2);
    }

    #[test]
    fn three_clauses_yield_one_solution() {
        let model = cnf_model![1, 2; 3, -2; -3;];
        let solutions = solve_all(&model);
        assert_eq!(solutions.len(), 1);
        assert_eq!(
            solutions[0].literals(),
            &[Lit::from_dimacs(1), Lit::from_dimacs(-2), Lit::from_dimacs(-3)]
        );
    }

    #[test]
    fn two_region_four_colour_encoding_has_twelve_solutions() {
        // Each of two regions picks exactly one of four colours; adjacent regions differ.
        // Variables 1..4 = region A colours, 5..8 = region B colours.
        let mut model = Model::new();
        model.add_clause(vec![
            Lit::from_dimacs(1),
            Lit::from_dimacs(2),
            Lit::from_dimacs(3),
            Lit::from_dimacs(4),
        ]);
        model.add_clause(vec![
            Lit::from_dimacs(5),
            Lit::from_dimacs(6),
            Lit::from_dimacs(7),
            Lit::from_dimacs(8),
        ]);
        for i in 1..=4 {
            for j in (i + 1)..=4 {
                model.add_clause(vec![Lit::from_dimacs(-i), Lit::from_dimacs(-j)]);
                model.add_clause(vec![
                    Lit::from_dimacs(-(4 + i)),
                    Lit::from_dimacs(-(4 + j)),
                ]);
            }
        }
        for i in 1..=4 {
            model.add_clause(vec![Lit::from_dimacs(-i), Lit::from_dimacs(-(4 + i))]);
        }

        let solutions = solve_all(&model);
        assert_eq!(solutions.len(), 12);
    }

    #[test]
    fn blocking_clauses_make_solve_n_match_a_prefix_of_solve_all() {
        let mut model = Model::new();
        model.add_clause(vec![Lit::from_dimacs(1), Lit::from_dimacs(2)]);
        model.add_clause(vec![Lit::from_dimacs(-1), Lit::from_dimacs(2)]);
        model.add_clause(vec![Lit::from_dimacs(1), Lit::from_dimacs(-2)]);

        let all = solve_all(&model);

        let mut solver = Solver::new(&model, SolverConfig::default()).unwrap();
        let first_n = solver.solve(all.len() as u32).unwrap();

        let mut all_sorted = all.clone();
        let mut first_n_sorted = first_n;
        all_sorted.sort_by(|a, b| a.literals().cmp(b.literals()));
        first_n_sorted.sort_by(|a, b| a.literals().cmp(b.literals()));
        assert_eq!(all_sorted, first_n_sorted);
    }

    #[test]
    fn solve_zero_is_a_no_op() {
        let model = cnf_model![1;];
        let mut solver = Solver::new(&model, SolverConfig::default()).unwrap();
        let solutions = solver.solve(0u32).unwrap();
        assert!(solutions.is_empty());
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut model = Model::new();
        model.add_clause(Vec::<Lit>::new());
        let solutions = solve_all(&model);
        assert!(solutions.is_empty());
    }

    #[test]
    fn unassigned_variable_defaults_to_positive() {
        let mut model = Model::new();
        model.add_clause(vec![Lit::from_dimacs(1)]);
        model.set_var_count(2);

        let solutions = solve_all(&model);
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].literals()[1], Lit::from_dimacs(2));
    }

    proptest! {
        #[test]
        fn satisfiable_instances_are_solved(
            model in sat_model(1..30usize, 1..60usize, 0.3..0.9, 0.3..0.7)
        ) {
            let mut solver = Solver::new(&model, SolverConfig::default()).unwrap();
            let solutions = solver.solve(1u32).unwrap();
            prop_assert_eq!(solutions.len(), 1);

            let assignment = &solutions[0];
            for clause in model.iter() {
                prop_assert!(clause
                    .iter()
                    .any(|&lit| assignment.literals()[lit.index()].is_positive() == lit.is_positive()));
            }
        }

        #[test]
        fn sgen_instances_are_unsatisfiable(model in sgen_unsat_model(1..6usize)) {
            let solutions = solve_all(&model);
            prop_assert!(solutions.is_empty());
        }
    }
}
