//! The trail of assigned literals, and the two operations that move variables on and off it:
//! enqueueing a forced or decided assignment, and backtracking to an earlier decision level.
//!
//! The stores involved are threaded through as plain `&mut` references: nothing here needs more
//! than one store at a time to disagree about borrows.
use sat_formula::Lit;

use crate::variables::{Reason, VariableStore};
use crate::vsids::Vsids;

/// The sequence of assigned literals in assignment order, together with where each decision level
/// begins.
#[derive(Default)]
pub struct Trail {
    trail: Vec<Lit>,
    queue_head: usize,
    /// `decisions[i]` is the trail index of the first literal assigned at level `i + 1`.
    decisions: Vec<usize>,
}

impl Trail {
    pub fn new() -> Trail {
        Trail::default()
    }

    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// The current decision level: 0 before any decision has been made.
    pub fn current_level(&self) -> u32 {
        self.decisions.len() as u32
    }

    /// True once every literal on the trail has been handed to the propagator.
    pub fn fully_propagated(&self) -> bool {
        self.queue_head == self.trail.len()
    }

    /// Pops the next not-yet-propagated literal off the trail, if any.
    pub fn pop_queue(&mut self) -> Option<Lit> {
        if self.queue_head < self.trail.len() {
            let lit = self.trail[self.queue_head];
            self.queue_head += 1;
            Some(lit)
        } else {
            None
        }
    }

    /// Opens a new decision level, starting at the literal about to be pushed.
    pub fn new_decision_level(&mut self) {
        self.decisions.push(self.trail.len());
    }

    fn push(&mut self, lit: Lit) {
        self.trail.push(lit);
    }
}

/// Records `lit` as newly assigned at the trail's current decision level, for `reason`, and
/// removes its variable from the VSIDS heap of decidable variables: assigned variables, whether by
/// decision or by propagation, are never decision candidates.
pub fn enqueue_assignment(
    trail: &mut Trail,
    vars: &mut VariableStore,
    vsids: &mut Vsids,
    lit: Lit,
    reason: Reason,
) {
    vars.assign(lit, trail.current_level(), reason);
    vsids.remove(vars, lit.var());
    trail.push(lit);
}

/// Undoes every assignment made at a decision level greater than `level`, returning the affected
/// variables to the VSIDS heap, and rewinds the trail (including the propagation queue pointer) to
/// the state it had at the start of `level + 1`.
pub fn backtrack(trail: &mut Trail, vars: &mut VariableStore, vsids: &mut Vsids, level: u32) {
    if level >= trail.current_level() {
        return;
    }

    let cutoff = trail.decisions[level as usize];
    for &lit in &trail.trail[cutoff..] {
        vars.unassign(lit.var());
        vsids.make_available(vars, lit.var());
    }

    trail.trail.truncate(cutoff);
    trail.decisions.truncate(level as usize);
    trail.queue_head = trail.queue_head.min(trail.trail.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::SolverConfig;

    use sat_formula::Var;

    #[test]
    fn enqueue_removes_from_vsids_and_extends_trail() {
        let mut trail = Trail::new();
        let mut vars = VariableStore::new();
        let a = vars.insert();
        let mut vsids = Vsids::new(&SolverConfig::default());
        vsids.set_var_count(&vars, 1);

        enqueue_assignment(&mut trail, &mut vars, &mut vsids, a.positive(), Reason::Decision);

        assert_eq!(trail.trail(), &[a.positive()]);
        assert!(vars.is_satisfied(a.positive()));
        assert_eq!(vsids.next(&vars), None);
    }

    #[test]
    fn backtrack_unwinds_to_target_level_and_restores_vsids() {
        let mut trail = Trail::new();
        let mut vars = VariableStore::new();
        let a = vars.insert();
        let b = vars.insert();
        let c = vars.insert();
        let mut vsids = Vsids::new(&SolverConfig::default());
        vsids.set_var_count(&vars, 3);

        enqueue_assignment(&mut trail, &mut vars, &mut vsids, a.positive(), Reason::Decision);

        trail.new_decision_level();
        enqueue_assignment(&mut trail, &mut vars, &mut vsids, b.positive(), Reason::Decision);

        trail.new_decision_level();
        enqueue_assignment(&mut trail, &mut vars, &mut vsids, c.positive(), Reason::Decision);

        assert_eq!(trail.current_level(), 2);

        backtrack(&mut trail, &mut vars, &mut vsids, 1);

        assert_eq!(trail.current_level(), 1);
        assert_eq!(trail.trail(), &[a.positive(), b.positive()]);
        assert!(vars.is_free(c.positive()));
        assert_eq!(vsids.next(&vars), Some(Var::from_index(2)));
    }

    #[test]
    fn queue_head_tracks_propagation_progress() {
        let mut trail = Trail::new();
        let mut vars = VariableStore::new();
        let a = vars.insert();
        let mut vsids = Vsids::new(&SolverConfig::default());
        vsids.set_var_count(&vars, 1);

        enqueue_assignment(&mut trail, &mut vars, &mut vsids, a.positive(), Reason::Decision);
        assert!(!trail.fully_propagated());
        assert_eq!(trail.pop_queue(), Some(a.positive()));
        assert!(trail.fully_propagated());
        assert_eq!(trail.pop_queue(), None);
    }
}
