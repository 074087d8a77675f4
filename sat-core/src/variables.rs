//! The variable store: one record per variable, laid out as parallel dense vectors.
use sat_formula::{Lit, Var};

use crate::clause::ClauseId;
use crate::store::{Id, IdAllocator};

/// Marker type scoping [`Id`]s to the variable store.
pub enum VarKind {}

/// A stable id into the variable store.
///
/// Variables are never erased once created (this solver has no variable elimination), so in
/// practice `VarId::slot()` always equals the corresponding `Var::index()`; the id type still goes
/// through the same generation-tagged allocator as the clause store; for completeness and for
/// elbow room for future variable elimination, not because it is exercised here.
pub type VarId = Id<VarKind>;

/// Why a variable has its current assignment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    /// The variable was set by a decision; it has no antecedent clause.
    Decision,
    /// The variable was forced by unit propagation on this clause.
    Propagated(ClauseId),
}

/// Per-variable record: canonical literal, assignment, and the VSIDS/implication-graph context
/// (activity, level, reason). An opaque `metadata` slot carries upstream-compiler provenance that
/// the solver itself never reads.
#[derive(Default)]
pub struct VariableStore {
    ids: IdAllocator<VarKind>,
    canonical_lit: Vec<Lit>,
    assignment: Vec<Option<bool>>,
    activity: Vec<f64>,
    level: Vec<u32>,
    reason: Vec<Reason>,
    metadata: Vec<u64>,
}

impl VariableStore {
    pub fn new() -> VariableStore {
        VariableStore::default()
    }

    /// Number of variables in the store.
    pub fn len(&self) -> usize {
        self.canonical_lit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical_lit.is_empty()
    }

    /// Inserts a fresh, unassigned variable record and returns its `Var`.
    pub fn insert(&mut self) -> Var {
        let (id, dense_index) = self.ids.insert();
        debug_assert_eq!(
            dense_index,
            id.slot() as usize,
            "variables are never erased, so slot and dense index must stay in lock-step"
        );

        let var = Var::from_index(dense_index);
        self.canonical_lit.push(var.positive());
        self.assignment.push(None);
        self.activity.push(0.0);
        self.level.push(0);
        self.reason.push(Reason::Decision);
        self.metadata.push(0);
        var
    }

    /// Grows the store with fresh variables until it holds (at least) `count` of them.
    pub fn set_var_count(&mut self, count: usize) {
        while self.len() < count {
            self.insert();
        }
    }

    /// Resolves a stable id back to the `Var` it names, or `None` if the id is stale.
    pub fn checked_var(&self, id: VarId) -> Option<Var> {
        self.ids.index(id).map(Var::from_index)
    }

    /// Iterator over every variable currently in the store.
    pub fn variables(&self) -> impl Iterator<Item = Var> {
        (0..self.len()).map(Var::from_index)
    }

    pub fn canonical_lit(&self, var: Var) -> Lit {
        self.canonical_lit[var.index()]
    }

    pub fn assignment(&self, var: Var) -> Option<bool> {
        self.assignment[var.index()]
    }

    /// Value of a literal under the current assignment: `Some(true)` if satisfied, `Some(false)`
    /// if falsified, `None` if free.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment(lit.var())
            .map(|value| value ^ lit.is_negative())
    }

    pub fn is_satisfied(&self, lit: Lit) -> bool {
        self.lit_value(lit) == Some(true)
    }

    pub fn is_falsified(&self, lit: Lit) -> bool {
        self.lit_value(lit) == Some(false)
    }

    pub fn is_free(&self, lit: Lit) -> bool {
        self.lit_value(lit).is_none()
    }

    pub fn level(&self, var: Var) -> u32 {
        self.level[var.index()]
    }

    pub fn reason(&self, var: Var) -> Reason {
        self.reason[var.index()]
    }

    pub fn activity(&self, var: Var) -> f64 {
        self.activity[var.index()]
    }

    pub fn metadata(&self, var: Var) -> u64 {
        self.metadata[var.index()]
    }

    pub fn set_metadata(&mut self, var: Var, value: u64) {
        self.metadata[var.index()] = value;
    }

    pub fn bump_activity(&mut self, var: Var, amount: f64) {
        self.activity[var.index()] += amount;
    }

    /// All activities, for the decay pass and for rescaling on overflow.
    pub fn activities_mut(&mut self) -> &mut [f64] {
        &mut self.activity
    }

    /// Records `lit` as satisfied at `level` for the given `reason`. The variable must currently
    /// be unassigned.
    pub fn assign(&mut self, lit: Lit, level: u32, reason: Reason) {
        debug_assert!(self.assignment(lit.var()).is_none());
        self.assignment[lit.var().index()] = Some(lit.is_positive());
        self.level[lit.var().index()] = level;
        self.reason[lit.var().index()] = reason;
    }

    /// Resets a variable to unassigned, as part of backtracking.
    pub fn unassign(&mut self, var: Var) {
        self.assignment[var.index()] = None;
        self.reason[var.index()] = Reason::Decision;
    }
}
