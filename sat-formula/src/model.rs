//! The canonical in-memory representation of a CNF formula.
use std::cmp::max;
use std::fmt;
use std::iter::Extend;
use std::ops::Range;

use crate::lit::{Lit, Var};

/// A formula in conjunctive normal form (CNF), as produced by a CNF source (the DIMACS parser) and
/// consumed by the solver's store initialisation.
///
/// Equivalent to `Vec<Vec<Lit>>` but more efficient, as all literals live in a single buffer.
/// `variables()` enumerates the unique variable ids `1..=var_count()` that were actually declared
/// or referenced; `clauses` are kept in the order they were added (the order clauses appeared in
/// the input file, for parsed models).
#[derive(Default, Eq)]
pub struct Model {
    var_count: usize,
    literals: Vec<Lit>,
    clause_ranges: Vec<Range<usize>>,
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Model {
        Model::default()
    }

    /// Number of variables in the model.
    ///
    /// This also counts variables with no occurrence if a variable with a higher index is present.
    /// A vector of this length can be indexed with any variable index present in the model.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Increases the number of variables in the model.
    ///
    /// Does nothing if the parameter is less than the current variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = max(self.var_count, count)
    }

    /// Iterator over the variables `0..var_count()`.
    pub fn variables(&self) -> impl Iterator<Item = Var> {
        (0..self.var_count).map(Var::from_index)
    }

    /// Number of clauses in the model.
    pub fn len(&self) -> usize {
        self.clause_ranges.len()
    }

    /// Whether the model has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clause_ranges.is_empty()
    }

    /// Appends a clause to the model.
    pub fn add_clause<L>(&mut self, literals: impl IntoIterator<Item = L>)
    where
        Vec<Lit>: Extend<L>,
    {
        let begin = self.literals.len();
        self.literals.extend(literals);
        let end = self.literals.len();

        for &lit in self.literals[begin..end].iter() {
            self.var_count = max(lit.index() + 1, self.var_count);
        }

        self.clause_ranges.push(begin..end);
    }

    /// Iterator over all clauses, in input order.
    pub fn iter(&self) -> impl Iterator<Item = &[Lit]> {
        let literals = &self.literals;
        self.clause_ranges
            .iter()
            .map(move |range| &literals[range.clone()])
    }
}

/// Converts any iterable of `Lit` iterables into a `Model`.
impl<F, I, L> From<F> for Model
where
    F: IntoIterator<Item = I>,
    I: IntoIterator<Item = L>,
    Vec<Lit>: Extend<L>,
{
    fn from(formula: F) -> Model {
        let mut model = Model::new();
        for clause in formula {
            model.add_clause(clause);
        }
        model
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.var_count(), f)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Model) -> bool {
        self.var_count() == other.var_count()
            && self.clause_ranges.len() == other.clause_ranges.len()
            && self
                .clause_ranges
                .iter()
                .zip(other.clause_ranges.iter())
                .all(|(range_a, range_b)| {
                    self.literals[range_a.clone()] == other.literals[range_b.clone()]
                })
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    use crate::lit::strategy::lit;

    pub fn vec_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Vec<Vec<Lit>>> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        vars.prop_ind_flat_map(move |vars| {
            collection::vec(
                collection::vec(lit(0..vars), clause_len.clone()),
                clauses.clone(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{strategy::*, *};

    use proptest::*;

    #[test]
    fn simple_round_trip() {
        let input = cnf![
            1, 2, 3;
            -1, -2;
            7, 2;
            ;
            4, 5;
        ];

        let model = Model::from(input.iter().cloned());

        for (clause, &ref_clause) in model.iter().zip(input.iter()) {
            assert_eq!(clause, ref_clause);
        }

        assert_eq!(model.var_count(), 7);
    }

    proptest! {
        #[test]
        fn round_trip_from_vec(input in vec_formula(1..200usize, 0..1000, 0..10)) {
            let model = Model::from(input.iter().map(|clause| clause.iter().cloned()));

            for (clause, ref_clause) in model.iter().zip(input.iter()) {
                prop_assert_eq!(clause, &ref_clause[..]);
            }

            let var_count = input
                .iter()
                .flat_map(|clause| clause.iter().map(|lit| lit.index() + 1))
                .max()
                .unwrap_or(0);

            prop_assert_eq!(model.var_count(), var_count);
        }
    }
}
