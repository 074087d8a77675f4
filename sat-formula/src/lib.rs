//! Basic formula data types (literals, variables, CNF models) shared by the DIMACS parser and the
//! solver core.

/// Shortcut for tests: builds a `Lit` from a signed DIMACS integer.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lit {
    ($x:expr) => {
        $crate::lit::Lit::from_dimacs($x)
    };
}

/// Shortcut for tests: builds a `Var` from a 1-based DIMACS index.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! var {
    ($x:expr) => {
        $crate::lit::Var::from_dimacs($x)
    };
}

/// Shortcut for tests: builds an array of clauses as `&[Lit]` slices.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! cnf {
    ( $( $( $x:expr ),* );* ; ) => { [ $( &[ $( $crate::lit!( $x ) ),* ] as &[$crate::Lit] ),* ] };
}

/// Shortcut for tests: builds a `Model` from `cnf!`-style clause groups.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! cnf_model {
    ( $( $t:tt )* ) => { $crate::model::Model::from($crate::cnf![ $($t)* ].iter().cloned()) };
}

pub mod lit;
pub mod model;

#[cfg(any(test, feature = "internal-testing"))]
pub mod test;

pub use lit::{Lit, Polarity, Var};
pub use model::Model;
