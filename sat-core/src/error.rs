//! Error taxonomy for the solver core.
use sat_formula::Lit;
use thiserror::Error;

/// Invalid `SolverConfig`, detected at solver construction.
#[derive(Debug, Error, Copy, Clone, PartialEq)]
pub enum ConfigError {
    #[error("restart_threshold must be non-zero")]
    RestartThresholdZero,
    #[error("restart_multiplier must be at least 1")]
    RestartMultiplierTooSmall,
    #[error("decay_interval must be non-zero")]
    DecayIntervalZero,
    #[error("vsids_decay_ratio must be in (0, 1), got {ratio}")]
    DecayRatioOutOfRange { ratio: f64 },
    #[error("vsids_increment must be positive, got {increment}")]
    VsidsIncrementNotPositive { increment: f64 },
}

/// An internal invariant was violated while solving.
///
/// Carries a snapshot of the trail at the time of failure, for debugging; the solver is left in an
/// undefined state afterwards and must not be reused.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(
        "solver invariant violated: fixpoint reached with unsatisfied clauses and no decision \
         possible; trail at time of failure: {trail:?}"
    )]
    Stuck { trail: Vec<Lit> },
}
