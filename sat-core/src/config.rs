//! Solver configuration.
use crate::error::ConfigError;

/// Configurable parameters used during solving.
///
/// All fields have defaults (see `SolverConfig::default`); validity is checked once, by
/// `SolverConfig::validate`, which `Solver::new` calls before doing any work.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Initial number of conflicts allowed between restarts. (Default: 100)
    pub restart_threshold: u32,
    /// Multiplicative growth factor applied to `restart_threshold` after each restart. (Default: 2)
    pub restart_multiplier: u32,
    /// Added to the activity of each variable in a learned clause. (Default: 10.0)
    pub vsids_increment: f64,
    /// Number of conflicts between VSIDS decay passes. (Default: 100)
    pub decay_interval: u32,
    /// Multiplicative decay applied to every activity each decay pass. (Default: 0.95)
    pub vsids_decay_ratio: f64,
    /// Seed for tie-breaking randomisation. Unused by the deterministic tie-break rule currently
    /// implemented, but part of the configuration surface for future use. (Default: 0)
    pub random_seed: u64,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            restart_threshold: 100,
            restart_multiplier: 2,
            vsids_increment: 10.0,
            decay_interval: 100,
            vsids_decay_ratio: 0.95,
            random_seed: 0,
        }
    }
}

impl SolverConfig {
    /// Checks that the configuration is internally consistent.
    ///
    /// Called by `Solver::new`; a solver is never constructed from an invalid configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.restart_threshold == 0 {
            return Err(ConfigError::RestartThresholdZero);
        }
        if self.restart_multiplier < 1 {
            return Err(ConfigError::RestartMultiplierTooSmall);
        }
        if self.decay_interval == 0 {
            return Err(ConfigError::DecayIntervalZero);
        }
        if !(self.vsids_decay_ratio > 0.0 && self.vsids_decay_ratio < 1.0) {
            return Err(ConfigError::DecayRatioOutOfRange {
                ratio: self.vsids_decay_ratio,
            });
        }
        if !(self.vsids_increment > 0.0) {
            return Err(ConfigError::VsidsIncrementNotPositive {
                increment: self.vsids_increment,
            });
        }
        Ok(())
    }
}
