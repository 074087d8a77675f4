//! Geometric restart scheduling.
//!
//! A restart abandons the current search path (backtracking to level 0) without learning anything
//! new, so that VSIDS activity gathered so far can steer a fresh set of decisions. The threshold
//! before the next restart grows geometrically: after each restart, multiply it by
//! `restart_multiplier`.
use crate::config::SolverConfig;

/// Tracks conflicts since the last restart against a growing threshold.
pub struct RestartPolicy {
    threshold: u32,
    multiplier: u32,
    conflicts_since_restart: u32,
}

impl RestartPolicy {
    pub fn new(config: &SolverConfig) -> RestartPolicy {
        RestartPolicy {
            threshold: config.restart_threshold,
            multiplier: config.restart_multiplier,
            conflicts_since_restart: 0,
        }
    }

    /// Call once per conflict. Returns whether a restart is due, resetting the counter (and
    /// growing the threshold for the next one) if so.
    pub fn record_conflict(&mut self) -> bool {
        self.conflicts_since_restart += 1;
        if self.conflicts_since_restart >= self.threshold {
            self.conflicts_since_restart = 0;
            self.threshold *= self.multiplier;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_at_threshold_and_grows_geometrically() {
        let config = SolverConfig {
            restart_threshold: 2,
            restart_multiplier: 3,
            ..SolverConfig::default()
        };
        let mut policy = RestartPolicy::new(&config);

        assert!(!policy.record_conflict());
        assert!(policy.record_conflict());

        assert!(!policy.record_conflict());
        assert!(!policy.record_conflict());
        assert!(!policy.record_conflict());
        assert!(policy.record_conflict());
    }

    #[test]
    fn multiplier_of_one_keeps_a_fixed_interval() {
        let config = SolverConfig {
            restart_threshold: 1,
            restart_multiplier: 1,
            ..SolverConfig::default()
        };
        let mut policy = RestartPolicy::new(&config);

        for _ in 0..5 {
            assert!(policy.record_conflict());
        }
    }
}
