//! Learning parameters and the training schedule.
//!
//! Every tunable constant of the algorithm lives in [`XcsConfig`]. A single
//! immutable value is created up front and handed to every component by
//! reference. The defaults reproduce the classic parameter setting used for
//! the Boolean multiplexer.
//!
//! Both structs deserialize with `#[serde(default)]`, so a JSON file only
//! needs to mention the parameters it overrides:
//!
//! ```
//! use xcs_core::XcsConfig;
//!
//! let config: XcsConfig = serde_json::from_str(r#"{ "max_pop": 800, "mu": 0.01 }"#).unwrap();
//! assert_eq!(config.max_pop, 800);
//! assert_eq!(config.beta, 0.2);
//! ```

use serde::{Deserialize, Serialize};

use crate::XcsError;

/// Parameters of the XCS algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XcsConfig {
    /// Learning rate for prediction, error, action set size and fitness.
    pub beta: f64,
    /// Probability of a `#` per position when covering.
    pub p_hash: f64,
    /// Power used when converting error into accuracy.
    pub nu: f64,
    /// Probability of choosing the explore action selection mode.
    pub p_explore: f64,
    /// Maximum micro-population size (sum of numerosities).
    pub max_pop: u64,
    /// Whether offspring may be absorbed by their parents.
    pub do_ga_subsumption: bool,
    /// Time-stamp lag that triggers the genetic algorithm in an action set.
    pub theta_ga: f64,
    /// Crossover probability.
    pub chi: f64,
    /// Per-position and per-action mutation probability.
    pub mu: f64,
    /// Number of distinct actions.
    pub num_actions: usize,
    /// Error below which a classifier is considered accurate.
    pub error_zero: f64,
    /// Experience required before a classifier may subsume others.
    pub theta_sub: u64,
    /// Minimum match set size; defaults to `num_actions` when absent.
    pub theta_mna: Option<usize>,
    /// Lower bound on the adaptive learning rate.
    pub epsilon0: f64,
    /// Scale of the accuracy function for inaccurate classifiers.
    pub alpha: f64,
    /// Experience required before low fitness amplifies the deletion vote.
    pub theta_del: u64,
    /// Fraction of mean fitness under which the deletion vote is amplified.
    pub delta: f64,
    /// Discount factor for multi-step reward propagation.
    pub gamma: f64,
    /// Whether accurate general classifiers absorb the rest of their action set.
    pub do_action_set_subsumption: bool,
    /// Fitness of a newly covered classifier.
    pub fitness_i: f64,
    /// Prediction error of a newly covered classifier.
    pub initial_error: f64,
    /// Prediction of a newly covered classifier.
    pub initial_prediction: f64,
    /// Terminal reward at or above which an evaluation rollout counts as correct.
    pub success_reward: f64,
}

impl Default for XcsConfig {
    fn default() -> Self {
        Self {
            beta: 0.2,
            p_hash: 0.33,
            nu: 5.0,
            p_explore: 0.5,
            max_pop: 400,
            do_ga_subsumption: true,
            theta_ga: 50.0,
            chi: 0.8,
            mu: 0.04,
            num_actions: 2,
            error_zero: 10.0,
            theta_sub: 20,
            theta_mna: None,
            epsilon0: 0.001,
            alpha: 0.1,
            theta_del: 20,
            delta: 0.1,
            gamma: 0.71,
            do_action_set_subsumption: false,
            fitness_i: 0.0,
            initial_error: 0.0,
            initial_prediction: 0.0,
            success_reward: 1000.0,
        }
    }
}

impl XcsConfig {
    /// Minimum number of classifiers a match set must hold after covering.
    #[must_use]
    pub fn min_match_set_size(&self) -> usize {
        self.theta_mna.unwrap_or(self.num_actions)
    }

    /// Checks that every parameter is inside its valid range.
    ///
    /// `max_pop` must leave room for a full match set, otherwise the
    /// deletions triggered by covering would keep the set below `theta_mna`.
    pub fn validate(&self) -> Result<(), XcsError> {
        if self.num_actions == 0 {
            return Err(XcsError::invalid_config("num_actions must be at least 1"));
        }
        let min_size = self.min_match_set_size();
        if min_size == 0 {
            return Err(XcsError::invalid_config("theta_mna must be at least 1"));
        }
        if self.max_pop < u64::try_from(min_size).unwrap_or(u64::MAX) {
            return Err(XcsError::invalid_config(format!(
                "max_pop must be at least theta_mna ({min_size}), got {}",
                self.max_pop
            )));
        }
        if !(self.beta > 0.0 && self.beta <= 1.0) {
            return Err(XcsError::invalid_config(format!(
                "beta must be in (0, 1], got {}",
                self.beta
            )));
        }
        for (name, value) in [
            ("p_hash", self.p_hash),
            ("p_explore", self.p_explore),
            ("chi", self.chi),
            ("mu", self.mu),
            ("delta", self.delta),
            ("gamma", self.gamma),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(XcsError::invalid_config(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.error_zero <= 0.0 || self.error_zero.is_nan() {
            return Err(XcsError::invalid_config(format!(
                "error_zero must be positive, got {}",
                self.error_zero
            )));
        }
        Ok(())
    }
}

/// How long to train and how often to measure progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    /// Number of learning episodes.
    pub episodes: usize,
    /// Evaluate after every `evaluation_interval` episodes (never after episode 0).
    /// Zero disables evaluation.
    pub evaluation_interval: usize,
    /// Number of exploit-only rollouts per evaluation.
    pub evaluation_episodes: usize,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            episodes: 80_001,
            evaluation_interval: 50,
            evaluation_episodes: 100,
        }
    }
}

impl Schedule {
    /// Returns `true` if an evaluation follows the given (zero-based) episode.
    #[must_use]
    pub fn evaluates_after(&self, episode: usize) -> bool {
        self.evaluation_interval != 0 && episode != 0 && episode % self.evaluation_interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = XcsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_match_set_size(), 2);
    }

    #[test]
    fn test_rejects_zero_actions() {
        let config = XcsConfig {
            num_actions: 0,
            ..XcsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(XcsError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_theta_mna_may_exceed_action_count() {
        let config = XcsConfig {
            theta_mna: Some(3),
            ..XcsConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = XcsConfig {
            theta_mna: Some(0),
            ..XcsConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_max_pop_below_match_set_size() {
        for max_pop in [0, 1] {
            let config = XcsConfig {
                max_pop,
                ..XcsConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("max_pop"), "{err}");
        }

        let config = XcsConfig {
            max_pop: 2,
            ..XcsConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = XcsConfig {
            max_pop: 2,
            theta_mna: Some(3),
            ..XcsConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_probability_out_of_range() {
        let config = XcsConfig {
            mu: 1.5,
            ..XcsConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mu"));
    }

    #[test]
    fn test_rejects_zero_beta() {
        let config = XcsConfig {
            beta: 0.0,
            ..XcsConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: XcsConfig =
            serde_json::from_str(r#"{ "gamma": 0.9, "theta_mna": 1 }"#).unwrap();
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.min_match_set_size(), 1);
        assert_eq!(config.max_pop, 400);

        let schedule: Schedule = serde_json::from_str(r#"{ "episodes": 10 }"#).unwrap();
        assert_eq!(schedule.episodes, 10);
        assert_eq!(schedule.evaluation_interval, 50);
    }

    #[test]
    fn test_evaluates_after() {
        let schedule = Schedule {
            episodes: 200,
            evaluation_interval: 50,
            evaluation_episodes: 10,
        };
        assert!(!schedule.evaluates_after(0));
        assert!(!schedule.evaluates_after(49));
        assert!(schedule.evaluates_after(50));
        assert!(schedule.evaluates_after(100));

        let disabled = Schedule {
            evaluation_interval: 0,
            ..schedule
        };
        assert!(!disabled.evaluates_after(50));
    }
}
