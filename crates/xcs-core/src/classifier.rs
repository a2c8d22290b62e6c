use std::fmt;

use crate::{Condition, XcsConfig};

/// Offspring start with a tenth of their parent's fitness until they have
/// been evaluated in their own right.
const OFFSPRING_FITNESS_FACTOR: f64 = 0.1;

/// A condition-action rule together with its adaptive statistics.
///
/// A classifier is a *macro-classifier*: `numerosity` counts the identical
/// logical copies it stands for. All statistics are shared by those copies.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    condition: Condition,
    action: usize,
    prediction: f64,
    error: f64,
    fitness: f64,
    action_set_size: f64,
    numerosity: u32,
    experience: u64,
    time_stamp: u64,
}

impl Classifier {
    /// Creates a classifier with the initial statistics from `config`.
    #[must_use]
    pub fn new(condition: Condition, action: usize, time_stamp: u64, config: &XcsConfig) -> Self {
        Self {
            condition,
            action,
            prediction: config.initial_prediction,
            error: config.initial_error,
            fitness: config.fitness_i,
            action_set_size: 0.0,
            numerosity: 1,
            experience: 0,
            time_stamp,
        }
    }

    #[must_use]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    #[must_use]
    pub fn action(&self) -> usize {
        self.action
    }

    /// Predicted payoff.
    #[must_use]
    pub fn prediction(&self) -> f64 {
        self.prediction
    }

    /// Estimated mean absolute deviation of the prediction.
    #[must_use]
    pub fn error(&self) -> f64 {
        self.error
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Moving average of the sizes of the action sets this classifier joined.
    #[must_use]
    pub fn action_set_size(&self) -> f64 {
        self.action_set_size
    }

    #[must_use]
    pub fn numerosity(&self) -> u32 {
        self.numerosity
    }

    /// Number of reinforcement updates received.
    #[must_use]
    pub fn experience(&self) -> u64 {
        self.experience
    }

    /// Step of the last genetic algorithm run in an action set containing
    /// this classifier.
    #[must_use]
    pub fn time_stamp(&self) -> u64 {
        self.time_stamp
    }

    /// Returns `true` if `self` and `other` have the same condition and action.
    #[must_use]
    pub fn is_same_rule(&self, other: &Self) -> bool {
        self.action == other.action && self.condition == other.condition
    }

    #[must_use]
    pub fn is_more_general_than(&self, other: &Self) -> bool {
        self.condition.is_more_general_than(&other.condition)
    }

    /// Returns `true` if the classifier is experienced and accurate enough to
    /// absorb more specific classifiers.
    #[must_use]
    pub fn could_subsume(&self, config: &XcsConfig) -> bool {
        self.experience > config.theta_sub && self.error < config.error_zero
    }

    /// Returns `true` if `other` advocates the same action and `self` could
    /// stand in for it.
    #[must_use]
    pub fn does_subsume(&self, other: &Self, config: &XcsConfig) -> bool {
        self.action == other.action
            && self.could_subsume(config)
            && self.is_more_general_than(other)
    }

    /// Accuracy derived from the prediction error.
    #[must_use]
    pub fn accuracy(&self, config: &XcsConfig) -> f64 {
        if self.error < config.error_zero {
            1.0
        } else {
            config.alpha * (self.error / config.error_zero).powf(-config.nu)
        }
    }

    /// Weight of this classifier in deletion roulette selection.
    ///
    /// Proportional to the action set size estimate and numerosity, and
    /// amplified for experienced classifiers whose per-copy fitness is below
    /// `delta` times the population mean.
    #[must_use]
    pub fn deletion_vote(&self, mean_fitness: f64, config: &XcsConfig) -> f64 {
        let numerosity = f64::from(self.numerosity);
        let vote = self.action_set_size * numerosity;
        let fitness_per_copy = self.fitness / numerosity;
        if self.experience > config.theta_del && fitness_per_copy < config.delta * mean_fitness {
            vote * mean_fitness / fitness_per_copy
        } else {
            vote
        }
    }

    /// Creates an untested copy for reproduction.
    ///
    /// Numerosity restarts at one, experience at zero, and fitness is scaled
    /// down; prediction, error, action set size and time stamp are inherited.
    #[must_use]
    pub fn offspring(&self) -> Self {
        Self {
            numerosity: 1,
            experience: 0,
            fitness: self.fitness * OFFSPRING_FITNESS_FACTOR,
            ..self.clone()
        }
    }

    pub(crate) fn condition_mut(&mut self) -> &mut Condition {
        &mut self.condition
    }

    pub(crate) fn set_action(&mut self, action: usize) {
        self.action = action;
    }

    pub(crate) fn set_prediction(&mut self, prediction: f64) {
        self.prediction = prediction;
    }

    pub(crate) fn set_error(&mut self, error: f64) {
        self.error = error;
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    pub(crate) fn set_action_set_size(&mut self, action_set_size: f64) {
        self.action_set_size = action_set_size;
    }

    pub(crate) fn set_time_stamp(&mut self, time_stamp: u64) {
        self.time_stamp = time_stamp;
    }

    pub(crate) fn increment_experience(&mut self) -> u64 {
        self.experience += 1;
        self.experience
    }

    pub(crate) fn add_numerosity(&mut self, count: u32) {
        self.numerosity += count;
    }

    /// Removes one copy. Returns `false` if this was the last one, in which
    /// case the numerosity is left untouched and the caller must drop the record.
    pub(crate) fn remove_copy(&mut self) -> bool {
        if self.numerosity > 1 {
            self.numerosity -= 1;
            true
        } else {
            false
        }
    }
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --> {} [{:.3}; {:.3}]",
            self.condition, self.action, self.prediction, self.error
        )
    }
}
