//! Exploit-only progress measurement.
//!
//! Evaluation borrows the population immutably: no covering, no
//! reinforcement and no genetic algorithm take place, so measuring progress
//! never changes what is measured.

use serde::{Deserialize, Serialize};

use crate::{Environment, MatchSet, Population, PredictionArray, XcsConfig};

/// Outcome counts of a batch of evaluation rollouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub correct: usize,
    pub incorrect: usize,
}

impl EvaluationReport {
    /// Number of rollouts that reached an outcome.
    #[must_use]
    pub fn total(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Fraction of correct rollouts, or `None` if there were none.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn proportion_correct(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.correct as f64 / total as f64)
    }
}

/// Runs `episodes` rollouts choosing the best predicted action each step.
///
/// A rollout is correct if its terminal reward reaches
/// [`XcsConfig::success_reward`]. A stimulus no classifier matches ends the
/// rollout as incorrect.
pub fn evaluate<E>(
    population: &Population,
    env: &mut E,
    episodes: usize,
    config: &XcsConfig,
) -> EvaluationReport
where
    E: Environment + ?Sized,
{
    let mut report = EvaluationReport::default();
    for _ in 0..episodes {
        env.reset();
        while !env.is_at_terminal_state() {
            let observation = env.observe();
            let match_set = MatchSet::matching(population, &observation.attributes);
            let predictions = PredictionArray::new(population, &match_set, config.num_actions);
            let Some(action) = predictions.best_action() else {
                report.incorrect += 1;
                break;
            };
            let reward = env.effect(action);
            if env.is_at_terminal_state() {
                if reward >= config.success_reward {
                    report.correct += 1;
                } else {
                    report.incorrect += 1;
                }
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Classifier, Observation};

    /// Single-step task: reward 1000 for repeating the first attribute.
    struct Echo {
        attributes: Vec<u8>,
        next: u8,
        terminal: bool,
    }

    impl Echo {
        fn new() -> Self {
            Self {
                attributes: vec![0, 0],
                next: 0,
                terminal: false,
            }
        }
    }

    impl Environment for Echo {
        fn is_at_terminal_state(&self) -> bool {
            self.terminal
        }

        fn reset(&mut self) {
            self.terminal = false;
        }

        fn observe(&mut self) -> Observation {
            self.attributes = vec![self.next, 1];
            self.next ^= 1;
            Observation {
                attributes: self.attributes.clone(),
                ground_truth: usize::from(self.attributes[0]),
            }
        }

        fn effect(&mut self, action: usize) -> f64 {
            self.terminal = true;
            if action == usize::from(self.attributes[0]) {
                1000.0
            } else {
                0.0
            }
        }
    }

    fn rule(condition: &str, action: usize, prediction: f64) -> Classifier {
        let mut cl = Classifier::new(condition.parse().unwrap(), action, 0, &XcsConfig::default());
        cl.set_prediction(prediction);
        cl.set_fitness(1.0);
        cl
    }

    #[test]
    fn test_perfect_rules() {
        let population: Population = [
            rule("0#", 0, 1000.0),
            rule("0#", 1, 0.0),
            rule("1#", 1, 1000.0),
            rule("1#", 0, 0.0),
        ]
        .into_iter()
        .collect();
        let mut env = Echo::new();
        let report = evaluate(&population, &mut env, 10, &XcsConfig::default());
        assert_eq!(report, EvaluationReport { correct: 10, incorrect: 0 });
        assert_eq!(report.proportion_correct(), Some(1.0));
    }

    #[test]
    fn test_unmatched_stimulus_counts_incorrect() {
        let population: Population = [rule("0#", 0, 1000.0)].into_iter().collect();
        let mut env = Echo::new();
        let report = evaluate(&population, &mut env, 4, &XcsConfig::default());
        assert_eq!(report, EvaluationReport { correct: 2, incorrect: 2 });
        assert_eq!(report.proportion_correct(), Some(0.5));
        // Evaluation never covers.
        assert_eq!(population.len(), 1);
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(EvaluationReport::default().proportion_correct(), None);
    }
}
