//! Prediction array and action selection.

use rand::{Rng, seq::IndexedRandom as _};

use crate::{MatchSet, Population, XcsError};

/// How the next action is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SelectionMode {
    /// Uniformly among the actions advocated by the match set.
    Explore,
    /// The action with the highest prediction, the lowest index on ties.
    Exploit,
}

impl SelectionMode {
    /// Draws [`Explore`](Self::Explore) with probability `p_explore`.
    pub fn draw<R>(p_explore: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        if rng.random_bool(p_explore) {
            Self::Explore
        } else {
            Self::Exploit
        }
    }
}

/// Fitness-weighted payoff estimate for each action present in a match set.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionArray {
    predictions: Vec<Option<f64>>,
}

impl PredictionArray {
    /// Aggregates `Σ prediction × fitness / Σ fitness` per action.
    ///
    /// Actions no classifier advocates are absent. Actions whose classifiers
    /// have zero total fitness are present with a prediction of `0.0`.
    #[must_use]
    pub fn new(population: &Population, match_set: &MatchSet, num_actions: usize) -> Self {
        let mut sums: Vec<Option<(f64, f64)>> = vec![None; num_actions];
        for cl in match_set.ids().iter().filter_map(|&id| population.get(id)) {
            if cl.action() >= sums.len() {
                sums.resize(cl.action() + 1, None);
            }
            let (weighted, fitness) = sums[cl.action()].get_or_insert((0.0, 0.0));
            *weighted += cl.prediction() * cl.fitness();
            *fitness += cl.fitness();
        }
        let predictions = sums
            .into_iter()
            .map(|sum| {
                sum.map(|(weighted, fitness)| {
                    if fitness > 0.0 {
                        weighted / fitness
                    } else {
                        0.0
                    }
                })
            })
            .collect();
        Self { predictions }
    }

    /// Prediction for `action`, or `None` if no classifier advocates it.
    #[must_use]
    pub fn get(&self, action: usize) -> Option<f64> {
        self.predictions.get(action).copied().flatten()
    }

    /// Actions advocated by the match set, in ascending order.
    pub fn actions(&self) -> impl Iterator<Item = usize> + '_ {
        self.predictions
            .iter()
            .enumerate()
            .filter_map(|(action, p)| p.map(|_| action))
    }

    /// The action with the highest prediction.
    ///
    /// Ties go to the lowest action index. The order in which classifiers
    /// appear in the match set plays no part.
    #[must_use]
    pub fn best_action(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (action, prediction) in self
            .predictions
            .iter()
            .enumerate()
            .filter_map(|(a, p)| p.map(|p| (a, p)))
        {
            if best.is_none_or(|(_, b)| prediction > b) {
                best = Some((action, prediction));
            }
        }
        best.map(|(action, _)| action)
    }

    /// Highest prediction, or `0.0` for an empty array.
    #[must_use]
    pub fn max_prediction(&self) -> f64 {
        self.best_action()
            .and_then(|action| self.get(action))
            .unwrap_or(0.0)
    }

    /// Picks an action according to `mode`.
    pub fn select_action<R>(&self, mode: SelectionMode, rng: &mut R) -> Result<usize, XcsError>
    where
        R: Rng + ?Sized,
    {
        let action = match mode {
            SelectionMode::Explore => self.actions().collect::<Vec<_>>().choose(rng).copied(),
            SelectionMode::Exploit => self.best_action(),
        };
        action.ok_or(XcsError::EmptySelection {
            context: "action selection",
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{Classifier, XcsConfig};

    fn population(rules: &[(&str, usize, f64, f64)]) -> Population {
        rules
            .iter()
            .map(|&(condition, action, prediction, fitness)| {
                let mut cl =
                    Classifier::new(condition.parse().unwrap(), action, 0, &XcsConfig::default());
                cl.set_prediction(prediction);
                cl.set_fitness(fitness);
                cl
            })
            .collect()
    }

    #[test]
    fn test_fitness_weighted_average() {
        let population = population(&[
            ("0#", 0, 100.0, 0.25),
            ("#1", 0, 500.0, 0.75),
            ("##", 1, 800.0, 0.5),
        ]);
        let match_set = MatchSet::matching(&population, &[0, 1]);
        let array = PredictionArray::new(&population, &match_set, 3);
        assert!((array.get(0).unwrap() - 400.0).abs() < 1e-9);
        assert!((array.get(1).unwrap() - 800.0).abs() < 1e-9);
        assert_eq!(array.get(2), None);
        assert_eq!(array.actions().collect::<Vec<_>>(), [0, 1]);
        assert_eq!(array.best_action(), Some(1));
        assert!((array.max_prediction() - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_fitness_predicts_zero() {
        let population = population(&[("##", 0, 1000.0, 0.0), ("##", 1, 10.0, 0.1)]);
        let match_set = MatchSet::matching(&population, &[1, 1]);
        let array = PredictionArray::new(&population, &match_set, 2);
        assert_eq!(array.get(0), Some(0.0));
        assert_eq!(array.best_action(), Some(1));
    }

    #[test]
    fn test_exploit_tie_goes_to_lowest_action() {
        let population = population(&[
            ("##", 2, 300.0, 1.0),
            ("##", 1, 300.0, 1.0),
            ("##", 0, 100.0, 1.0),
        ]);
        let match_set = MatchSet::matching(&population, &[0, 0]);
        let array = PredictionArray::new(&population, &match_set, 3);
        let mut rng = Pcg32::seed_from_u64(0);
        for _ in 0..10 {
            assert_eq!(
                array.select_action(SelectionMode::Exploit, &mut rng).unwrap(),
                1
            );
        }
    }

    #[test]
    fn test_explore_only_picks_present_actions() {
        let population = population(&[("##", 1, 0.0, 0.0), ("##", 3, 0.0, 0.0)]);
        let match_set = MatchSet::matching(&population, &[0, 0]);
        let array = PredictionArray::new(&population, &match_set, 4);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut seen = [false; 4];
        for _ in 0..100 {
            let action = array.select_action(SelectionMode::Explore, &mut rng).unwrap();
            seen[action] = true;
        }
        assert_eq!(seen, [false, true, false, true]);
    }

    #[test]
    fn test_empty_array_fails_selection() {
        let population = Population::new();
        let array = PredictionArray::new(&population, &MatchSet::default(), 2);
        let mut rng = Pcg32::seed_from_u64(2);
        assert_eq!(array.max_prediction(), 0.0);
        assert!(matches!(
            array.select_action(SelectionMode::Exploit, &mut rng),
            Err(XcsError::EmptySelection { .. })
        ));
        assert!(array.select_action(SelectionMode::Explore, &mut rng).is_err());
    }

    #[test]
    fn test_draw_mode() {
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(SelectionMode::draw(1.0, &mut rng).is_explore());
        assert!(SelectionMode::draw(0.0, &mut rng).is_exploit());
    }
}
