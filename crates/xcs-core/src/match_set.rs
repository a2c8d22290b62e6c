//! Match sets, action sets and covering.
//!
//! Both sets are lists of [`ClassifierId`]s into the [`Population`]. They are
//! rebuilt from the live population every step.

use rand::{Rng, seq::IndexedRandom as _};

use crate::{
    Classifier, ClassifierId, Condition, Deletion, Population, XcsConfig, XcsError,
};

/// Classifiers whose condition matches the current stimulus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    ids: Vec<ClassifierId>,
}

impl MatchSet {
    /// Collects the matching classifiers without covering.
    #[must_use]
    pub fn matching(population: &Population, stimulus: &[u8]) -> Self {
        let ids = population
            .iter()
            .filter(|(_, cl)| cl.condition().matches(stimulus))
            .map(|(id, _)| id)
            .collect();
        Self { ids }
    }

    /// Collects the matching classifiers and covers until the set holds at
    /// least [`XcsConfig::min_match_set_size`] classifiers.
    ///
    /// Each covering classifier advocates an action absent from the partial
    /// match set (any action once all are present), is inserted into the
    /// population and followed by a deletion check. A covering classifier
    /// that merges into a rule already in the set counts toward the minimum
    /// as an extra copy, so covering always makes progress.
    pub fn build<R>(
        population: &mut Population,
        stimulus: &[u8],
        step: u64,
        config: &XcsConfig,
        rng: &mut R,
    ) -> Result<Self, XcsError>
    where
        R: Rng + ?Sized,
    {
        if let Some(expected) = population
            .condition_len()
            .filter(|&len| len != stimulus.len())
        {
            return Err(XcsError::StimulusLength {
                expected,
                actual: stimulus.len(),
            });
        }

        let mut match_set = Self::matching(population, stimulus);
        let mut merged = 0;
        while match_set.len() + merged < config.min_match_set_size() {
            let action = match_set.covering_action(population, config.num_actions, rng)?;
            let condition = Condition::covering(stimulus, config.p_hash, rng);
            let classifier = Classifier::new(condition, action, step, config);
            log::debug!("covering {classifier} at step {step}");

            let id = population.insert(classifier);
            if let Some(Deletion::Removed(removed)) = population.enforce_cap(config, rng)? {
                match_set.ids.retain(|&i| i != removed);
            }
            if !population.contains(id) {
                continue;
            }
            if match_set.ids.contains(&id) {
                merged += 1;
            } else {
                match_set.ids.push(id);
            }
        }
        Ok(match_set)
    }

    fn covering_action<R>(
        &self,
        population: &Population,
        num_actions: usize,
        rng: &mut R,
    ) -> Result<usize, XcsError>
    where
        R: Rng + ?Sized,
    {
        let mut present = vec![false; num_actions];
        for cl in self.ids.iter().filter_map(|&id| population.get(id)) {
            if let Some(p) = present.get_mut(cl.action()) {
                *p = true;
            }
        }
        let mut candidates = (0..num_actions).filter(|&a| !present[a]).collect::<Vec<_>>();
        if candidates.is_empty() {
            candidates = (0..num_actions).collect();
        }
        candidates
            .choose(rng)
            .copied()
            .ok_or(XcsError::EmptySelection {
                context: "covering action",
            })
    }

    #[must_use]
    pub fn ids(&self) -> &[ClassifierId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selects the members advocating `action`.
    #[must_use]
    pub fn action_set(&self, population: &Population, action: usize) -> ActionSet {
        let ids = self
            .ids
            .iter()
            .copied()
            .filter(|&id| population.get(id).is_some_and(|cl| cl.action() == action))
            .collect();
        ActionSet { action, ids }
    }
}

/// Members of a match set that advocate one action.
///
/// An action set may outlive the step it was formed in (the previous step's
/// set is reinforced one step later). Members deleted in the meantime are
/// skipped when the set is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSet {
    action: usize,
    ids: Vec<ClassifierId>,
}

impl ActionSet {
    #[must_use]
    pub fn action(&self) -> usize {
        self.action
    }

    #[must_use]
    pub fn ids(&self) -> &[ClassifierId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Total numerosity of the live members.
    #[must_use]
    pub fn numerosity(&self, population: &Population) -> u64 {
        self.members(population)
            .map(|(_, cl)| u64::from(cl.numerosity()))
            .sum()
    }

    /// Iterates over the members still present in the population.
    pub fn members<'a>(
        &'a self,
        population: &'a Population,
    ) -> impl Iterator<Item = (ClassifierId, &'a Classifier)> + 'a {
        self.ids
            .iter()
            .filter_map(|&id| population.get(id).map(|cl| (id, cl)))
    }

    /// Drops members that are no longer in the population.
    pub(crate) fn retain_live(&mut self, population: &Population) {
        self.ids.retain(|&id| population.contains(id));
    }

    pub(crate) fn remove(&mut self, id: ClassifierId) {
        self.ids.retain(|&i| i != id);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn classifier(condition: &str, action: usize) -> Classifier {
        Classifier::new(condition.parse().unwrap(), action, 0, &XcsConfig::default())
    }

    fn population(rules: &[(&str, usize)]) -> Population {
        rules.iter().map(|&(c, a)| classifier(c, a)).collect()
    }

    #[test]
    fn test_matching_ignores_action() {
        let population = population(&[("0#1", 0), ("0#1", 1), ("1##", 0), ("###", 1)]);
        let match_set = MatchSet::matching(&population, &[0, 1, 1]);
        assert_eq!(match_set.len(), 3);
        for &id in match_set.ids() {
            assert!(population.get(id).unwrap().condition().matches(&[0, 1, 1]));
        }
    }

    #[test]
    fn test_build_covers_missing_actions() {
        let config = XcsConfig::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut population = population(&[("1#", 0)]);
        let stimulus = [1, 0];
        let match_set = MatchSet::build(&mut population, &stimulus, 5, &config, &mut rng).unwrap();

        assert_eq!(match_set.len(), 2);
        let actions = match_set
            .ids()
            .iter()
            .map(|&id| population.get(id).unwrap().action())
            .collect::<Vec<_>>();
        assert_eq!(actions, [0, 1]);
        let covered = population.get(match_set.ids()[1]).unwrap();
        assert!(covered.condition().matches(&stimulus));
        assert_eq!(covered.time_stamp(), 5);
    }

    #[test]
    fn test_build_from_empty_population() {
        let config = XcsConfig::default();
        let mut rng = Pcg32::seed_from_u64(12);
        let mut population = Population::new();
        for step in 0..200 {
            let stimulus = [
                u8::from(step % 2 == 0),
                u8::from(step % 3 == 0),
                u8::from(step % 5 == 0),
                u8::from(step % 7 == 0),
            ];
            let match_set =
                MatchSet::build(&mut population, &stimulus, step, &config, &mut rng).unwrap();
            assert!(match_set.len() >= config.min_match_set_size());
            for &id in match_set.ids() {
                assert!(population.get(id).unwrap().condition().matches(&stimulus));
            }
            assert!(population.micro_size() <= config.max_pop);
        }
    }

    #[test]
    fn test_build_under_tight_cap() {
        let config = XcsConfig {
            max_pop: 2,
            num_actions: 2,
            p_hash: 0.0,
            ..XcsConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(13);
        let mut population = Population::new();
        for step in 0..20_u64 {
            let stimulus = [u8::from(step % 2 == 0), u8::from(step % 4 < 2)];
            let match_set =
                MatchSet::build(&mut population, &stimulus, step, &config, &mut rng).unwrap();
            assert_eq!(match_set.len(), 2);
            assert!(match_set.ids().iter().all(|&id| population.contains(id)));
            assert!(population.micro_size() <= 2);
        }
    }

    #[test]
    fn test_build_with_more_slots_than_actions() {
        let config = XcsConfig {
            theta_mna: Some(3),
            num_actions: 2,
            p_hash: 0.0,
            ..XcsConfig::default()
        };
        config.validate().unwrap();
        let mut rng = Pcg32::seed_from_u64(15);
        let mut population = Population::new();
        let stimulus = [0, 1, 1];
        let match_set = MatchSet::build(&mut population, &stimulus, 0, &config, &mut rng).unwrap();

        // Only two distinct fully specific rules exist for this stimulus; the
        // third covering classifier merges into one of them.
        assert_eq!(match_set.len(), 2);
        let numerosity: u32 = match_set
            .ids()
            .iter()
            .map(|&id| population.get(id).unwrap().numerosity())
            .sum();
        assert_eq!(numerosity, 3);
        assert_eq!(population.micro_size(), 3);
    }

    #[test]
    fn test_build_with_default_p_hash_and_more_slots_than_actions() {
        let config = XcsConfig {
            theta_mna: Some(4),
            num_actions: 2,
            ..XcsConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(16);
        let mut population = Population::new();
        for step in 0..50_u64 {
            let stimulus = [u8::from(step % 2 == 0), u8::from(step % 3 == 0), 1];
            let match_set =
                MatchSet::build(&mut population, &stimulus, step, &config, &mut rng).unwrap();
            assert!(match_set.len() >= 2);
            for &id in match_set.ids() {
                assert!(population.get(id).unwrap().condition().matches(&stimulus));
            }
        }
    }

    #[test]
    fn test_build_rejects_stimulus_of_wrong_length() {
        let config = XcsConfig::default();
        let mut rng = Pcg32::seed_from_u64(14);
        let mut population = population(&[("1#", 0)]);
        let err = MatchSet::build(&mut population, &[1, 0, 1], 0, &config, &mut rng).unwrap_err();
        assert_eq!(
            err,
            XcsError::StimulusLength {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_action_set() {
        let mut population = population(&[("0#", 0), ("0#", 1), ("#1", 1)]);
        let mut heavy = classifier("#1", 1);
        heavy.add_numerosity(2);
        population.insert(heavy);

        let match_set = MatchSet::matching(&population, &[0, 1]);
        let action_set = match_set.action_set(&population, 1);
        assert_eq!(action_set.action(), 1);
        assert_eq!(action_set.len(), 2);
        assert_eq!(action_set.numerosity(&population), 5);
        assert!(match_set.action_set(&population, 2).is_empty());
    }
}
