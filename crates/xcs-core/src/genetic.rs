//! Genetic algorithm operating inside a single action set.
//!
//! Unlike a generational GA, XCS reproduces *within niches*: each time an
//! action set has been reinforced, the genetic algorithm may create two
//! offspring from members of that set and insert them into the population.
//!
//! # Algorithm Overview
//!
//! 1. **Gate** - Run only if the numerosity-weighted mean time stamp of the
//!    set lags the current step by more than `theta_ga`
//! 2. **Time stamp** - Mark every member with the current step
//! 3. **Selection** - Pick two parents by fitness-proportionate roulette
//! 4. **Reproduction** - Copy each parent (numerosity 1, experience 0, fitness × 0.1)
//! 5. **Crossover** - With probability `chi`, swap a random interval of the
//!    conditions and average the statistics of both offspring
//! 6. **Mutation** - Toggle condition positions between `#` and the
//!    stimulus value, and occasionally switch the action
//! 7. **Subsumption** - Let an accurate, more general parent absorb the offspring
//! 8. **Insertion** - Otherwise insert the offspring and enforce the population cap
//!
//! # Mutation Keeps Offspring Matching
//!
//! Literal symbols introduced by mutation are copied from the stimulus the
//! action set was formed on. Every offspring therefore still matches that
//! stimulus, so reproduction can only specialize or generalize within the
//! niche, never leave it.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//! use xcs_core::{Classifier, Condition, MatchSet, Population, XcsConfig, genetic};
//!
//! let config = XcsConfig::default();
//! let mut rng = Pcg32::seed_from_u64(0);
//! let mut population: Population = [Classifier::new(Condition::general(3), 0, 0, &config)]
//!     .into_iter()
//!     .collect();
//! let stimulus = [1, 0, 1];
//! let action_set = MatchSet::matching(&population, &stimulus).action_set(&population, 0);
//!
//! let ran =
//!     genetic::run(&mut population, &action_set, &stimulus, 100, &config, &mut rng).unwrap();
//! assert!(ran);
//! assert_eq!(population.micro_size(), 3);
//! ```

use std::ops::Range;

use rand::Rng;

use crate::{
    ActionSet, Classifier, ClassifierId, Population, Symbol, XcsConfig, XcsError, roulette,
};

/// Returns `true` if the action set has gone without reproduction for more
/// than `theta_ga` steps on average.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn is_due(
    population: &Population,
    action_set: &ActionSet,
    step: u64,
    config: &XcsConfig,
) -> bool {
    let mut numerosity = 0.0;
    let mut weighted_time_stamp = 0.0;
    for (_, cl) in action_set.members(population) {
        let n = f64::from(cl.numerosity());
        numerosity += n;
        weighted_time_stamp += cl.time_stamp() as f64 * n;
    }
    if numerosity <= 0.0 {
        return false;
    }
    step as f64 - weighted_time_stamp / numerosity > config.theta_ga
}

/// Runs the genetic algorithm on `action_set` if it is due.
///
/// `stimulus` must be the stimulus the action set was formed on. Returns
/// whether reproduction took place.
pub fn run<R>(
    population: &mut Population,
    action_set: &ActionSet,
    stimulus: &[u8],
    step: u64,
    config: &XcsConfig,
    rng: &mut R,
) -> Result<bool, XcsError>
where
    R: Rng + ?Sized,
{
    if !is_due(population, action_set, step, config) {
        return Ok(false);
    }
    for &id in action_set.ids() {
        if let Some(cl) = population.get_mut(id) {
            cl.set_time_stamp(step);
        }
    }

    let parent1 = select_parent(population, action_set, rng)?;
    let parent2 = select_parent(population, action_set, rng)?;
    let offspring = |id| {
        population
            .get(id)
            .map(Classifier::offspring)
            .ok_or(XcsError::EmptySelection {
                context: "parent selection",
            })
    };
    let mut child1 = offspring(parent1)?;
    let mut child2 = offspring(parent2)?;

    if rng.random_bool(config.chi) {
        let cut = cut_points(child1.condition().len(), rng);
        crossover(&mut child1, &mut child2, cut);
    }

    for mut child in [child1, child2] {
        mutate(&mut child, stimulus, config, rng);
        let subsumer = config
            .do_ga_subsumption
            .then(|| {
                [parent1, parent2].into_iter().find(|&id| {
                    population
                        .get(id)
                        .is_some_and(|parent| parent.does_subsume(&child, config))
                })
            })
            .flatten();
        match subsumer.and_then(|id| population.get_mut(id)) {
            Some(parent) => {
                log::debug!("offspring {child} subsumed by {parent}");
                parent.add_numerosity(1);
            }
            None => {
                log::debug!("inserting offspring {child}");
                population.insert(child);
            }
        }
        population.enforce_cap(config, rng)?;
    }
    Ok(true)
}

/// Selects a parent by roulette over fitness.
///
/// A single-member action set returns that member without drawing.
fn select_parent<R>(
    population: &Population,
    action_set: &ActionSet,
    rng: &mut R,
) -> Result<ClassifierId, XcsError>
where
    R: Rng + ?Sized,
{
    let (ids, fitness): (Vec<_>, Vec<_>) = action_set
        .members(population)
        .map(|(id, cl)| (id, cl.fitness()))
        .unzip();
    let index = match ids.len() {
        1 => Some(0),
        _ => roulette::select(&fitness, rng),
    };
    index.map(|i| ids[i]).ok_or(XcsError::EmptySelection {
        context: "parent selection",
    })
}

/// Draws two ordered cut points from `0..=len`.
fn cut_points<R>(len: usize, rng: &mut R) -> Range<usize>
where
    R: Rng + ?Sized,
{
    let x = rng.random_range(0..=len);
    let y = rng.random_range(0..=len);
    x.min(y)..x.max(y)
}

/// Two-point crossover over the positions in `cut`.
///
/// The condition symbols in `cut` are exchanged between the two offspring,
/// and both receive the average of their fitness, error and prediction.
///
/// # Panics
///
/// Panics if the conditions differ in length or `cut` is out of bounds.
pub fn crossover(child1: &mut Classifier, child2: &mut Classifier, cut: Range<usize>) {
    child1
        .condition_mut()
        .swap_range(child2.condition_mut(), cut);

    let fitness = (child1.fitness() + child2.fitness()) / 2.0;
    let error = (child1.error() + child2.error()) / 2.0;
    let prediction = (child1.prediction() + child2.prediction()) / 2.0;
    for child in [child1, child2] {
        child.set_fitness(fitness);
        child.set_error(error);
        child.set_prediction(prediction);
    }
}

/// Mutates the condition and action of `classifier`.
///
/// Each position is mutated with probability `mu`: `#` becomes the literal
/// stimulus value and a literal becomes `#`. With probability `mu` the action
/// is replaced by a different action chosen uniformly.
pub fn mutate<R>(classifier: &mut Classifier, stimulus: &[u8], config: &XcsConfig, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for (symbol, &value) in classifier
        .condition_mut()
        .symbols_mut()
        .iter_mut()
        .zip(stimulus)
    {
        if rng.random_bool(config.mu) {
            *symbol = match *symbol {
                Symbol::DontCare => Symbol::literal(value),
                Symbol::Zero | Symbol::One => Symbol::DontCare,
            };
        }
    }

    if config.num_actions > 1 && rng.random_bool(config.mu) {
        // Draw from the other actions by skipping over the current one.
        let mut action = rng.random_range(0..config.num_actions - 1);
        if action >= classifier.action() {
            action += 1;
        }
        classifier.set_action(action);
    }
}
