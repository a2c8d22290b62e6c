//! Reinforcement of an action set.
//!
//! Every member moves its prediction, prediction error and action set size
//! estimate toward the target payoff with the Widrow-Hoff delta rule. While a
//! classifier is young (`experience < 1 / beta`) the learning rate is
//! `1 / experience`, which makes the estimates plain running averages of the
//! samples seen so far; afterwards the rate is the fixed `beta`.
//!
//! Fitness is then recomputed from accuracy *relative* to the other members
//! of the set, so classifiers compete for a fixed amount of fitness within
//! their niche.

use rand::Rng;

use crate::{ActionSet, ClassifierId, Population, XcsConfig};

/// Updates the statistics of every live member of `action_set` toward the
/// payoff `target`, recomputes fitness and, if enabled, applies action set
/// subsumption.
///
/// Members deleted since the set was formed are dropped from it first.
pub fn update_action_set<R>(
    population: &mut Population,
    action_set: &mut ActionSet,
    target: f64,
    config: &XcsConfig,
    rng: &mut R,
) where
    R: Rng + ?Sized,
{
    action_set.retain_live(population);
    if action_set.is_empty() {
        return;
    }

    #[expect(clippy::cast_precision_loss)]
    let set_size = action_set.numerosity(population) as f64;
    for &id in action_set.ids() {
        let Some(cl) = population.get_mut(id) else {
            continue;
        };
        let experience = cl.increment_experience();
        let rate = learning_rate(experience, config);

        let prediction = cl.prediction() + rate * (target - cl.prediction());
        cl.set_prediction(prediction);
        cl.set_error(cl.error() + rate * ((target - prediction).abs() - cl.error()));
        cl.set_action_set_size(cl.action_set_size() + rate * (set_size - cl.action_set_size()));
    }

    update_fitness(population, action_set, config);

    if config.do_action_set_subsumption {
        subsume_action_set(population, action_set, config, rng);
    }
}

/// `1 / experience` for young classifiers, `beta` afterwards, never below `epsilon0`.
#[expect(clippy::cast_precision_loss)]
fn learning_rate(experience: u64, config: &XcsConfig) -> f64 {
    let experience = experience as f64;
    let rate = if experience < 1.0 / config.beta {
        1.0 / experience
    } else {
        config.beta
    };
    rate.max(config.epsilon0)
}

fn update_fitness(population: &mut Population, action_set: &ActionSet, config: &XcsConfig) {
    let accuracies = action_set
        .members(population)
        .map(|(id, cl)| (id, cl.accuracy(config), f64::from(cl.numerosity())))
        .collect::<Vec<_>>();
    let accuracy_sum: f64 = accuracies.iter().map(|(_, k, n)| k * n).sum();
    if accuracy_sum <= 0.0 {
        return;
    }
    for (id, accuracy, numerosity) in accuracies {
        if let Some(cl) = population.get_mut(id) {
            let share = accuracy * numerosity / accuracy_sum;
            cl.set_fitness(cl.fitness() + config.beta * (share - cl.fitness()));
        }
    }
}

/// Lets the most general accurate member absorb every member it is more
/// general than.
fn subsume_action_set<R>(
    population: &mut Population,
    action_set: &mut ActionSet,
    config: &XcsConfig,
    rng: &mut R,
) where
    R: Rng + ?Sized,
{
    let mut subsumer: Option<(ClassifierId, usize)> = None;
    for (id, cl) in action_set.members(population) {
        if !cl.could_subsume(config) {
            continue;
        }
        let generality = cl.condition().generality();
        let replace = match subsumer {
            None => true,
            Some((_, best)) => {
                generality > best || (generality == best && rng.random_bool(0.5))
            }
        };
        if replace {
            subsumer = Some((id, generality));
        }
    }
    let Some((subsumer_id, _)) = subsumer else {
        return;
    };
    let Some(subsumer) = population.get(subsumer_id) else {
        return;
    };

    let absorbed = action_set
        .members(population)
        .filter(|(_, cl)| subsumer.is_more_general_than(cl))
        .map(|(id, _)| id)
        .collect::<Vec<_>>();
    for id in absorbed {
        let Some(cl) = population.remove(id) else {
            continue;
        };
        action_set.remove(id);
        log::debug!("action set subsumption absorbed {cl}");
        if let Some(subsumer) = population.get_mut(subsumer_id) {
            subsumer.add_numerosity(cl.numerosity());
        }
    }
}
