//! The learning loop.
//!
//! [`Xcs`] owns the population, the configuration and the random source, and
//! drives an [`Environment`] one step at a time. Payoff for a step is only
//! known one step later in multi-step tasks, so the action set of the
//! previous step is carried explicitly in [`PreviousStep`] and reinforced
//! with `reward + gamma × max prediction` of the following step.

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    ActionSet, Environment, EvaluationReport, MatchSet, Population, PredictionArray, Schedule,
    Seed, SelectionMode, XcsConfig, XcsError, evaluation, genetic, reinforcement,
};

/// State carried from a non-terminal step into the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousStep {
    pub action_set: ActionSet,
    pub reward: f64,
    pub stimulus: Vec<u8>,
}

/// Result of a single learning step.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum StepOutcome {
    /// The episode goes on; pass the carried state to the next step.
    Continue(PreviousStep),
    /// The episode ended with the given reward.
    Terminal { reward: f64 },
}

/// Progress measured after a training episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationCycle {
    /// Zero-based index of the episode the evaluation followed.
    pub episode: usize,
    pub report: EvaluationReport,
}

/// An XCS learner.
#[derive(Debug, Clone)]
pub struct Xcs {
    config: XcsConfig,
    population: Population,
    seed: Seed,
    rng: Pcg32,
    step: u64,
}

impl Xcs {
    /// Creates a learner with an empty population and a random seed.
    pub fn new(config: XcsConfig) -> Result<Self, XcsError> {
        Self::with_seed(config, rand::rng().random())
    }

    /// Creates a learner with an empty population and a fixed seed.
    pub fn with_seed(config: XcsConfig, seed: Seed) -> Result<Self, XcsError> {
        Self::with_population(config, Population::new(), seed)
    }

    /// Creates a learner that starts from an existing population.
    pub fn with_population(
        config: XcsConfig,
        population: Population,
        seed: Seed,
    ) -> Result<Self, XcsError> {
        config.validate()?;
        Ok(Self {
            config,
            population,
            seed,
            rng: Pcg32::from_seed(seed.0),
            step: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &XcsConfig {
        &self.config
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn into_population(self) -> Population {
        self.population
    }

    #[must_use]
    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// Number of learning steps taken so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.step
    }

    /// Observes the environment, acts on it and learns from the outcome.
    ///
    /// `previous` is the state returned by the preceding step of the same
    /// episode, or `None` at the start of an episode.
    pub fn step<E>(
        &mut self,
        env: &mut E,
        previous: Option<PreviousStep>,
    ) -> Result<StepOutcome, XcsError>
    where
        E: Environment + ?Sized,
    {
        let stimulus = env.observe().attributes;
        let match_set = MatchSet::build(
            &mut self.population,
            &stimulus,
            self.step,
            &self.config,
            &mut self.rng,
        )?;
        let predictions =
            PredictionArray::new(&self.population, &match_set, self.config.num_actions);
        let mode = SelectionMode::draw(self.config.p_explore, &mut self.rng);
        let action = predictions.select_action(mode, &mut self.rng)?;
        let action_set = match_set.action_set(&self.population, action);

        let reward = env.effect(action);

        if let Some(mut previous) = previous {
            let target = previous.reward + self.config.gamma * predictions.max_prediction();
            self.reinforce(&mut previous.action_set, target, &previous.stimulus)?;
        }

        let outcome = if env.is_at_terminal_state() {
            let mut action_set = action_set;
            self.reinforce(&mut action_set, reward, &stimulus)?;
            StepOutcome::Terminal { reward }
        } else {
            StepOutcome::Continue(PreviousStep {
                action_set,
                reward,
                stimulus,
            })
        };
        self.step += 1;
        Ok(outcome)
    }

    fn reinforce(
        &mut self,
        action_set: &mut ActionSet,
        target: f64,
        stimulus: &[u8],
    ) -> Result<(), XcsError> {
        reinforcement::update_action_set(
            &mut self.population,
            action_set,
            target,
            &self.config,
            &mut self.rng,
        );
        genetic::run(
            &mut self.population,
            action_set,
            stimulus,
            self.step,
            &self.config,
            &mut self.rng,
        )?;
        Ok(())
    }

    /// Resets the environment and steps until it reaches a terminal state.
    ///
    /// Returns the terminal reward, or `None` if the environment was already
    /// terminal after the reset.
    pub fn run_episode<E>(&mut self, env: &mut E) -> Result<Option<f64>, XcsError>
    where
        E: Environment + ?Sized,
    {
        env.reset();
        let mut previous = None;
        while !env.is_at_terminal_state() {
            match self.step(env, previous.take())? {
                StepOutcome::Continue(carried) => previous = Some(carried),
                StepOutcome::Terminal { reward } => return Ok(Some(reward)),
            }
        }
        Ok(None)
    }

    /// Measures the current population without learning.
    pub fn evaluate<E>(&self, env: &mut E, episodes: usize) -> EvaluationReport
    where
        E: Environment + ?Sized,
    {
        evaluation::evaluate(&self.population, env, episodes, &self.config)
    }

    /// Runs the whole schedule, calling `on_evaluation` after every
    /// evaluation.
    pub fn train<E, F>(
        &mut self,
        env: &mut E,
        schedule: &Schedule,
        mut on_evaluation: F,
    ) -> Result<(), XcsError>
    where
        E: Environment + ?Sized,
        F: FnMut(&EvaluationCycle),
    {
        for episode in 0..schedule.episodes {
            self.run_episode(env)?;
            if schedule.evaluates_after(episode) {
                let report = self.evaluate(env, schedule.evaluation_episodes);
                log::debug!(
                    "episode {episode}: {} macro-classifiers, {} micro-classifiers",
                    self.population.len(),
                    self.population.micro_size()
                );
                on_evaluation(&EvaluationCycle { episode, report });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Classifier, Condition, Observation};

    /// Two-step corridor: action 1 at the first state leads to the second
    /// state, action 1 there pays 1000. Any action 0 ends the episode with 0.
    struct Corridor {
        position: u8,
        terminal: bool,
    }

    impl Corridor {
        fn new() -> Self {
            Self {
                position: 0,
                terminal: false,
            }
        }
    }

    impl Environment for Corridor {
        fn is_at_terminal_state(&self) -> bool {
            self.terminal
        }

        fn reset(&mut self) {
            self.position = 0;
            self.terminal = false;
        }

        fn observe(&mut self) -> Observation {
            Observation {
                attributes: vec![self.position],
                ground_truth: 1,
            }
        }

        fn effect(&mut self, action: usize) -> f64 {
            if action == 0 {
                self.terminal = true;
                return 0.0;
            }
            if self.position == 1 {
                self.terminal = true;
                return 1000.0;
            }
            self.position = 1;
            0.0
        }
    }

    fn seed(byte: u8) -> Seed {
        Seed([byte; 16])
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = XcsConfig {
            num_actions: 0,
            ..XcsConfig::default()
        };
        assert!(Xcs::with_seed(config, seed(0)).is_err());
    }

    #[test]
    fn test_exploit_tie_ends_corridor() {
        let config = XcsConfig {
            p_explore: 0.0,
            ..XcsConfig::default()
        };
        let population: Population = [
            Classifier::new(Condition::general(1), 1, 0, &config),
            Classifier::new(Condition::general(1), 0, 0, &config),
        ]
        .into_iter()
        .collect();
        let mut xcs = Xcs::with_population(config, population, seed(1)).unwrap();
        let mut env = Corridor::new();
        env.reset();

        // Both predictions are 0; the tie goes to action 0.
        let outcome = xcs.step(&mut env, None).unwrap();
        assert_eq!(outcome, StepOutcome::Terminal { reward: 0.0 });
        assert_eq!(xcs.steps(), 1);
    }

    #[test]
    fn test_two_step_payoff_propagates_discounted() {
        let config = XcsConfig {
            p_explore: 0.0,
            theta_ga: f64::INFINITY,
            ..XcsConfig::default()
        };
        let mut go = Classifier::new(Condition::general(1), 1, 0, &config);
        go.set_prediction(500.0);
        go.set_fitness(1.0);
        let mut stop = Classifier::new(Condition::general(1), 0, 0, &config);
        stop.set_fitness(1.0);
        let population: Population = [go, stop].into_iter().collect();
        let mut xcs = Xcs::with_population(config, population, seed(2)).unwrap();
        let mut env = Corridor::new();
        env.reset();

        let StepOutcome::Continue(previous) = xcs.step(&mut env, None).unwrap() else {
            panic!("first step must not end the corridor");
        };
        assert_eq!(previous.action_set.action(), 1);
        assert_eq!(previous.stimulus, [0]);
        assert_eq!(previous.reward, 0.0);

        let outcome = xcs.step(&mut env, Some(previous)).unwrap();
        assert_eq!(outcome, StepOutcome::Terminal { reward: 1000.0 });

        // Same classifier reinforced twice: first with 0 + 0.71 × 500, then
        // with the terminal reward 1000. Young, so a running average.
        let go = xcs
            .population()
            .classifiers()
            .find(|cl| cl.action() == 1)
            .unwrap();
        assert_eq!(go.experience(), 2);
        assert!((go.prediction() - (0.71 * 500.0 + 1000.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_train_reports_every_interval() {
        let schedule = Schedule {
            episodes: 101,
            evaluation_interval: 25,
            evaluation_episodes: 5,
        };
        let mut xcs = Xcs::with_seed(XcsConfig::default(), seed(3)).unwrap();
        let mut env = Corridor::new();
        let mut cycles = Vec::new();
        xcs.train(&mut env, &schedule, |cycle| cycles.push(*cycle))
            .unwrap();
        assert_eq!(
            cycles.iter().map(|c| c.episode).collect::<Vec<_>>(),
            [25, 50, 75, 100]
        );
        assert!(cycles.iter().all(|c| c.report.total() == 5));
        assert!(xcs.steps() >= 101);
        assert!(xcs.population().micro_size() <= xcs.config().max_pop);
    }

    #[test]
    fn test_same_seed_same_population() {
        let schedule = Schedule {
            episodes: 300,
            evaluation_interval: 0,
            evaluation_episodes: 0,
        };
        let dump = |seed| {
            let mut xcs = Xcs::with_seed(XcsConfig::default(), seed).unwrap();
            xcs.train(&mut Corridor::new(), &schedule, |_| {}).unwrap();
            xcs.population()
                .classifiers()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(dump(seed(4)), dump(seed(4)));
    }
}
