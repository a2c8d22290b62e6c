use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::Context as _;
use chrono::Utc;
use rand::Rng as _;
use xcs_core::{Schedule, Seed, Xcs, XcsConfig};
use xcs_multiplexer::Multiplexer;

use crate::{
    schema::report::{EvaluationRecord, RunReport},
    util::{self, Output},
};

const DEFAULT_MULTIPLEXER_SIZE: usize = 6;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    /// Multiplexer size in bits (k + 2^k: 3, 6, 11, 20, ...)
    #[arg(long, default_value_t = DEFAULT_MULTIPLEXER_SIZE)]
    multiplexer_size: usize,
    /// Number of learning episodes
    #[arg(long, default_value_t = Schedule::default().episodes)]
    episodes: usize,
    /// Evaluate after every N episodes (0 disables evaluation)
    #[arg(long, default_value_t = Schedule::default().evaluation_interval)]
    evaluation_interval: usize,
    /// Number of exploit-only rollouts per evaluation
    #[arg(long, default_value_t = Schedule::default().evaluation_episodes)]
    evaluation_episodes: usize,
    /// Learning parameters JSON file (missing fields take default values)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed of the learner (32 hex digits)
    #[arg(long)]
    seed: Option<Seed>,
    /// Seed of the multiplexer's stimulus generator (32 hex digits)
    #[arg(long)]
    environment_seed: Option<Seed>,
    /// Write a JSON run report to this file
    #[arg(long)]
    report: Option<PathBuf>,
    #[clap(flatten)]
    overrides: ConfigOverrides,
}

impl Default for RunArg {
    fn default() -> Self {
        let schedule = Schedule::default();
        Self {
            multiplexer_size: DEFAULT_MULTIPLEXER_SIZE,
            episodes: schedule.episodes,
            evaluation_interval: schedule.evaluation_interval,
            evaluation_episodes: schedule.evaluation_episodes,
            config: None,
            seed: None,
            environment_seed: None,
            report: None,
            overrides: ConfigOverrides::default(),
        }
    }
}

/// Learning parameters that can be set on the command line.
///
/// Values given here take precedence over the configuration file.
#[derive(Default, Debug, Clone, clap::Args)]
struct ConfigOverrides {
    /// Maximum micro-population size
    #[arg(long)]
    max_pop: Option<u64>,
    /// Learning rate
    #[arg(long)]
    beta: Option<f64>,
    /// Discount factor
    #[arg(long)]
    gamma: Option<f64>,
    /// Probability of `#` when covering
    #[arg(long)]
    p_hash: Option<f64>,
    /// Probability of an explore step
    #[arg(long)]
    p_explore: Option<f64>,
    /// Genetic algorithm time-stamp threshold
    #[arg(long)]
    theta_ga: Option<f64>,
    /// Crossover probability
    #[arg(long)]
    chi: Option<f64>,
    /// Mutation probability
    #[arg(long)]
    mu: Option<f64>,
    /// Minimum match set size
    #[arg(long)]
    theta_mna: Option<usize>,
    /// Enable action set subsumption
    #[arg(long)]
    action_set_subsumption: bool,
    /// Disable subsumption of offspring by their parents
    #[arg(long)]
    no_ga_subsumption: bool,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut XcsConfig) {
        let Self {
            max_pop,
            beta,
            gamma,
            p_hash,
            p_explore,
            theta_ga,
            chi,
            mu,
            theta_mna,
            action_set_subsumption,
            no_ga_subsumption,
        } = self;
        if let Some(v) = max_pop {
            config.max_pop = *v;
        }
        for (value, field) in [
            (beta, &mut config.beta),
            (gamma, &mut config.gamma),
            (p_hash, &mut config.p_hash),
            (p_explore, &mut config.p_explore),
            (theta_ga, &mut config.theta_ga),
            (chi, &mut config.chi),
            (mu, &mut config.mu),
        ] {
            if let Some(v) = value {
                *field = *v;
            }
        }
        if theta_mna.is_some() {
            config.theta_mna = *theta_mna;
        }
        if *action_set_subsumption {
            config.do_action_set_subsumption = true;
        }
        if *no_ga_subsumption {
            config.do_ga_subsumption = false;
        }
    }
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let RunArg {
        multiplexer_size,
        episodes,
        evaluation_interval,
        evaluation_episodes,
        config,
        seed,
        environment_seed,
        report,
        overrides,
    } = arg;

    let mut xcs_config = match config {
        Some(path) => util::read_config_file(path)?,
        None => XcsConfig::default(),
    };
    overrides.apply(&mut xcs_config);
    let schedule = Schedule {
        episodes: *episodes,
        evaluation_interval: *evaluation_interval,
        evaluation_episodes: *evaluation_episodes,
    };
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let environment_seed = environment_seed.unwrap_or_else(|| rand::rng().random());

    let mut env = Multiplexer::with_seed(*multiplexer_size, environment_seed)?;
    let mut xcs = Xcs::with_seed(xcs_config, seed).context("Invalid learning parameters")?;
    log::info!(
        "training on the {multiplexer_size}-bit multiplexer for {episodes} episodes \
         (seed {seed}, environment seed {environment_seed})"
    );

    let started_at = Utc::now();
    let mut evaluations = Vec::new();
    xcs.train(&mut env, &schedule, |cycle| {
        if let Some(proportion) = cycle.report.proportion_correct() {
            eprintln!(
                "Post-cycle eval #{}. Proportion correct: {proportion}",
                cycle.episode
            );
        }
        evaluations.push(EvaluationRecord::from(cycle));
    })?;
    let finished_at = Utc::now();

    let mut stdout = io::stdout().lock();
    for classifier in xcs.population().classifiers() {
        writeln!(stdout, "{classifier}").context("Failed to write population to stdout")?;
    }
    log::info!(
        "final population: {} macro-classifiers, {} micro-classifiers",
        xcs.population().len(),
        xcs.population().micro_size()
    );

    if let Some(path) = report {
        let report = RunReport {
            started_at,
            finished_at,
            multiplexer_size: *multiplexer_size,
            seed,
            environment_seed,
            config: xcs.config().clone(),
            schedule,
            steps: xcs.steps(),
            evaluations,
            macro_population: xcs.population().len(),
            micro_population: xcs.population().micro_size(),
            classifiers: xcs
                .population()
                .classifiers()
                .map(ToString::to_string)
                .collect(),
        };
        Output::save_json(&report, Some(path.clone()))?;
        eprintln!("Run report saved to {}", path.display());
    }
    Ok(())
}
