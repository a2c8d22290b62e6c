use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xcs_core::{EvaluationCycle, Schedule, Seed, XcsConfig};

/// Everything needed to reproduce and inspect a training run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub multiplexer_size: usize,
    pub seed: Seed,
    pub environment_seed: Seed,
    pub config: XcsConfig,
    pub schedule: Schedule,
    pub steps: u64,
    pub evaluations: Vec<EvaluationRecord>,
    pub macro_population: usize,
    pub micro_population: u64,
    pub classifiers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct EvaluationRecord {
    pub episode: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub proportion_correct: Option<f64>,
}

impl From<&EvaluationCycle> for EvaluationRecord {
    fn from(cycle: &EvaluationCycle) -> Self {
        let EvaluationCycle { episode, report } = *cycle;
        Self {
            episode,
            correct: report.correct,
            incorrect: report.incorrect,
            proportion_correct: report.proportion_correct(),
        }
    }
}
