//! XCS, an accuracy-based learning classifier system.
//!
//! A population of condition/action rules learns, through reinforcement and
//! a niche genetic algorithm, which actions pay off for which stimuli.
//! Rules are rewarded for *accurate* payoff predictions rather than high
//! ones, so the population converges toward a compact set of maximally
//! general, accurate rules.
//!
//! The learner only talks to a problem through [`Environment`]. See
//! [`Xcs`] for the learning loop.
//!
//! ```
//! use xcs_core::{Environment, Observation, Schedule, Seed, Xcs, XcsConfig};
//!
//! /// Reward 1000 for echoing the single attribute.
//! struct Echo { bit: u8, done: bool }
//!
//! impl Environment for Echo {
//!     fn is_at_terminal_state(&self) -> bool { self.done }
//!     fn reset(&mut self) { self.done = false; self.bit ^= 1; }
//!     fn observe(&mut self) -> Observation {
//!         Observation { attributes: vec![self.bit], ground_truth: usize::from(self.bit) }
//!     }
//!     fn effect(&mut self, action: usize) -> f64 {
//!         self.done = true;
//!         if action == usize::from(self.bit) { 1000.0 } else { 0.0 }
//!     }
//! }
//!
//! let mut xcs = Xcs::with_seed(XcsConfig::default(), Seed([7; 16])).unwrap();
//! let schedule = Schedule { episodes: 500, evaluation_interval: 0, evaluation_episodes: 0 };
//! xcs.train(&mut Echo { bit: 0, done: false }, &schedule, |_| {}).unwrap();
//! assert!(xcs.population().micro_size() > 0);
//! ```

pub use self::{
    classifier::*, condition::*, config::*, environment::*, error::*, evaluation::EvaluationReport,
    match_set::*, population::*, prediction::*, seed::*, system::*,
};

mod classifier;
mod condition;
mod config;
mod environment;
mod error;
pub mod evaluation;
pub mod genetic;
mod match_set;
mod population;
mod prediction;
pub mod reinforcement;
mod roulette;
mod seed;
mod system;
