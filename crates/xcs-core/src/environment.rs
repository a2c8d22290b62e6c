//! The boundary between the learner and the problem it is learning.
//!
//! The engine never looks inside a problem. Everything it needs is expressed
//! by the [`Environment`] trait: a way to start an episode, read the current
//! stimulus, apply an action and learn whether the episode is over.
//!
//! Single-step problems (such as the Boolean multiplexer) become terminal
//! after every [`Environment::effect`] call. Multi-step problems stay
//! non-terminal for several steps; the engine then propagates reward one step
//! back with the discount factor `gamma`.

/// A stimulus presented by an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Binary attribute values (`0` or `1`), one per condition position.
    pub attributes: Vec<u8>,
    /// The action the environment considers correct.
    ///
    /// Used by environments to score actions and by callers for diagnostics;
    /// the learner itself never reads it.
    pub ground_truth: usize,
}

/// A reward-producing problem the learner interacts with.
pub trait Environment {
    /// Returns `true` once the current episode has ended.
    fn is_at_terminal_state(&self) -> bool;

    /// Begins a new episode.
    fn reset(&mut self);

    /// Produces the current stimulus.
    fn observe(&mut self) -> Observation;

    /// Applies `action`, transitions the environment and returns the reward.
    ///
    /// Sets the terminal flag as a side effect when the episode ends.
    fn effect(&mut self, action: usize) -> f64;
}
