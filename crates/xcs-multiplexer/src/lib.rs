//! The Boolean multiplexer, the classic benchmark for learning classifier
//! systems.
//!
//! A multiplexer of size `k + 2^k` reads its first `k` bits as an address
//! (most significant bit first) and answers with the data bit at that
//! address among the remaining `2^k` bits:
//!
//! ```text
//!  6-bit multiplexer, k = 2
//!
//!   1 0 | 0 0 1 0
//!   ^^^   ^ ^ ^ ^
//!  addr   0 1 2 3
//!   = 2 ------^      answer = 1
//! ```
//!
//! Every episode is a single step: the learner sees random bits, answers
//! with action `0` or `1`, and receives a reward of 1000 for the correct
//! answer and 0 otherwise.

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use xcs_core::{Environment, Observation, Seed};

/// Reward for answering correctly.
pub const CORRECT_REWARD: f64 = 1000.0;
/// Reward for answering incorrectly.
pub const INCORRECT_REWARD: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MultiplexerError {
    #[display("{size} bits is not a valid multiplexer (expected k + 2^k bits)")]
    InvalidSize { size: usize },
}

/// A Boolean multiplexer environment with its own random source.
#[derive(Debug, Clone)]
pub struct Multiplexer {
    size: usize,
    control_bits: usize,
    rng: Pcg32,
    correct_answer: usize,
    terminal: bool,
}

impl Multiplexer {
    /// Creates a multiplexer of `size` bits with a random seed.
    pub fn new(size: usize) -> Result<Self, MultiplexerError> {
        Self::with_seed(size, rand::rng().random())
    }

    /// Creates a multiplexer of `size` bits producing a reproducible
    /// sequence of stimuli.
    pub fn with_seed(size: usize, seed: Seed) -> Result<Self, MultiplexerError> {
        let control_bits = control_bits(size).ok_or(MultiplexerError::InvalidSize { size })?;
        Ok(Self {
            size,
            control_bits,
            rng: Pcg32::from_seed(seed.0),
            correct_answer: 0,
            terminal: false,
        })
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn control_bits(&self) -> usize {
        self.control_bits
    }

    /// The data bit addressed by the control bits of `attributes`.
    ///
    /// # Panics
    ///
    /// Panics if `attributes` is shorter than the multiplexer.
    #[must_use]
    pub fn answer(&self, attributes: &[u8]) -> usize {
        let (address, data) = attributes[..self.size].split_at(self.control_bits);
        let index = address
            .iter()
            .fold(0, |acc, &bit| (acc << 1) | usize::from(bit));
        usize::from(data[index])
    }
}

/// `k` such that `size == k + 2^k`, for `k >= 1`.
fn control_bits(size: usize) -> Option<usize> {
    (1..usize::BITS)
        .map_while(|k| {
            let k = usize::try_from(k).ok()?;
            let data_bits = 1_usize.checked_shl(u32::try_from(k).ok()?)?;
            Some((k, k.checked_add(data_bits)?))
        })
        .find(|&(_, total)| total == size)
        .map(|(k, _)| k)
}

impl Environment for Multiplexer {
    fn is_at_terminal_state(&self) -> bool {
        self.terminal
    }

    fn reset(&mut self) {
        self.terminal = false;
    }

    fn observe(&mut self) -> Observation {
        let attributes = (0..self.size)
            .map(|_| self.rng.random_range(0..=1))
            .collect::<Vec<u8>>();
        self.correct_answer = self.answer(&attributes);
        Observation {
            attributes,
            ground_truth: self.correct_answer,
        }
    }

    fn effect(&mut self, action: usize) -> f64 {
        self.terminal = true;
        if action == self.correct_answer {
            CORRECT_REWARD
        } else {
            INCORRECT_REWARD
        }
    }
}
