//! Ternary conditions over binary attribute vectors.
//!
//! A [`Condition`] is a fixed-length string over `{0, 1, #}`. A literal
//! symbol must equal the stimulus attribute at the same position, while the
//! don't-care symbol `#` matches any value. Conditions render and parse in the
//! usual compact notation:
//!
//! ```
//! use xcs_core::Condition;
//!
//! let condition: Condition = "0#1".parse().unwrap();
//! assert!(condition.matches(&[0, 1, 1]));
//! assert!(!condition.matches(&[1, 1, 1]));
//! assert_eq!(condition.to_string(), "0#1");
//! ```

use std::{fmt, ops::Range, str::FromStr};

use rand::Rng;

/// One position of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Symbol {
    Zero,
    One,
    DontCare,
}

impl Symbol {
    /// Returns the literal symbol for an attribute value.
    #[must_use]
    pub const fn literal(value: u8) -> Self {
        if value == 0 { Self::Zero } else { Self::One }
    }

    /// Returns `true` if this symbol accepts the attribute value.
    #[must_use]
    pub const fn matches(self, value: u8) -> bool {
        match self {
            Self::Zero => value == 0,
            Self::One => value == 1,
            Self::DontCare => true,
        }
    }

    const fn as_char(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
            Self::DontCare => '#',
        }
    }
}

impl TryFrom<char> for Symbol {
    type Error = ParseConditionError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '0' => Ok(Self::Zero),
            '1' => Ok(Self::One),
            '#' => Ok(Self::DontCare),
            symbol => Err(ParseConditionError { symbol }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid condition symbol {symbol:?} (expected '0', '1' or '#')")]
pub struct ParseConditionError {
    symbol: char,
}

/// An ordered sequence of condition symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition(Vec<Symbol>);

impl Condition {
    #[must_use]
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    /// Creates a condition of `len` don't-care symbols, matching every stimulus.
    #[must_use]
    pub fn general(len: usize) -> Self {
        Self(vec![Symbol::DontCare; len])
    }

    /// Creates a covering condition for `stimulus`.
    ///
    /// Each position independently becomes `#` with probability `p_hash` and
    /// the stimulus's literal value otherwise, so the result always matches
    /// the stimulus.
    pub fn covering<R>(stimulus: &[u8], p_hash: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self(
            stimulus
                .iter()
                .map(|&value| {
                    if rng.random::<f64>() < p_hash {
                        Symbol::DontCare
                    } else {
                        Symbol::literal(value)
                    }
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub(crate) fn symbols_mut(&mut self) -> &mut [Symbol] {
        &mut self.0
    }

    /// Returns `true` if every position accepts the corresponding attribute.
    ///
    /// A stimulus of a different length never matches.
    #[must_use]
    pub fn matches(&self, stimulus: &[u8]) -> bool {
        self.0.len() == stimulus.len()
            && self
                .0
                .iter()
                .zip(stimulus)
                .all(|(symbol, &value)| symbol.matches(value))
    }

    /// Number of don't-care positions.
    #[must_use]
    pub fn generality(&self) -> usize {
        self.0.iter().filter(|s| s.is_dont_care()).count()
    }

    /// Returns `true` if `self` has strictly more `#` symbols than `other` and
    /// every literal of `self` appears at the same position in `other`.
    ///
    /// Such a condition matches a strict superset of the stimuli matched by
    /// `other`.
    #[must_use]
    pub fn is_more_general_than(&self, other: &Self) -> bool {
        if self.len() != other.len() || self.generality() <= other.generality() {
            return false;
        }
        self.0
            .iter()
            .zip(&other.0)
            .all(|(a, b)| a.is_dont_care() || a == b)
    }

    /// Exchanges the symbols in `range` between two conditions of equal length.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ or the range is out of bounds.
    pub fn swap_range(&mut self, other: &mut Self, range: Range<usize>) {
        assert_eq!(self.len(), other.len());
        self.0[range.clone()].swap_with_slice(&mut other.0[range]);
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for Condition {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(Symbol::try_from)
            .collect::<Result<_, _>>()
            .map(Self)
    }
}
