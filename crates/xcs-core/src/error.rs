/// Unrecoverable conditions that abort a learning run.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum XcsError {
    /// A selection routine was asked to pick from an empty candidate set.
    #[display("no candidate available for {context}")]
    EmptySelection { context: &'static str },
    /// The configuration contains a value outside its valid range.
    #[display("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
    /// The stimulus does not have the attribute count the population was built for.
    #[display("stimulus has {actual} attributes, expected {expected}")]
    StimulusLength { expected: usize, actual: usize },
}

impl XcsError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
