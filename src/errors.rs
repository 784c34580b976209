use thiserror::Error;

/// Fatal errors that abort an analysis run before it produces a result.
///
/// Per-response failures are never reported through this type; they are
/// recorded as [`crate::data::RecordError`] entries on the run instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid configuration or an empty lexicon; nothing was processed.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The run's cancellation token was set; no partial run is returned.
    #[error("analysis run cancelled after {completed} of {total} responses")]
    Cancelled {
        /// Responses processed before the flag was observed.
        completed: usize,
        /// Responses in the batch.
        total: usize,
    },
}

impl AnalysisError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
