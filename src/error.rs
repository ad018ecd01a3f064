//! Core analysis errors.
//!
//! Every failure of the analysis pipeline is terminal for the request that
//! produced it. Callers surface these directly; there is nothing to retry
//! in a pure computation.

use thiserror::Error;

/// Errors raised by decoding, extraction and pattern analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Input could not be decoded, or its dimensions disagree with its data.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// A channel or bit-plane matrix had no elements.
    #[error("matrix has no elements")]
    EmptyMatrix,
}

impl AnalysisError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidImage(reason.into())
    }
}

/// Result alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
