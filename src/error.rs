//! Typed per-call failures of the scoring engine

use thiserror::Error;

/// The classifier rejected a feature vector
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("feature vector has {found} entries, classifier expects {expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("feature {position} is '{found}', classifier expects '{expected}'")]
    SchemaMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("feature '{0}' is categorical but the classifier expects a number")]
    UnexpectedCategorical(String),

    #[error("feature '{0}' is numeric but the classifier expects a category")]
    UnexpectedNumeric(String),

    #[error("classifier produced a non-finite probability ({0})")]
    NonFinite(f64),
}

/// Failure of a scoring or matching call
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("genus '{0}' not found in trait store")]
    GenusNotFound(String),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}
