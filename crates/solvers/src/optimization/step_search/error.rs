use crate::objective::EvalError;

use super::Status;

/// Errors that can occur during the step search.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The objective must have exactly one variable.
    #[error("step search needs exactly one variable, objective has {0}")]
    WrongDimension(usize),

    /// The bounds are not usable or do not contain the initial position.
    #[error("invalid bounds [{lower}, {upper}] for initial position {initial}")]
    InvalidBounds { lower: f64, upper: f64, initial: f64 },

    /// Evaluating a candidate failed.
    #[error("evaluation failed")]
    Evaluation(#[from] EvalError),

    /// The search already finished.
    #[error("search already finished with status {0:?}")]
    Finished(Status),

    /// A previous evaluation failed and the search cannot continue.
    #[error("search failed on an earlier evaluation")]
    Failed,
}
