use crate::objective::EvalError;

/// Errors that can occur during the augmented Lagrangian solve.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bounds, start point and objective disagree on the number of variables.
    #[error("expected {expected} variables, got {actual}")]
    WrongDimension { expected: usize, actual: usize },

    /// The start point lies outside the bounds.
    #[error("start value x[{index}] = {value} lies outside the bounds")]
    StartOutOfBounds { index: usize, value: f64 },

    /// Evaluating the objective failed.
    #[error("evaluation failed")]
    Evaluation(#[from] EvalError),
}
