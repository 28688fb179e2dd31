use thiserror::Error;

/// Errors that can occur when evaluating the objective.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The point has the wrong number of variables.
    #[error("expected {expected} variables, got {actual}")]
    Dimension { expected: usize, actual: usize },

    /// The optimizer requested a point containing NaN or infinity.
    #[error("optimizer requested a non-finite point {x:?}")]
    NonFiniteInput { x: Vec<f64> },

    /// Cancellation was requested before the evaluation could run.
    #[error("evaluation cancelled")]
    Cancelled,

    /// Mapping solver variables to model input failed.
    #[error("input mapping failed")]
    Input(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The model call failed.
    #[error("model call failed")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Computing the objective from the model output failed.
    #[error("objective computation failed")]
    Objective(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Computing a constraint value failed.
    #[error("constraint {index} failed")]
    Constraint {
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The objective evaluated to NaN or infinity.
    #[error("objective is {value} at {x:?}")]
    NonFiniteObjective { x: Vec<f64>, value: f64 },

    /// A constraint evaluated to NaN or infinity.
    #[error("constraint {index} is {value}")]
    NonFiniteConstraint { index: usize, value: f64 },

    /// The finite-difference gradient could not be estimated.
    #[error("gradient estimation failed")]
    Gradient(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EvalError {
    /// Returns `true` if this error is a cancellation rather than a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
