use std::time::Duration;

/// Indicates why the augmented Lagrangian solve stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// The objective or variables stopped changing at a feasible point.
    Converged,

    /// A feasible point reached the configured stop value.
    StopValueReached,

    /// Reached the evaluation limit.
    MaxEvals,

    /// Reached the wall-clock limit.
    MaxTime,

    /// Reached the outer iteration limit.
    MaxIters,

    /// Stopped early due to an observer decision.
    StoppedByObserver,

    /// Stopped because cancellation was requested.
    Cancelled,
}

/// The result of an augmented Lagrangian solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Final solver status.
    pub status: Status,

    /// Reported point: the best feasible point if one was found, otherwise
    /// the best point of the last outer iteration, otherwise the start.
    pub x: Vec<f64>,

    /// Objective at `x`, if it was evaluated.
    pub objective: Option<f64>,

    /// Constraint values at `x`, empty if it was not evaluated.
    pub constraints: Vec<f64>,

    /// Whether every constraint is satisfied within its tolerance at `x`.
    pub feasible: bool,

    /// Number of objective evaluations, gradient perturbations excluded.
    pub evaluations: usize,

    /// Number of completed outer iterations.
    pub iters: usize,

    /// Wall-clock duration of the solve.
    pub elapsed: Duration,
}
