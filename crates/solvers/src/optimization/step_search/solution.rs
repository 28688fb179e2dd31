/// Indicates why the step search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// The last improvement was below the change limit, or the step shrank
    /// below its tolerance without finding a better point.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIters,

    /// Stopped early due to an observer decision.
    StoppedByObserver,

    /// Stopped because cancellation was requested.
    Cancelled,
}

/// The result of a step search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Final solver status.
    pub status: Status,

    /// Best x found, or the initial position if nothing was evaluated.
    pub x: f64,

    /// Objective at `x`, if it was evaluated.
    pub objective: Option<f64>,

    /// Iteration count when the search finished.
    pub iters: usize,

    /// Step size when the search finished.
    pub step_size: f64,
}
