//! Solvers for the bound-constrained subproblem of each outer iteration.

mod cobyla;
mod projected_gradient;

pub use self::cobyla::{Cobyla, CobylaError};
pub use self::projected_gradient::{ProjectedGradient, ProjectedGradientError};

use crate::optimization::Bounds;

/// The penalized objective handed to an [`InnerSolver`].
pub trait InnerObjective {
    /// Returns the value at `x`, or `None` once the solve must stop.
    ///
    /// After the first `None` every later call also returns `None`, and
    /// the inner solver should return as soon as possible.
    fn value(&mut self, x: &[f64]) -> Option<f64>;

    /// Like [`value`](Self::value), also writing the gradient into `grad`.
    fn value_and_gradient(&mut self, x: &[f64], grad: &mut [f64]) -> Option<f64>;
}

/// How an inner solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InnerStatus {
    /// The inner solver's own tolerances were met.
    Converged,

    /// The inner solver used up its budget.
    Exhausted,

    /// The objective asked to stop.
    Interrupted,
}

/// The result of an inner solve.
#[derive(Debug, Clone, PartialEq)]
pub struct InnerOutcome {
    /// Final point of the inner solver.
    pub x: Vec<f64>,

    /// Penalized objective at `x`, if known.
    pub value: Option<f64>,

    /// How the solve ended.
    pub status: InnerStatus,
}

/// Minimizes a penalized objective within box bounds.
pub trait InnerSolver {
    /// Minimizes `f` within `bounds`, starting at `x0`.
    fn minimize(&mut self, f: &mut dyn InnerObjective, x0: &[f64], bounds: &Bounds)
    -> InnerOutcome;
}
