//! Evaluated points and the append-only history of a solve.

use std::time::Duration;

use thiserror::Error;

use tether_core::Snapshot;

/// Why a point was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvalKind {
    /// A point requested by the optimizer.
    Objective,

    /// A perturbed point evaluated to estimate a gradient.
    Gradient,
}

/// Errors raised when assembling a [`SolutionPoint`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PointError {
    /// A gradient does not have one entry per variable.
    #[error("gradient has {actual} entries but the point has {expected} variables")]
    GradientLength { expected: usize, actual: usize },
}

/// One completed evaluation of the black-box pipeline.
///
/// A point is created only after its evaluation finished, so the objective
/// is always present. Points are never mutated once pushed into a
/// [`History`].
#[derive(Debug, Clone)]
pub struct SolutionPoint<I, O> {
    index: usize,
    kind: EvalKind,
    x: Vec<f64>,
    objective: f64,
    constraints: Vec<f64>,
    snapshot: Snapshot<I, O>,
    eval_time: Duration,
    gradient: Option<Gradient<I, O>>,
}

/// Gradient data attached to an objective-kind point.
#[derive(Debug, Clone)]
struct Gradient<I, O> {
    objective: Vec<f64>,
    constraints: Vec<Vec<f64>>,
    points: Vec<SolutionPoint<I, O>>,
    time: Duration,
}

impl<I, O> SolutionPoint<I, O> {
    pub(crate) fn new(
        kind: EvalKind,
        x: Vec<f64>,
        objective: f64,
        constraints: Vec<f64>,
        snapshot: Snapshot<I, O>,
        eval_time: Duration,
    ) -> Self {
        Self {
            index: 0,
            kind,
            x,
            objective,
            constraints,
            snapshot,
            eval_time,
            gradient: None,
        }
    }

    /// Attaches the objective gradient, the constraint gradients and the
    /// perturbed points they were estimated from.
    pub(crate) fn with_gradient(
        mut self,
        objective: Vec<f64>,
        constraints: Vec<Vec<f64>>,
        points: Vec<SolutionPoint<I, O>>,
        time: Duration,
    ) -> Result<Self, PointError> {
        let expected = self.x.len();
        let lengths = std::iter::once(objective.len()).chain(constraints.iter().map(Vec::len));
        for actual in lengths {
            if actual != expected {
                return Err(PointError::GradientLength { expected, actual });
            }
        }

        self.gradient = Some(Gradient {
            objective,
            constraints,
            points,
            time,
        });
        Ok(self)
    }

    /// Position of this point in its history, or within its parent's
    /// perturbed points for gradient-kind points.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns why this point was evaluated.
    #[must_use]
    pub fn kind(&self) -> EvalKind {
        self.kind
    }

    /// Returns the solver variables.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Returns the objective value.
    #[must_use]
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Returns the constraint values, ordered like the problem's constraints.
    #[must_use]
    pub fn constraints(&self) -> &[f64] {
        &self.constraints
    }

    /// Returns the model input and output of this evaluation.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot<I, O> {
        &self.snapshot
    }

    /// Returns the wall-clock duration of the evaluation.
    #[must_use]
    pub fn eval_time(&self) -> Duration {
        self.eval_time
    }

    /// Returns the objective gradient, if one was computed.
    #[must_use]
    pub fn gradient(&self) -> Option<&[f64]> {
        self.gradient.as_ref().map(|g| g.objective.as_slice())
    }

    /// Returns the gradient of each constraint, if gradients were computed.
    #[must_use]
    pub fn constraint_gradients(&self) -> Option<&[Vec<f64>]> {
        self.gradient.as_ref().map(|g| g.constraints.as_slice())
    }

    /// Returns the perturbed points evaluated for the gradient.
    #[must_use]
    pub fn gradient_points(&self) -> &[SolutionPoint<I, O>] {
        self.gradient.as_ref().map_or(&[], |g| g.points.as_slice())
    }

    /// Returns the wall-clock duration of the gradient phase.
    #[must_use]
    pub fn gradient_time(&self) -> Option<Duration> {
        self.gradient.as_ref().map(|g| g.time)
    }

    /// Total time spent on this point, gradient included.
    #[must_use]
    pub fn total_time(&self) -> Duration {
        self.eval_time + self.gradient_time().unwrap_or_default()
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }
}

/// Append-only record of every point evaluated during a solve.
#[derive(Debug, Clone)]
pub struct History<I, O> {
    points: Vec<SolutionPoint<I, O>>,
}

impl<I, O> Default for History<I, O> {
    fn default() -> Self {
        Self { points: Vec::new() }
    }
}

impl<I, O> History<I, O> {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a point, assigning its index, and returns a reference to it.
    pub(crate) fn push(&mut self, mut point: SolutionPoint<I, O>) -> &SolutionPoint<I, O> {
        point.set_index(self.points.len());
        self.points.push(point);
        &self.points[self.points.len() - 1]
    }

    /// Returns the number of recorded points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if nothing has been evaluated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the point at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SolutionPoint<I, O>> {
        self.points.get(index)
    }

    /// Iterates over the points in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, SolutionPoint<I, O>> {
        self.points.iter()
    }

    /// Returns the most recent point.
    #[must_use]
    pub fn last(&self) -> Option<&SolutionPoint<I, O>> {
        self.points.last()
    }

    /// Returns the objective-kind point with the lowest objective.
    ///
    /// Ties resolve to the earliest point.
    #[must_use]
    pub fn best(&self) -> Option<&SolutionPoint<I, O>> {
        self.points
            .iter()
            .filter(|p| p.kind == EvalKind::Objective)
            .fold(None, |best: Option<&SolutionPoint<I, O>>, p| match best {
                Some(b) if b.objective <= p.objective => Some(b),
                _ => Some(p),
            })
    }
}

impl<'a, I, O> IntoIterator for &'a History<I, O> {
    type Item = &'a SolutionPoint<I, O>;
    type IntoIter = std::slice::Iter<'a, SolutionPoint<I, O>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
