use super::{Point, Rejection};

/// Events emitted by the step search, one per iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A candidate was evaluated.
    Evaluated {
        /// Iteration number, starting at 1.
        iter: usize,

        /// The evaluated candidate.
        point: Point,

        /// Best point after this evaluation.
        best: Point,

        /// Whether the candidate became the new best.
        improved: bool,

        /// Step size that produced this candidate.
        step_size: f64,
    },

    /// A candidate was skipped without evaluation.
    Rejected {
        /// Iteration number, starting at 1.
        iter: usize,

        /// The skipped candidate.
        x: f64,

        /// Why it was skipped.
        reason: Rejection,

        /// Current best point.
        best: Point,

        /// Step size that produced this candidate.
        step_size: f64,
    },
}

impl Event {
    /// Returns the iteration number.
    #[must_use]
    pub fn iter(&self) -> usize {
        match self {
            Self::Evaluated { iter, .. } | Self::Rejected { iter, .. } => *iter,
        }
    }

    /// Returns the current best point.
    #[must_use]
    pub fn best(&self) -> Point {
        match self {
            Self::Evaluated { best, .. } | Self::Rejected { best, .. } => *best,
        }
    }
}
