/// Events emitted by the augmented Lagrangian solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    /// The objective was evaluated on behalf of the inner solver.
    Evaluated {
        /// Number of evaluations so far, this one included.
        evaluation: usize,

        /// The evaluated point.
        x: &'a [f64],

        /// Objective value at `x`.
        objective: f64,

        /// Constraint values at `x`.
        constraints: &'a [f64],

        /// Penalized objective the inner solver minimizes.
        lagrangian: f64,
    },

    /// An outer iteration finished and the multipliers were updated.
    OuterIteration {
        /// Outer iteration number, starting at 1.
        iter: usize,

        /// Best point of this iteration.
        x: &'a [f64],

        /// Objective value at `x`.
        objective: f64,

        /// Largest constraint violation at `x`.
        infeasibility: f64,

        /// Penalty parameter for the next iteration.
        penalty: f64,
    },
}

impl Event<'_> {
    /// Returns the point the event refers to.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        match self {
            Self::Evaluated { x, .. } | Self::OuterIteration { x, .. } => x,
        }
    }

    /// Returns the objective value at [`x`](Self::x).
    #[must_use]
    pub fn objective(&self) -> f64 {
        match self {
            Self::Evaluated { objective, .. } | Self::OuterIteration { objective, .. } => *objective,
        }
    }
}
