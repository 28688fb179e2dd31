use tether_core::{Constraint, ConstraintKind};

/// Lagrange multipliers and penalty parameter of the current outer iteration.
///
/// Equality constraints contribute `(h + λ/ρ)²`, inequality constraints
/// `max(0, g + μ/ρ)²`, both scaled by `ρ/2`.
#[derive(Debug, Clone)]
pub(super) struct Multipliers {
    constraints: Vec<Constraint>,
    values: Vec<f64>,
    rho: f64,
}

impl Multipliers {
    pub(super) fn new(constraints: &[Constraint], rho: f64) -> Self {
        Self {
            constraints: constraints.to_vec(),
            values: vec![0.0; constraints.len()],
            rho,
        }
    }

    pub(super) fn rho(&self) -> f64 {
        self.rho
    }

    pub(super) fn set_rho(&mut self, rho: f64) {
        self.rho = rho;
    }

    pub(super) fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Shifted constraint value entering the penalty term.
    fn shifted(&self, index: usize, value: f64) -> f64 {
        let shifted = value + self.values[index] / self.rho;
        match self.constraints[index].kind() {
            ConstraintKind::Equality => shifted,
            ConstraintKind::Inequality => shifted.max(0.0),
        }
    }

    pub(super) fn lagrangian(&self, objective: f64, constraints: &[f64]) -> f64 {
        let penalty: f64 = constraints
            .iter()
            .enumerate()
            .map(|(i, &c)| self.shifted(i, c).powi(2))
            .sum();
        objective + 0.5 * self.rho * penalty
    }

    /// Writes the gradient of the Lagrangian into `out`.
    pub(super) fn gradient(
        &self,
        objective: &[f64],
        constraints: &[f64],
        constraint_gradients: &[Vec<f64>],
        out: &mut [f64],
    ) {
        out.copy_from_slice(objective);
        for (i, (&c, grad)) in constraints.iter().zip(constraint_gradients).enumerate() {
            let weight = self.rho * self.shifted(i, c);
            for (o, g) in out.iter_mut().zip(grad) {
                *o += weight * g;
            }
        }
    }

    /// First-order multiplier update from the constraint values at the
    /// subproblem minimizer.
    pub(super) fn update(&mut self, constraints: &[f64]) {
        for (i, &c) in constraints.iter().enumerate() {
            let next = self.values[i] + self.rho * c;
            self.values[i] = match self.constraints[i].kind() {
                ConstraintKind::Equality => next,
                ConstraintKind::Inequality => next.max(0.0),
            };
        }
    }

    /// Largest constraint violation.
    pub(super) fn infeasibility(&self, constraints: &[f64]) -> f64 {
        self.constraints
            .iter()
            .zip(constraints)
            .map(|(constraint, &c)| constraint.violation(c))
            .fold(0.0, f64::max)
    }

    /// Sum of squared violations.
    pub(super) fn squared_violation(&self, constraints: &[f64]) -> f64 {
        self.constraints
            .iter()
            .zip(constraints)
            .map(|(constraint, &c)| constraint.violation(c).powi(2))
            .sum()
    }

    pub(super) fn is_feasible(&self, constraints: &[f64]) -> bool {
        self.constraints
            .iter()
            .zip(constraints)
            .all(|(constraint, &c)| constraint.is_satisfied(c))
    }

    #[cfg(test)]
    pub(super) fn values(&self) -> &[f64] {
        &self.values
    }
}
