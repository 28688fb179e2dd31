use thiserror::Error;

use crate::optimization::Bounds;

use super::{InnerObjective, InnerOutcome, InnerSolver, InnerStatus};

/// Gradient-based inner solver: steepest descent projected onto the bounds,
/// with Armijo backtracking.
///
/// Gradients come from the objective wrapper's finite differences, so every
/// accepted step costs one gradient evaluation on top of the line search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectedGradient {
    max_iters: usize,
    initial_step: f64,
    armijo: f64,
    backtrack: f64,
    max_backtracks: usize,
    gtol: f64,
}

/// Errors that can occur when configuring [`ProjectedGradient`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProjectedGradientError {
    #[error("max_iters must be at least 1")]
    MaxIters,

    #[error("initial_step must be finite and positive")]
    InitialStep,

    #[error("armijo must lie in (0, 1)")]
    Armijo,

    #[error("backtrack must lie in (0, 1)")]
    Backtrack,

    #[error("gtol must be finite and non-negative")]
    Gtol,
}

impl Default for ProjectedGradient {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(200, 1.0, 1e-4, 0.5, 30, 1e-8).unwrap()
    }
}

impl ProjectedGradient {
    /// Creates a projected gradient inner solver.
    ///
    /// # Errors
    ///
    /// Returns an error if any setting is out of range.
    pub fn new(
        max_iters: usize,
        initial_step: f64,
        armijo: f64,
        backtrack: f64,
        max_backtracks: usize,
        gtol: f64,
    ) -> Result<Self, ProjectedGradientError> {
        if max_iters == 0 {
            return Err(ProjectedGradientError::MaxIters);
        }
        if !initial_step.is_finite() || initial_step <= 0.0 {
            return Err(ProjectedGradientError::InitialStep);
        }
        if !(armijo > 0.0 && armijo < 1.0) {
            return Err(ProjectedGradientError::Armijo);
        }
        if !(backtrack > 0.0 && backtrack < 1.0) {
            return Err(ProjectedGradientError::Backtrack);
        }
        if !gtol.is_finite() || gtol < 0.0 {
            return Err(ProjectedGradientError::Gtol);
        }

        Ok(Self {
            max_iters,
            initial_step,
            armijo,
            backtrack,
            max_backtracks,
            gtol,
        })
    }

    /// Largest component of the projected unit step `P(x - g) - x`.
    fn projected_gradient_norm(x: &[f64], grad: &[f64], bounds: &Bounds) -> f64 {
        x.iter()
            .zip(grad)
            .zip(bounds.pairs())
            .map(|((xi, gi), (lo, hi))| ((xi - gi).clamp(lo, hi) - xi).abs())
            .fold(0.0, f64::max)
    }
}

impl InnerSolver for ProjectedGradient {
    fn minimize(
        &mut self,
        f: &mut dyn InnerObjective,
        x0: &[f64],
        bounds: &Bounds,
    ) -> InnerOutcome {
        let outcome = |x: Vec<f64>, value: Option<f64>, status| InnerOutcome { x, value, status };

        let mut x = x0.to_vec();
        bounds.clamp(&mut x);
        let mut grad = vec![0.0; x.len()];
        let Some(mut fx) = f.value_and_gradient(&x, &mut grad) else {
            return outcome(x, None, InnerStatus::Interrupted);
        };
        let mut step = self.initial_step;

        for iter in 0..self.max_iters {
            if Self::projected_gradient_norm(&x, &grad, bounds) <= self.gtol {
                return outcome(x, Some(fx), InnerStatus::Converged);
            }

            let mut accepted = None;
            let mut trial = step;
            for _ in 0..=self.max_backtracks {
                let mut candidate: Vec<f64> =
                    x.iter().zip(&grad).map(|(xi, gi)| xi - trial * gi).collect();
                bounds.clamp(&mut candidate);
                if candidate == x {
                    break;
                }

                let decrease: f64 = grad
                    .iter()
                    .zip(candidate.iter().zip(&x))
                    .map(|(g, (c, xi))| g * (c - xi))
                    .sum();
                let Some(value) = f.value(&candidate) else {
                    return outcome(x, Some(fx), InnerStatus::Interrupted);
                };
                if value <= fx + self.armijo * decrease {
                    accepted = Some(candidate);
                    break;
                }
                trial *= self.backtrack;
            }

            let Some(candidate) = accepted else {
                log::trace!("projected gradient stalled after {iter} iterations");
                return outcome(x, Some(fx), InnerStatus::Converged);
            };

            x = candidate;
            let Some(value) = f.value_and_gradient(&x, &mut grad) else {
                return outcome(x, None, InnerStatus::Interrupted);
            };
            fx = value;
            step = (trial / self.backtrack).min(self.initial_step);
        }

        outcome(x, Some(fx), InnerStatus::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    /// `(x - 3)² + 4(y + 1)²` with an exact gradient.
    struct Bowl {
        calls: usize,
        limit: usize,
    }

    impl Bowl {
        fn unlimited() -> Self {
            Self {
                calls: 0,
                limit: usize::MAX,
            }
        }
    }

    impl InnerObjective for Bowl {
        fn value(&mut self, x: &[f64]) -> Option<f64> {
            if self.calls >= self.limit {
                return None;
            }
            self.calls += 1;
            Some((x[0] - 3.0).powi(2) + 4.0 * (x[1] + 1.0).powi(2))
        }

        fn value_and_gradient(&mut self, x: &[f64], grad: &mut [f64]) -> Option<f64> {
            let value = self.value(x)?;
            grad[0] = 2.0 * (x[0] - 3.0);
            grad[1] = 8.0 * (x[1] + 1.0);
            Some(value)
        }
    }

    #[test]
    fn finds_interior_minimum() {
        let bounds = Bounds::new(vec![-5.0, -5.0], vec![5.0, 5.0]).unwrap();
        let mut f = Bowl::unlimited();

        let outcome = ProjectedGradient::default().minimize(&mut f, &[0.0, 0.0], &bounds);

        assert_eq!(outcome.status, InnerStatus::Converged);
        assert_relative_eq!(outcome.x[0], 3.0, epsilon = 1e-6);
        assert_relative_eq!(outcome.x[1], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn stops_on_active_bound() {
        let bounds = Bounds::new(vec![-5.0, 0.0], vec![2.0, 5.0]).unwrap();
        let mut f = Bowl::unlimited();

        let outcome = ProjectedGradient::default().minimize(&mut f, &[0.0, 3.0], &bounds);

        assert_relative_eq!(outcome.x[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(outcome.x[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn interruption_returns_immediately() {
        let bounds = Bounds::new(vec![-5.0, -5.0], vec![5.0, 5.0]).unwrap();
        let mut f = Bowl { calls: 0, limit: 3 };

        let outcome = ProjectedGradient::default().minimize(&mut f, &[0.0, 0.0], &bounds);

        assert_eq!(outcome.status, InnerStatus::Interrupted);
        assert_eq!(f.calls, 3);
    }

    #[test]
    fn rejects_bad_settings() {
        assert_eq!(
            ProjectedGradient::new(10, 1.0, 1.0, 0.5, 10, 0.0),
            Err(ProjectedGradientError::Armijo)
        );
        assert_eq!(
            ProjectedGradient::new(10, 1.0, 1e-4, 0.0, 10, 0.0),
            Err(ProjectedGradientError::Backtrack)
        );
        assert_eq!(
            ProjectedGradient::new(0, 1.0, 1e-4, 0.5, 10, 0.0),
            Err(ProjectedGradientError::MaxIters)
        );
    }
}
