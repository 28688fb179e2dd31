use std::cell::RefCell;

use thiserror::Error;

use crate::optimization::Bounds;

use super::{InnerObjective, InnerOutcome, InnerSolver, InnerStatus};

/// Derivative-free inner solver using COBYLA.
///
/// Never requests gradients, so each subproblem evaluation is a single
/// pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cobyla {
    max_evals: usize,
    rho_begin: f64,
    ftol_rel: f64,
}

/// Errors that can occur when configuring [`Cobyla`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CobylaError {
    #[error("max_evals must be at least 1")]
    MaxEvals,

    #[error("rho_begin must be finite and positive")]
    RhoBegin,

    #[error("ftol_rel must be finite and non-negative")]
    FtolRel,
}

impl Default for Cobyla {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(500, 0.5, 1e-10).unwrap()
    }
}

impl Cobyla {
    /// Creates a COBYLA inner solver.
    ///
    /// `rho_begin` is the initial trust-region radius.
    ///
    /// # Errors
    ///
    /// Returns an error if any setting is out of range.
    pub fn new(max_evals: usize, rho_begin: f64, ftol_rel: f64) -> Result<Self, CobylaError> {
        if max_evals == 0 {
            return Err(CobylaError::MaxEvals);
        }
        if !rho_begin.is_finite() || rho_begin <= 0.0 {
            return Err(CobylaError::RhoBegin);
        }
        if !ftol_rel.is_finite() || ftol_rel < 0.0 {
            return Err(CobylaError::FtolRel);
        }

        Ok(Self {
            max_evals,
            rho_begin,
            ftol_rel,
        })
    }
}

impl InnerSolver for Cobyla {
    fn minimize(
        &mut self,
        f: &mut dyn InnerObjective,
        x0: &[f64],
        bounds: &Bounds,
    ) -> InnerOutcome {
        // COBYLA cannot be interrupted, so once the objective refuses to
        // evaluate it sees a constant value and winds down without new
        // pipeline runs.
        let state = RefCell::new((f, None::<f64>, false));
        let func = |x: &[f64], _: &mut ()| {
            let mut guard = state.borrow_mut();
            let (f, last, interrupted) = &mut *guard;
            if *interrupted {
                return last.unwrap_or(f64::MAX);
            }
            match f.value(x) {
                Some(value) => {
                    *last = Some(value);
                    value
                }
                None => {
                    *interrupted = true;
                    last.unwrap_or(f64::MAX)
                }
            }
        };

        let pairs: Vec<(f64, f64)> = bounds.pairs().collect();
        let cons: Vec<&dyn ::cobyla::Func<()>> = vec![];
        let result = ::cobyla::minimize(
            func,
            x0,
            &pairs,
            &cons,
            (),
            self.max_evals,
            ::cobyla::RhoBeg::All(self.rho_begin),
            Some(::cobyla::StopTols {
                ftol_rel: self.ftol_rel,
                ..::cobyla::StopTols::default()
            }),
        );

        let (_, last, interrupted) = state.into_inner();
        match result {
            Ok((status, x, value)) => InnerOutcome {
                x,
                value: Some(value),
                status: match status {
                    _ if interrupted => InnerStatus::Interrupted,
                    ::cobyla::SuccessStatus::MaxEvalReached
                    | ::cobyla::SuccessStatus::MaxTimeReached => {
                        log::debug!("cobyla used up its budget: {status:?}");
                        InnerStatus::Exhausted
                    }
                    _ => InnerStatus::Converged,
                },
            },
            Err(e) => {
                let status = if interrupted {
                    InnerStatus::Interrupted
                } else {
                    log::debug!("cobyla stopped without converging: {:?}", e.0);
                    InnerStatus::Exhausted
                };
                InnerOutcome {
                    x: x0.to_vec(),
                    value: last,
                    status,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    struct Shifted {
        calls: usize,
        limit: usize,
    }

    impl InnerObjective for Shifted {
        fn value(&mut self, x: &[f64]) -> Option<f64> {
            if self.calls >= self.limit {
                return None;
            }
            self.calls += 1;
            Some((x[0] - 1.0).powi(2) + (x[1] + 0.5).powi(2))
        }

        fn value_and_gradient(&mut self, _x: &[f64], _grad: &mut [f64]) -> Option<f64> {
            unreachable!("cobyla is derivative-free")
        }
    }

    #[test]
    fn minimizes_bounded_quadratic() {
        let mut f = Shifted {
            calls: 0,
            limit: usize::MAX,
        };
        let bounds = Bounds::new(vec![-2.0, -2.0], vec![2.0, 2.0]).unwrap();

        let outcome = Cobyla::default().minimize(&mut f, &[0.0, 0.0], &bounds);

        assert_eq!(outcome.status, InnerStatus::Converged);
        assert_relative_eq!(outcome.x[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(outcome.x[1], -0.5, epsilon = 1e-3);
    }

    #[test]
    fn stops_calling_after_interruption() {
        let mut f = Shifted { calls: 0, limit: 7 };
        let bounds = Bounds::new(vec![-2.0, -2.0], vec![2.0, 2.0]).unwrap();

        let outcome = Cobyla::default().minimize(&mut f, &[0.0, 0.0], &bounds);

        assert_eq!(outcome.status, InnerStatus::Interrupted);
        assert_eq!(f.calls, 7);
    }

    #[test]
    fn evaluation_budget_is_not_convergence() {
        let mut f = Shifted {
            calls: 0,
            limit: usize::MAX,
        };
        let bounds = Bounds::new(vec![-5.0, -5.0], vec![5.0, 5.0]).unwrap();

        let outcome = Cobyla::new(3, 0.5, 1e-10)
            .unwrap()
            .minimize(&mut f, &[4.0, -4.0], &bounds);

        assert_eq!(outcome.status, InnerStatus::Exhausted);
        assert!(f.calls <= 3);
    }

    #[test]
    fn rejects_bad_settings() {
        assert_eq!(Cobyla::new(0, 0.5, 0.0), Err(CobylaError::MaxEvals));
        assert_eq!(Cobyla::new(10, 0.0, 0.0), Err(CobylaError::RhoBegin));
        assert_eq!(Cobyla::new(10, 0.5, -1.0), Err(CobylaError::FtolRel));
    }
}
