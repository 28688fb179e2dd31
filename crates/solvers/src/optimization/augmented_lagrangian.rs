//! Augmented Lagrangian optimization with bounds and general constraints.
//!
//! # Algorithm
//!
//! Each outer iteration hands a bound-constrained subproblem to an
//! [`InnerSolver`]: the objective plus a quadratic penalty on shifted
//! constraint values,
//!
//! ```text
//! L(x) = f(x) + ρ/2 · Σ (h(x) + λ/ρ)² + ρ/2 · Σ max(0, g(x) + μ/ρ)²
//! ```
//!
//! After the inner solve the multipliers are updated from the best point
//! of the iteration, and the penalty `ρ` grows when the largest constraint
//! violation did not shrink by the configured ratio. Unless an initial
//! penalty is configured, `ρ` is derived from the objective and violation
//! at the start point.
//!
//! Two inner solvers are provided: [`Cobyla`], derivative-free, and
//! [`ProjectedGradient`], which asks the [`Objective`] for
//! finite-difference gradients.
//!
//! # Termination
//!
//! - [`Status::Converged`] when the objective or the point stops changing
//!   between feasible outer iterations, or after one iteration of an
//!   unconstrained problem whose inner solve converged
//!
//! An inner solve that runs out of budget never ends the solve by itself:
//! the next outer iteration restarts the inner solver from its best point.
//! - [`Status::StopValueReached`], [`Status::MaxEvals`], [`Status::MaxTime`]
//!   and [`Status::MaxIters`] per [`StopCriteria`]
//! - [`Status::Cancelled`] once the objective's cancel token is set
//! - [`Status::StoppedByObserver`] when an observer returns
//!   [`Action::StopEarly`]
//!
//! Limits are checked after every evaluation, so a solve stops in the
//! middle of an inner solve as soon as one is reached. The reported point
//! is the best feasible one found, otherwise the best point of the last
//! outer iteration.
//!
//! # Observer Events
//!
//! [`Event::Evaluated`] after every objective evaluation and
//! [`Event::OuterIteration`] after every outer iteration.

mod action;
mod config;
mod error;
mod event;
mod inner;
mod penalty;
mod solution;
mod start;
mod subproblem;


pub use action::Action;
pub use config::{Config, ConfigError, Penalty, StopCriteria};
pub use error::Error;
pub use event::Event;
pub use inner::{
    Cobyla, CobylaError, InnerObjective, InnerOutcome, InnerSolver, InnerStatus,
    ProjectedGradient, ProjectedGradientError,
};
pub use solution::{Solution, Status};
pub use start::StartPosition;

use tether_core::{Model, Observer, OptimizationProblem, StopHandle};

use crate::objective::Objective;

use super::Bounds;

use self::{
    penalty::Multipliers,
    subproblem::{Candidate, Subproblem},
};

/// Smallest and largest penalty derived from the start point.
const AUTO_PENALTY: (f64, f64) = (1e-6, 10.0);

/// Minimizes `objective` within `bounds`, subject to its constraints.
///
/// The observer receives an [`Event`] after every evaluation and every
/// outer iteration, and may stop the solve early.
///
/// # Errors
///
/// Returns an error if `bounds` or `x0` do not match the objective, if
/// `x0` lies outside the bounds, or if an evaluation fails.
pub fn minimize<M, P, S, Obs>(
    objective: &mut Objective<M, P>,
    bounds: &Bounds,
    x0: &[f64],
    inner: &mut S,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    S: InnerSolver + ?Sized,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let expected = objective.variable_count();
    for actual in [bounds.len(), x0.len()] {
        if actual != expected {
            return Err(Error::WrongDimension { expected, actual });
        }
    }
    if let Some(index) = bounds.violation(x0) {
        return Err(Error::StartOutOfBounds {
            index,
            value: x0[index],
        });
    }

    let handle = StopHandle::new();
    objective.attach_stop(handle.clone());
    let result = solve(objective, bounds, x0, inner, config, &mut observer, handle);
    objective.detach_stop();
    result
}

/// Minimizes `objective` without observer support.
///
/// This is a convenience wrapper around [`minimize`] that uses a no-op observer.
///
/// # Errors
///
/// See [`minimize`].
pub fn minimize_unobserved<M, P, S>(
    objective: &mut Objective<M, P>,
    bounds: &Bounds,
    x0: &[f64],
    inner: &mut S,
    config: &Config,
) -> Result<Solution, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    S: InnerSolver + ?Sized,
{
    minimize(objective, bounds, x0, inner, config, ())
}

fn solve<M, P, S, Obs>(
    objective: &mut Objective<M, P>,
    bounds: &Bounds,
    x0: &[f64],
    inner: &mut S,
    config: &Config,
    observer: &mut Obs,
    handle: StopHandle,
) -> Result<Solution, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    S: InnerSolver + ?Sized,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let stop = *config.stop();
    let penalty = *config.penalty();
    let multipliers = Multipliers::new(objective.constraints(), penalty.initial.unwrap_or(1.0));
    let mut sub = Subproblem::new(objective, observer, multipliers, stop, handle);

    let mut last = None;
    if penalty.initial.is_none() && !sub.multipliers.is_empty() {
        sub.value(x0);
        if let Some(err) = sub.take_error() {
            return Err(err.into());
        }
        if let Some(start) = sub.take_round_best() {
            let rho = initial_penalty(&start, &sub.multipliers);
            log::debug!("initial penalty {rho:e} from f = {}", start.objective);
            sub.multipliers.set_rho(rho);
            last = Some(start);
        }
    }

    let mut x = x0.to_vec();
    let mut iters = 0;
    let mut prev_infeasibility = f64::INFINITY;

    let status = loop {
        if let Some(status) = sub.check_time() {
            break status;
        }
        if iters >= stop.max_iters {
            break Status::MaxIters;
        }

        let outcome = inner.minimize(&mut sub, &x, bounds);
        log::trace!("inner solve ended: {:?}", outcome.status);
        if let Some(err) = sub.take_error() {
            return Err(err.into());
        }

        let best = sub.take_round_best();
        if let Some(status) = sub.halted() {
            last = best.or(last);
            break status;
        }
        let Some(best) = best else {
            log::debug!("inner solver made no evaluations, stopping");
            break Status::Converged;
        };
        iters += 1;

        let infeasibility = sub.multipliers.infeasibility(&best.constraints);
        sub.multipliers.update(&best.constraints);
        if !best.feasible && infeasibility > penalty.infeasibility_ratio * prev_infeasibility {
            let rho = sub.multipliers.rho() * penalty.growth;
            sub.multipliers.set_rho(rho);
        }
        prev_infeasibility = infeasibility;

        let rho = sub.multipliers.rho();
        log::debug!(
            "outer iteration {iters}: f = {}, infeasibility = {infeasibility:e}, rho = {rho:e}",
            best.objective,
        );
        let action = sub.notify(&Event::OuterIteration {
            iter: iters,
            x: &best.x,
            objective: best.objective,
            infeasibility,
            penalty: rho,
        });
        if action == Some(Action::StopEarly) {
            sub.halt(Status::StoppedByObserver);
            last = Some(best);
            break Status::StoppedByObserver;
        }

        let settled = sub.multipliers.is_empty() && outcome.status == InnerStatus::Converged;
        let converged = best.feasible
            && last
                .as_ref()
                .is_some_and(|prev| has_converged(prev, &best, &stop));
        x.clone_from(&best.x);
        last = Some(best);
        if settled || converged {
            break Status::Converged;
        }
    };

    let evaluations = sub.evaluations();
    let elapsed = sub.started().elapsed();
    let reported = sub.best_feasible().cloned().or(last);
    log::info!("augmented Lagrangian finished after {evaluations} evaluations: {status:?}");

    Ok(match reported {
        Some(candidate) => Solution {
            status,
            x: candidate.x,
            objective: Some(candidate.objective),
            constraints: candidate.constraints,
            feasible: candidate.feasible,
            evaluations,
            iters,
            elapsed,
        },
        None => Solution {
            status,
            x: x0.to_vec(),
            objective: None,
            constraints: Vec::new(),
            feasible: false,
            evaluations,
            iters,
            elapsed,
        },
    })
}

/// Balances the objective against the squared violation at the start.
fn initial_penalty(start: &Candidate, multipliers: &Multipliers) -> f64 {
    let violation = multipliers.squared_violation(&start.constraints);
    if violation > 0.0 {
        (2.0 * start.objective.abs() / violation).clamp(AUTO_PENALTY.0, AUTO_PENALTY.1)
    } else {
        1.0
    }
}

fn has_converged(prev: &Candidate, next: &Candidate, stop: &StopCriteria) -> bool {
    if !prev.feasible {
        return false;
    }
    let df = (next.objective - prev.objective).abs();
    let dx = prev
        .x
        .iter()
        .zip(&next.x)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);

    let dx_rel = prev
        .x
        .iter()
        .zip(&next.x)
        .all(|(a, b)| (a - b).abs() <= stop.xtol_rel * b.abs());

    df <= stop.ftol_abs
        || df <= stop.ftol_rel * next.objective.abs()
        || dx <= stop.xtol_abs
        || dx_rel
}
