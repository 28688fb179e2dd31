//! Adaptive step search for single-variable optimization.
//!
//! # Algorithm
//!
//! The search evaluates the initial position, then repeatedly steps away
//! from the current best point. A step that improves the objective is
//! kept; after more than two consecutive improvements the step inflates.
//! A step that does not improve triggers, in turn, a shrink, a shrink
//! with a reversed direction, and a plain retry at the new size.
//!
//! Candidates that were already evaluated, or that fall outside the
//! bounds, are skipped without calling the objective and shrink the step,
//! so the search cannot loop on the same point.
//!
//! # Termination
//!
//! - [`Status::Converged`] when an improvement is smaller than
//!   [`Config::change_limit`], or when the step would shrink below
//!   [`Config::step_tol`] without improving
//! - [`Status::MaxIters`] after [`Config::max_iters`] iterations
//! - [`Status::Cancelled`] once the objective's cancel token is set
//! - [`Status::StoppedByObserver`] when an observer returns
//!   [`Action::StopEarly`]
//!
//! An evaluation failure is returned as [`Error::Evaluation`].
//!
//! # When to Use
//!
//! The search suits a single design parameter whose objective is driven
//! toward zero by an expensive external analysis, where no bracket is
//! known in advance and every evaluation counts.
//!
//! # Observer Events
//!
//! [`minimize`] emits one [`Event`] per iteration that evaluated or
//! rejected a candidate.

mod action;
mod config;
mod error;
mod event;
mod search;
mod solution;
mod state;


pub use action::Action;
pub use config::{Config, ConfigError, Direction};
pub use error::Error;
pub use event::Event;
pub use search::{Iteration, Outcome, StepSearch};
pub use solution::{Solution, Status};
pub use state::{NextAction, Phase, Point, Rejection};

use tether_core::{Model, Observer, OptimizationProblem};

use crate::objective::Objective;

/// Minimizes a single-variable objective within `bounds` from `initial`.
///
/// The observer receives an [`Event`] after every iteration and may stop
/// the search early.
///
/// # Errors
///
/// Returns an error if the setup is invalid or an evaluation fails.
pub fn minimize<M, P, Obs>(
    objective: &mut Objective<M, P>,
    bounds: [f64; 2],
    initial: f64,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: Observer<Event, Action>,
{
    let mut search = StepSearch::new(objective, bounds, initial, config)?;

    loop {
        let iteration = search.step()?;
        let action = search
            .event(&iteration)
            .and_then(|event| observer.observe(&event));

        if let Some(solution) = search.solution() {
            return Ok(solution);
        }
        if action == Some(Action::StopEarly) {
            log::info!("step search stopped by observer after {} iterations", iteration.iter);
            return Ok(search.stop_early());
        }
    }
}

/// Minimizes a single-variable objective without observer support.
///
/// This is a convenience wrapper around [`minimize`] that uses a no-op observer.
///
/// # Errors
///
/// Returns an error if the setup is invalid or an evaluation fails.
pub fn minimize_unobserved<M, P>(
    objective: &mut Objective<M, P>,
    bounds: [f64; 2],
    initial: f64,
    config: &Config,
) -> Result<Solution, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
{
    minimize(objective, bounds, initial, config, ())
}
