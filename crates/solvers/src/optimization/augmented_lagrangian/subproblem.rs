use std::time::Instant;

use tether_core::{Model, Observer, OptimizationProblem, StopHandle};

use crate::objective::{EvalError, Objective};

use super::{
    Action, Event, Status, config::StopCriteria, inner::InnerObjective, penalty::Multipliers,
};

/// An evaluated point as the outer loop sees it.
#[derive(Debug, Clone)]
pub(super) struct Candidate {
    pub(super) x: Vec<f64>,
    pub(super) objective: f64,
    pub(super) constraints: Vec<f64>,
    pub(super) lagrangian: f64,
    pub(super) feasible: bool,
}

/// The penalized objective of one outer iteration.
///
/// Every evaluation goes through the wrapped [`Objective`], is reported to
/// the observer and checked against the stop criteria. Once a criterion
/// fires, the subproblem halts: it force-stops the inner solver and
/// answers every later request with `None`.
pub(super) struct Subproblem<'a, M, P, Obs>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
{
    objective: &'a mut Objective<M, P>,
    observer: &'a mut Obs,
    pub(super) multipliers: Multipliers,
    stop: StopCriteria,
    handle: StopHandle,
    started: Instant,
    evaluations: usize,
    round_best: Option<Candidate>,
    best_feasible: Option<Candidate>,
    halted: Option<Status>,
    error: Option<EvalError>,
}

impl<'a, M, P, Obs> Subproblem<'a, M, P, Obs>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    pub(super) fn new(
        objective: &'a mut Objective<M, P>,
        observer: &'a mut Obs,
        multipliers: Multipliers,
        stop: StopCriteria,
        handle: StopHandle,
    ) -> Self {
        Self {
            objective,
            observer,
            multipliers,
            stop,
            handle,
            started: Instant::now(),
            evaluations: 0,
            round_best: None,
            best_feasible: None,
            halted: None,
            error: None,
        }
    }

    pub(super) fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub(super) fn started(&self) -> Instant {
        self.started
    }

    pub(super) fn halted(&self) -> Option<Status> {
        self.halted
    }

    /// Takes the evaluation error that halted the solve, if any.
    pub(super) fn take_error(&mut self) -> Option<EvalError> {
        self.error.take()
    }

    pub(super) fn best_feasible(&self) -> Option<&Candidate> {
        self.best_feasible.as_ref()
    }

    /// Takes the best point of the current outer iteration.
    pub(super) fn take_round_best(&mut self) -> Option<Candidate> {
        self.round_best.take()
    }

    /// Halts with `status` if the wall-clock limit has passed.
    pub(super) fn check_time(&mut self) -> Option<Status> {
        if self.halted.is_none()
            && self
                .stop
                .max_time
                .is_some_and(|limit| self.started.elapsed() >= limit)
        {
            self.halt(Status::MaxTime);
        }
        self.halted
    }

    /// Passes an outer-loop event to the observer.
    pub(super) fn notify(&mut self, event: &Event<'_>) -> Option<Action> {
        self.observer.observe(event)
    }

    pub(super) fn halt(&mut self, status: Status) {
        if self.halted.is_none() {
            log::info!(
                "augmented Lagrangian halting after {} evaluations: {status:?}",
                self.evaluations
            );
            self.halted = Some(status);
        }
        self.handle.force_stop();
    }

    fn evaluate(&mut self, x: &[f64], grad: Option<&mut [f64]>) -> Option<f64> {
        if self.halted.is_some() || self.error.is_some() {
            return None;
        }
        if self.handle.is_stopped() {
            self.halt(Status::Cancelled);
            return None;
        }

        let result = self
            .objective
            .evaluate_point(x, grad.is_some())
            .map(|point| {
                (
                    point.objective(),
                    point.constraints().to_vec(),
                    point.gradient().map(<[f64]>::to_vec),
                    point.constraint_gradients().map(<[Vec<f64>]>::to_vec),
                )
            });
        let (objective, constraints, gradient, constraint_gradients) = match result {
            Ok(values) => values,
            Err(EvalError::Cancelled) => {
                self.halt(Status::Cancelled);
                return None;
            }
            Err(err) => {
                log::warn!("augmented Lagrangian evaluation failed: {err}");
                self.handle.force_stop();
                self.error = Some(err);
                return None;
            }
        };

        let lagrangian = self.multipliers.lagrangian(objective, &constraints);
        if let (Some(out), Some(gradient), Some(constraint_gradients)) =
            (grad, gradient, constraint_gradients)
        {
            self.multipliers
                .gradient(&gradient, &constraints, &constraint_gradients, out);
        }
        self.evaluations += 1;

        let feasible = self.multipliers.is_feasible(&constraints);
        let action = self.observer.observe(&Event::Evaluated {
            evaluation: self.evaluations,
            x,
            objective,
            constraints: &constraints,
            lagrangian,
        });
        self.record(Candidate {
            x: x.to_vec(),
            objective,
            constraints,
            lagrangian,
            feasible,
        });

        if action == Some(Action::StopEarly) {
            self.halt(Status::StoppedByObserver);
        } else if feasible && self.stop.stop_value.is_some_and(|v| objective <= v) {
            self.halt(Status::StopValueReached);
        } else if self.stop.max_evals.is_some_and(|n| self.evaluations >= n) {
            self.halt(Status::MaxEvals);
        } else if self.check_time().is_none() && self.handle.is_stopped() {
            // Cancellation arrived while the model was running.
            self.halt(Status::Cancelled);
        }

        Some(lagrangian)
    }

    fn record(&mut self, candidate: Candidate) {
        if candidate.feasible
            && self
                .best_feasible
                .as_ref()
                .is_none_or(|best| candidate.objective < best.objective)
        {
            self.best_feasible = Some(candidate.clone());
        }
        if self
            .round_best
            .as_ref()
            .is_none_or(|best| candidate.lagrangian < best.lagrangian)
        {
            self.round_best = Some(candidate);
        }
    }
}

impl<M, P, Obs> InnerObjective for Subproblem<'_, M, P, Obs>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    fn value(&mut self, x: &[f64]) -> Option<f64> {
        self.evaluate(x, None)
    }

    fn value_and_gradient(&mut self, x: &[f64], grad: &mut [f64]) -> Option<f64> {
        self.evaluate(x, Some(grad))
    }
}
