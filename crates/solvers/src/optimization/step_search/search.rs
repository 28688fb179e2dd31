use tether_core::{Model, OptimizationProblem};

use crate::objective::{EvalError, Objective};

use super::{
    Config, Direction, Error, Event, NextAction, Phase, Point, Rejection, Solution, Status,
    state::{Recorded, State},
};

/// What happened during one call to [`StepSearch::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// A candidate was evaluated.
    Evaluated {
        point: Point,

        /// Whether the candidate is the new best.
        improved: bool,
    },

    /// A candidate was skipped without evaluation.
    Rejected { x: f64, reason: Rejection },

    /// Cancellation was observed; nothing was evaluated.
    Cancelled,
}

/// The result of one call to [`StepSearch::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Iteration {
    /// Iteration number, starting at 1.
    pub iter: usize,

    /// What this iteration did.
    pub outcome: Outcome,

    /// Terminal status, once the search is done.
    pub status: Option<Status>,
}

impl Iteration {
    /// Returns `true` if the search reached a terminal status.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status.is_some()
    }
}

/// An adaptive one-dimensional hill climb, driven one iteration at a time.
///
/// Construct with [`StepSearch::new`] and call [`step`](Self::step) until
/// the returned [`Iteration`] is done, or use [`minimize`](super::minimize)
/// to run the loop with an observer.
pub struct StepSearch<'a, M, P>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
{
    objective: &'a mut Objective<M, P>,
    config: Config,
    bounds: [f64; 2],
    initial: f64,
    state: State,
}

impl<'a, M, P> StepSearch<'a, M, P>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
{
    /// Validates the setup and prepares a search starting at `initial`.
    ///
    /// # Errors
    ///
    /// Returns an error if the objective does not have exactly one variable,
    /// if the bounds are not finite and distinct, or if `initial` lies
    /// outside them.
    pub fn new(
        objective: &'a mut Objective<M, P>,
        bounds: [f64; 2],
        initial: f64,
        config: &Config,
    ) -> Result<Self, Error> {
        let variables = objective.variable_count();
        if variables != 1 {
            return Err(Error::WrongDimension(variables));
        }

        let [lower, upper] = bounds;
        let valid = lower.is_finite()
            && upper.is_finite()
            && lower < upper
            && (lower..=upper).contains(&initial);
        if !valid {
            return Err(Error::InvalidBounds {
                lower,
                upper,
                initial,
            });
        }

        Ok(Self {
            objective,
            config: *config,
            bounds,
            initial,
            state: State::new(config),
        })
    }

    /// Performs one iteration.
    ///
    /// The first call evaluates the initial position. Later calls apply the
    /// pending step change and evaluate one candidate, or reject it without
    /// evaluation if it was seen before or lies outside the bounds. Every
    /// call counts toward the iteration limit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Evaluation`] if the objective fails, after which the
    /// search is in [`Phase::Failed`]. Calling `step` on a search that is
    /// no longer running is also an error.
    pub fn step(&mut self) -> Result<Iteration, Error> {
        match self.state.phase {
            Phase::Running => {}
            Phase::Finished(status) => return Err(Error::Finished(status)),
            Phase::Failed => return Err(Error::Failed),
        }

        if self.objective.is_cancelled() {
            return Ok(self.finish(
                self.state.iters,
                Outcome::Cancelled,
                Some(Status::Cancelled),
            ));
        }

        self.state.iters += 1;
        let iter = self.state.iters;

        let (outcome, status) = match self.state.best() {
            None => self.evaluate(self.initial)?,
            Some(best) => {
                let x = self.state.next_candidate(best, &self.config);
                match self.rejection(x) {
                    Some(reason) => {
                        log::debug!("step search rejected x = {x} ({reason:?})");
                        self.state.reject(reason);
                        (Outcome::Rejected { x, reason }, self.plateau_status())
                    }
                    None => self.evaluate(x)?,
                }
            }
        };

        let status = status.or_else(|| (iter >= self.config.max_iters()).then_some(Status::MaxIters));
        Ok(self.finish(iter, outcome, status))
    }

    /// Returns the lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Returns the best point evaluated so far.
    pub fn best(&self) -> Option<Point> {
        self.state.best()
    }

    /// Returns every evaluated point, ascending by objective.
    pub fn points(&self) -> &[Point] {
        self.state.points()
    }

    /// Returns the current step size.
    pub fn step_size(&self) -> f64 {
        self.state.step_size
    }

    /// Returns the current search direction.
    pub fn direction(&self) -> Direction {
        self.state.direction
    }

    /// Returns how the step changes before the next candidate.
    pub fn next_action(&self) -> NextAction {
        self.state.next
    }

    /// Returns the number of iterations performed.
    pub fn iters(&self) -> usize {
        self.state.iters
    }

    /// Returns the wrapped objective.
    pub fn objective(&self) -> &Objective<M, P> {
        &*self.objective
    }

    /// Returns the solution once the search reached a terminal status.
    pub fn solution(&self) -> Option<Solution> {
        match self.state.phase {
            Phase::Finished(status) => Some(self.solution_with(status)),
            Phase::Running | Phase::Failed => None,
        }
    }

    /// Builds the observer event for an iteration, if there is one.
    pub(super) fn event(&self, iteration: &Iteration) -> Option<Event> {
        let best = self.state.best()?;
        let step_size = self.state.step_size;
        match iteration.outcome {
            Outcome::Evaluated { point, improved } => Some(Event::Evaluated {
                iter: iteration.iter,
                point,
                best,
                improved,
                step_size,
            }),
            Outcome::Rejected { x, reason } => Some(Event::Rejected {
                iter: iteration.iter,
                x,
                reason,
                best,
                step_size,
            }),
            Outcome::Cancelled => None,
        }
    }

    /// Marks the search as stopped by an observer.
    pub(super) fn stop_early(&mut self) -> Solution {
        self.state.phase = Phase::Finished(Status::StoppedByObserver);
        self.solution_with(Status::StoppedByObserver)
    }

    fn solution_with(&self, status: Status) -> Solution {
        let best = self.state.best();
        Solution {
            status,
            x: best.map_or(self.initial, |p| p.x),
            objective: best.map(|p| p.objective),
            iters: self.state.iters,
            step_size: self.state.step_size,
        }
    }

    fn rejection(&self, x: f64) -> Option<Rejection> {
        let [lower, upper] = self.bounds;
        if !(lower..=upper).contains(&x) {
            Some(Rejection::OutOfBounds)
        } else if self.state.is_known(x) {
            Some(Rejection::Duplicate)
        } else {
            None
        }
    }

    fn plateau_status(&self) -> Option<Status> {
        self.state
            .plateaued(&self.config)
            .then_some(Status::Converged)
    }

    fn evaluate(&mut self, x: f64) -> Result<(Outcome, Option<Status>), Error> {
        let objective = match self.objective.evaluate(&[x]) {
            Ok(objective) => objective,
            Err(EvalError::Cancelled) => return Ok((Outcome::Cancelled, Some(Status::Cancelled))),
            Err(e) => {
                log::warn!("step search evaluation at x = {x} failed: {e}");
                self.state.phase = Phase::Failed;
                return Err(e.into());
            }
        };

        let point = Point::new(x, objective);
        let (improved, status) = match self.state.record(point, &self.config) {
            Recorded::First | Recorded::Improved => (true, None),
            Recorded::Converged => (true, Some(Status::Converged)),
            Recorded::NotImproved => (false, self.plateau_status()),
        };
        Ok((Outcome::Evaluated { point, improved }, status))
    }

    fn finish(&mut self, iter: usize, outcome: Outcome, status: Option<Status>) -> Iteration {
        if let Some(status) = status {
            self.state.phase = Phase::Finished(status);
            log::info!("step search finished after {iter} iterations: {status:?}");
        }
        Iteration {
            iter,
            outcome,
            status,
        }
    }
}
