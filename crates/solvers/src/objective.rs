//! The objective function seen by optimizers.
//!
//! An [`Objective`] maps solver variables through an [`OptimizationProblem`]
//! to a [`Model`] call and back to objective and constraint values. Every
//! completed evaluation is recorded in its [`History`].
//!
//! The wrapper is also where cooperative cancellation happens. The
//! [`CancelToken`] in its [`Context`] is checked at the start of every
//! evaluation and before every gradient perturbation. Once cancellation is
//! observed the optimizer's [`StopHandle`] is force-stopped, no further
//! model calls are made, and [`EvalError::Cancelled`] is returned. A
//! cancellation that arrives while the model is running lets that
//! evaluation finish and return its value, but still force-stops the
//! optimizer so it does not ask for another point.
//!
//! [`CancelToken`]: tether_core::CancelToken
//! [`StopHandle`]: tether_core::StopHandle

mod context;
mod error;


pub use context::{Context, Phase, PhaseUpdate};
pub use error::EvalError;

use std::time::{Duration, Instant};

use tether_core::{Constraint, Model, OptimizationProblem, Snapshot, StopHandle};

use crate::{
    finite_diff::{self, GradientError},
    point::{EvalKind, History, SolutionPoint},
};

/// A cancellable, history-recording objective function.
pub struct Objective<M, P>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
{
    model: M,
    problem: P,
    finite_diff: finite_diff::Config,
    context: Context,
    history: History<M::Input, M::Output>,
}

/// Raw values of one model call: objective first, then constraints.
struct Sample<I, O> {
    values: Vec<f64>,
    snapshot: Snapshot<I, O>,
    time: Duration,
}

impl<M, P> Objective<M, P>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
{
    /// Creates an objective with forward differences and a fresh context.
    pub fn new(model: M, problem: P) -> Self {
        Self {
            model,
            problem,
            finite_diff: finite_diff::Config::default(),
            context: Context::default(),
            history: History::new(),
        }
    }

    /// Sets how gradients are estimated.
    #[must_use]
    pub fn with_finite_diff(mut self, config: finite_diff::Config) -> Self {
        self.finite_diff = config;
        self
    }

    /// Replaces the evaluation context.
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Returns the number of solver variables.
    pub fn variable_count(&self) -> usize {
        self.problem.variable_count()
    }

    /// Returns the problem's constraints.
    pub fn constraints(&self) -> &[Constraint] {
        self.problem.constraints()
    }

    /// Returns the wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns the wrapped problem.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Returns the evaluation context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns every point evaluated so far.
    pub fn history(&self) -> &History<M::Input, M::Output> {
        &self.history
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.context.cancel_token().is_cancelled()
    }

    /// Consumes the objective, returning the model, problem and history.
    pub fn into_parts(self) -> (M, P, History<M::Input, M::Output>) {
        (self.model, self.problem, self.history)
    }

    pub(crate) fn attach_stop(&mut self, handle: StopHandle) {
        self.context.attach_stop(handle);
    }

    pub(crate) fn detach_stop(&mut self) {
        self.context.detach_stop();
    }

    /// Evaluates the objective at `x`.
    ///
    /// # Errors
    ///
    /// See [`evaluate_point`](Self::evaluate_point).
    pub fn evaluate(&mut self, x: &[f64]) -> Result<f64, EvalError> {
        self.evaluate_point(x, false).map(SolutionPoint::objective)
    }

    /// Evaluates the objective at `x` and writes its gradient into `grad`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Dimension`] if `grad` does not have one entry
    /// per variable, otherwise see [`evaluate_point`](Self::evaluate_point).
    pub fn evaluate_with_gradient(&mut self, x: &[f64], grad: &mut [f64]) -> Result<f64, EvalError> {
        let expected = self.variable_count();
        if grad.len() != expected {
            return Err(EvalError::Dimension {
                expected,
                actual: grad.len(),
            });
        }

        let point = self.evaluate_point(x, true)?;
        if let Some(gradient) = point.gradient() {
            grad.copy_from_slice(gradient);
        }
        Ok(point.objective())
    }

    /// Evaluates `x`, optionally with gradients, and records the point.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` has the wrong length or is not finite, if
    /// cancellation was requested, or if any part of the evaluation fails
    /// or yields a non-finite value. Nothing is recorded on error.
    pub fn evaluate_point(
        &mut self,
        x: &[f64],
        with_gradient: bool,
    ) -> Result<&SolutionPoint<M::Input, M::Output>, EvalError> {
        let expected = self.variable_count();
        if x.len() != expected {
            return Err(EvalError::Dimension {
                expected,
                actual: x.len(),
            });
        }

        if x.iter().any(|v| !v.is_finite()) {
            log::warn!("optimizer requested non-finite point {x:?}, force-stopping");
            self.context.force_stop();
            return Err(EvalError::NonFiniteInput { x: x.to_vec() });
        }

        if self.context.check_cancelled() {
            return Err(EvalError::Cancelled);
        }

        let evaluation = self.history.len();
        let Sample {
            values,
            snapshot,
            time,
        } = self.sample(x, evaluation, EvalKind::Objective)?;

        let mut point = SolutionPoint::new(
            EvalKind::Objective,
            x.to_vec(),
            values[0],
            values[1..].to_vec(),
            snapshot,
            time,
        );
        if with_gradient {
            point = self.attach_gradient(point, &values, evaluation)?;
        }

        if self.context.check_cancelled() {
            log::info!("cancellation requested during evaluation {evaluation}");
        }

        self.context.report(PhaseUpdate {
            evaluation,
            kind: EvalKind::Objective,
            phase: Phase::Ended,
            partial: None,
        });
        log::debug!(
            "evaluation {evaluation}: f({x:?}) = {} in {:?}",
            point.objective(),
            point.total_time(),
        );

        Ok(self.history.push(point))
    }

    /// Maps `x` through the problem and model, returning raw values.
    fn sample(
        &mut self,
        x: &[f64],
        evaluation: usize,
        kind: EvalKind,
    ) -> Result<Sample<M::Input, M::Output>, EvalError> {
        let started = Instant::now();
        let report = |context: &mut Context, phase| {
            if kind == EvalKind::Objective {
                context.report(PhaseUpdate {
                    evaluation,
                    kind,
                    phase,
                    partial: None,
                });
            }
        };

        report(&mut self.context, Phase::Initializing);
        let input = self
            .problem
            .input(x)
            .map_err(|e| EvalError::Input(Box::new(e)))?;

        report(&mut self.context, Phase::CallingModel);
        let output = self
            .model
            .call(&input)
            .map_err(|e| EvalError::Model(Box::new(e)))?;

        report(&mut self.context, Phase::ComputingObjective);
        let objective = self
            .problem
            .objective(&input, &output)
            .map_err(|e| EvalError::Objective(Box::new(e)))?;
        if !objective.is_finite() {
            return Err(EvalError::NonFiniteObjective {
                x: x.to_vec(),
                value: objective,
            });
        }

        let count = self.problem.constraints().len();
        let mut values = Vec::with_capacity(1 + count);
        values.push(objective);
        for index in 0..count {
            let value = self
                .problem
                .constraint(index, &input, &output)
                .map_err(|e| EvalError::Constraint {
                    index,
                    source: Box::new(e),
                })?;
            if !value.is_finite() {
                return Err(EvalError::NonFiniteConstraint { index, value });
            }
            values.push(value);
        }

        Ok(Sample {
            values,
            snapshot: Snapshot::new(input, output),
            time: started.elapsed(),
        })
    }

    /// Estimates objective and constraint gradients from perturbed points.
    fn attach_gradient(
        &mut self,
        point: SolutionPoint<M::Input, M::Output>,
        base: &[f64],
        evaluation: usize,
    ) -> Result<SolutionPoint<M::Input, M::Output>, EvalError> {
        let started = Instant::now();
        let config = self.finite_diff;
        let total = point.x().len() * config.evals_per_partial();
        let x = point.x().to_vec();
        let mut points = Vec::with_capacity(total);

        let rows = finite_diff::jacobian(
            &config,
            |xp| {
                if self.context.check_cancelled() {
                    return Err(EvalError::Cancelled);
                }
                self.context.report(PhaseUpdate {
                    evaluation,
                    kind: EvalKind::Gradient,
                    phase: Phase::Gradients,
                    partial: Some((points.len(), total)),
                });

                let Sample {
                    values,
                    snapshot,
                    time,
                } = self.sample(xp, evaluation, EvalKind::Gradient)?;
                let mut perturbed = SolutionPoint::new(
                    EvalKind::Gradient,
                    xp.to_vec(),
                    values[0],
                    values[1..].to_vec(),
                    snapshot,
                    time,
                );
                perturbed.set_index(points.len());
                points.push(perturbed);
                Ok(values)
            },
            &x,
            base,
        )
        .map_err(|e| match e {
            GradientError::Evaluation { source, .. } => source,
            other => EvalError::Gradient(Box::new(other)),
        })?;

        let mut rows = rows.into_iter();
        let objective = rows.next().unwrap_or_default();
        let constraints = rows.collect();

        point
            .with_gradient(objective, constraints, points, started.elapsed())
            .map_err(|e| EvalError::Gradient(Box::new(e)))
    }
}
