//! Solves driven through a worker-thread session.

use std::{
    convert::Infallible,
    sync::mpsc::{self, Receiver, Sender},
};

use approx::assert_relative_eq;

use tether_core::{Constraint, ConstraintKind, Model, OptimizationProblem, Quantity};
use tether_observers::{Progress, Session};
use tether_solvers::{
    Objective,
    objective::Phase,
    optimization::{
        Bounds,
        augmented_lagrangian::{self, Cobyla, ProjectedGradient, StartPosition},
        step_search,
    },
};

/// Squared distance from `center`.
///
/// When gated, every call announces itself on `called` and then waits for
/// the test to release it, so the test controls exactly when each call
/// returns.
struct Analysis {
    center: Vec<f64>,
    calls: usize,
    gate: Option<(Sender<usize>, Receiver<()>)>,
}

impl Analysis {
    fn new(center: &[f64]) -> Self {
        Self {
            center: center.to_vec(),
            calls: 0,
            gate: None,
        }
    }

    fn gated(center: &[f64], called: Sender<usize>, release: Receiver<()>) -> Self {
        Self {
            gate: Some((called, release)),
            ..Self::new(center)
        }
    }
}

impl Model for Analysis {
    type Input = Vec<f64>;
    type Output = f64;
    type Error = Infallible;

    fn call(&mut self, x: &Vec<f64>) -> Result<f64, Infallible> {
        self.calls += 1;
        if let Some((called, release)) = &self.gate {
            // The test may stop listening once it has seen enough calls.
            if called.send(self.calls).is_ok() {
                let _ = release.recv();
            }
        }
        Ok(x.iter()
            .zip(&self.center)
            .map(|(v, c)| (v - c).powi(2))
            .sum())
    }
}

/// Minimizes the analysis output, optionally subject to `x + y = 2`.
struct Design {
    dims: usize,
    constraints: Vec<Constraint>,
}

impl Design {
    fn free(dims: usize) -> Self {
        Self {
            dims,
            constraints: Vec::new(),
        }
    }

    fn on_line() -> Self {
        Self {
            dims: 2,
            constraints: vec![Constraint::new(
                Quantity::new("x + y"),
                ConstraintKind::Equality,
                1e-4,
            )],
        }
    }
}

impl OptimizationProblem for Design {
    type Input = Vec<f64>;
    type Output = f64;
    type InputError = Infallible;
    type ObjectiveError = Infallible;

    fn variable_count(&self) -> usize {
        self.dims
    }

    fn input(&self, x: &[f64]) -> Result<Vec<f64>, Infallible> {
        Ok(x.to_vec())
    }

    fn objective(&self, _input: &Vec<f64>, output: &f64) -> Result<f64, Infallible> {
        Ok(*output)
    }

    fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    fn constraint(&self, _index: usize, input: &Vec<f64>, _output: &f64) -> Result<f64, Infallible> {
        Ok(input[0] + input[1] - 2.0)
    }
}

#[test]
fn constrained_solve_reports_progress() {
    let session = Session::spawn(|ctx| {
        let mut objective =
            Objective::new(Analysis::new(&[0.0, 0.0]), Design::on_line()).with_context(ctx.context());
        let bounds = Bounds::new(vec![-5.0, -5.0], vec![5.0, 5.0]).unwrap();
        let x0 = StartPosition::Given(vec![0.5, 0.0]).resolve(&bounds).unwrap();

        let solution = augmented_lagrangian::minimize(
            &mut objective,
            &bounds,
            &x0,
            &mut Cobyla::default(),
            &augmented_lagrangian::Config::default(),
            ctx.observer(),
        );
        (solution, objective.history().len())
    })
    .unwrap();

    // Every sender lives on the worker, so this ends when the solve does.
    let progress: Vec<Progress> = session.progress().iter().collect();
    let (solution, evaluated) = session.join().unwrap();
    let solution = solution.unwrap();

    assert_eq!(solution.status, augmented_lagrangian::Status::Converged);
    assert_relative_eq!(solution.x[0], 1.0, epsilon = 1e-2);
    assert_relative_eq!(solution.x[1], 1.0, epsilon = 1e-2);
    assert_eq!(solution.evaluations, evaluated);

    let ended = progress
        .iter()
        .filter(|p| matches!(p, Progress::Phase(u) if u.phase == Phase::Ended))
        .count();
    let objectives = progress
        .iter()
        .filter(|p| matches!(p, Progress::Objective { .. }))
        .count();
    assert_eq!(ended, solution.evaluations);
    assert_eq!(objectives, solution.evaluations + solution.iters);
}

#[test]
fn cancelling_a_step_search_between_calls() {
    let (called_tx, called_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();

    let session = Session::spawn(move |ctx| {
        let model = Analysis::gated(&[30.0], called_tx, release_rx);
        let mut objective = Objective::new(model, Design::free(1)).with_context(ctx.context());
        let solution = step_search::minimize(
            &mut objective,
            [-100.0, 100.0],
            0.0,
            &step_search::Config::default(),
            ctx.observer(),
        );
        (solution, objective.model().calls)
    })
    .unwrap();

    assert_eq!(called_rx.recv().unwrap(), 1);
    release_tx.send(()).unwrap();
    assert_eq!(called_rx.recv().unwrap(), 2);

    // Cancel while call 2 is in flight, then let it finish.
    session.cancel();
    release_tx.send(()).unwrap();

    let (solution, calls) = session.join().unwrap();
    let solution = solution.unwrap();
    assert_eq!(solution.status, step_search::Status::Cancelled);
    assert_eq!(calls, 2);
    assert_relative_eq!(solution.x, 1.0);
    assert!(called_rx.try_recv().is_err());
}

#[test]
fn cancelling_during_a_gradient() {
    let (called_tx, called_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();

    let session = Session::spawn(move |ctx| {
        let model = Analysis::gated(&[1.0, -2.0, 0.5], called_tx, release_rx);
        let mut objective = Objective::new(model, Design::free(3)).with_context(ctx.context());
        let bounds = Bounds::new(vec![-5.0; 3], vec![5.0; 3]).unwrap();
        let solution = augmented_lagrangian::minimize_unobserved(
            &mut objective,
            &bounds,
            &[0.0, 0.0, 0.0],
            &mut ProjectedGradient::default(),
            &augmented_lagrangian::Config::default(),
        );
        (solution, objective.model().calls)
    })
    .unwrap();

    // Call 1 is the base point; calls 2 to 4 perturb one variable each.
    assert_eq!(called_rx.recv().unwrap(), 1);
    release_tx.send(()).unwrap();
    assert_eq!(called_rx.recv().unwrap(), 2);
    session.cancel();
    release_tx.send(()).unwrap();

    let (solution, calls) = session.join().unwrap();
    let solution = solution.unwrap();
    assert_eq!(solution.status, augmented_lagrangian::Status::Cancelled);
    assert_eq!(calls, 2);
    assert_eq!(solution.evaluations, 0);
    assert!(solution.objective.is_none());
}
