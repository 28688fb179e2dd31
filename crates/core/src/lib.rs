//! Core traits and types for the Tether framework.
//!
//! This crate defines the shared abstractions that optimizers, observers,
//! and host integrations build on:
//!
//! - [`Model`] — a side-effecting call into an external application
//! - [`Pipeline`] — the geometry-update, analysis, and read-back hooks of a
//!   CAD/FEA integration, adapted into a [`Model`] by [`PipelineModel`]
//! - [`Snapshot`] — a captured input/output pair from a model call
//! - [`OptimizationProblem`] — maps solver variables to model inputs and
//!   extracts the objective and constraint values from outputs
//! - [`Observer`] — receives solver events and optionally returns control actions
//! - [`CancelToken`], [`StopHandle`] — cooperative cancellation and force-stop

mod cancel;
mod model;
mod observer;
mod pipeline;
mod problem;
mod quantity;

pub use cancel::{CancelToken, StopHandle};
pub use model::{Model, Snapshot};
pub use observer::Observer;
pub use pipeline::{Pipeline, PipelineModel};
pub use problem::OptimizationProblem;
pub use quantity::{Constraint, ConstraintKind, Quantity};
