//! Solvers that drive an expensive black-box evaluation pipeline.
//!
//! The building blocks are layered bottom-up:
//!
//! - [`finite_diff`] estimates gradients when the pipeline offers none
//! - [`point`] records every evaluation as an immutable [`SolutionPoint`]
//! - [`objective`] wraps a [`Model`] and an [`OptimizationProblem`] into
//!   a cancellable objective function with history
//! - [`optimization`] contains the solvers that consume that objective
//!
//! [`Model`]: tether_core::Model
//! [`OptimizationProblem`]: tether_core::OptimizationProblem

pub mod finite_diff;
pub mod objective;
pub mod optimization;
pub mod point;

pub use objective::{EvalError, Objective};
pub use point::{EvalKind, History, SolutionPoint};
