//! Optimizers that consume an [`Objective`].
//!
//! Each optimizer borrows the objective mutably for the duration of the
//! solve, so the full evaluation [`History`] remains available afterwards.
//!
//! # Solvers
//!
//! - [`step_search`]: derivative-free adaptive hill climb in one variable
//! - [`augmented_lagrangian`]: bound- and constraint-aware outer loop with
//!   interchangeable inner solvers
//!
//! [`Objective`]: crate::Objective
//! [`History`]: crate::History

mod bounds;

pub use bounds::{Bounds, BoundsError};

pub mod augmented_lagrangian;
pub mod step_search;
