//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver-specific event and action types, enabling
//! observers to work generically across different solvers.
//!
//! # Event traits
//!
//! - [`HasObjective`] — events that carry an objective value
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use tether_core::Observer;
//! use tether_observers::traits::{CanStopEarly, HasObjective};
//!
//! struct GoodEnough {
//!     target: f64,
//! }
//!
//! impl<E: HasObjective, A: CanStopEarly> Observer<E, A> for GoodEnough {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.objective() <= self.target).then(A::stop_early)
//!     }
//! }
//! ```

use tether_solvers::optimization::{augmented_lagrangian, step_search};

/// An event that carries an objective value.
pub trait HasObjective {
    /// Returns the objective for this event.
    ///
    /// Returns `f64::NAN` when the event has no objective, such as a
    /// candidate that was skipped without evaluation.
    fn objective(&self) -> f64;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

// --- HasObjective impls ---

impl HasObjective for step_search::Event {
    fn objective(&self) -> f64 {
        match self {
            step_search::Event::Evaluated { point, .. } => point.objective,
            step_search::Event::Rejected { .. } => f64::NAN,
        }
    }
}

impl HasObjective for augmented_lagrangian::Event<'_> {
    fn objective(&self) -> f64 {
        augmented_lagrangian::Event::objective(self)
    }
}

// --- CanStopEarly impls ---

impl CanStopEarly for step_search::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for augmented_lagrangian::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use step_search::{Point, Rejection};

    #[test]
    fn rejected_candidates_have_no_objective() {
        let best = Point {
            x: 1.0,
            objective: 2.0,
        };
        let evaluated = step_search::Event::Evaluated {
            iter: 1,
            point: best,
            best,
            improved: true,
            step_size: 1.0,
        };
        let rejected = step_search::Event::Rejected {
            iter: 2,
            x: 1.0,
            reason: Rejection::Duplicate,
            best,
            step_size: 0.5,
        };

        assert_eq!(HasObjective::objective(&evaluated), 2.0);
        assert!(HasObjective::objective(&rejected).is_nan());
    }

    #[test]
    fn outer_iterations_report_their_objective() {
        let event = augmented_lagrangian::Event::OuterIteration {
            iter: 3,
            x: &[0.5, 0.5],
            objective: 0.25,
            infeasibility: 0.0,
            penalty: 10.0,
        };

        assert_eq!(HasObjective::objective(&event), 0.25);
    }
}
