use super::{Config, Direction, Status};

/// A point with its evaluated objective value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// The x value.
    pub x: f64,

    /// The objective value at x.
    pub objective: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub fn new(x: f64, objective: f64) -> Self {
        Self { x, objective }
    }
}

/// Why a candidate was skipped without evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The exact x was already evaluated. The step shrinks.
    Duplicate,

    /// The candidate lies outside the bounds. The step shrinks and the
    /// direction flips.
    OutOfBounds,
}

/// How the step changes before the next candidate is proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Keep the step size and direction.
    ApplyStep,

    /// Multiply the step by the shrink factor.
    Shrink,

    /// Multiply the step by the inflate factor.
    Inflate,

    /// Shrink the step and reverse the direction.
    Flip,
}

/// Lifecycle of a step search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accepting further iterations.
    Running,

    /// Reached a terminal status.
    Finished(Status),

    /// An evaluation failed.
    Failed,
}

/// What recording an evaluated point meant for the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Recorded {
    /// The first point; it is the best by definition.
    First,

    /// A better point that improved by at least the change limit.
    Improved,

    /// A better point that improved by less than the change limit.
    Converged,

    /// Not better than the current best.
    NotImproved,
}

pub(super) struct State {
    pub(super) step_size: f64,
    pub(super) direction: Direction,
    pub(super) next: NextAction,
    pub(super) iters: usize,
    pub(super) phase: Phase,
    successes: usize,
    /// Evaluated points, ascending by objective, ties in evaluation order.
    points: Vec<Point>,
}

impl State {
    pub(super) fn new(config: &Config) -> Self {
        Self {
            step_size: config.step_size(),
            direction: config.direction(),
            next: NextAction::ApplyStep,
            iters: 0,
            phase: Phase::Running,
            successes: 0,
            points: Vec::new(),
        }
    }

    pub(super) fn best(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub(super) fn points(&self) -> &[Point] {
        &self.points
    }

    /// Applies the pending step change and proposes the next candidate.
    pub(super) fn next_candidate(&mut self, best: Point, config: &Config) -> f64 {
        match self.next {
            NextAction::ApplyStep => {}
            NextAction::Shrink => self.step_size *= config.shrink_factor(),
            NextAction::Inflate => {
                let inflated = self.step_size * config.inflate_factor();
                if inflated.is_finite() {
                    self.step_size = inflated;
                }
            }
            NextAction::Flip => {
                self.step_size *= config.shrink_factor();
                self.direction = self.direction.flipped();
            }
        }

        best.x + self.direction.sign() * self.step_size
    }

    /// Returns `true` if `x` was already evaluated.
    pub(super) fn is_known(&self, x: f64) -> bool {
        self.points.iter().any(|p| p.x == x)
    }

    pub(super) fn reject(&mut self, reason: Rejection) {
        self.next = match reason {
            Rejection::Duplicate => NextAction::Shrink,
            Rejection::OutOfBounds => NextAction::Flip,
        };
    }

    /// Inserts an evaluated point and decides the next action.
    pub(super) fn record(&mut self, point: Point, config: &Config) -> Recorded {
        let previous = self.best();
        let at = self
            .points
            .partition_point(|p| p.objective <= point.objective);
        self.points.insert(at, point);

        let Some(previous) = previous else {
            return Recorded::First;
        };

        if point.objective < previous.objective {
            if previous.objective - point.objective < config.change_limit() {
                return Recorded::Converged;
            }

            self.successes += 1;
            if self.successes > config.successes_before_inflate() {
                self.next = NextAction::Inflate;
                self.successes = 0;
            } else {
                self.next = NextAction::ApplyStep;
            }
            Recorded::Improved
        } else {
            self.successes = 0;
            self.next = match self.next {
                NextAction::ApplyStep | NextAction::Inflate => NextAction::Shrink,
                NextAction::Shrink => NextAction::Flip,
                NextAction::Flip => NextAction::ApplyStep,
            };
            Recorded::NotImproved
        }
    }

    /// Returns `true` if the next step would fall below the tolerance.
    pub(super) fn plateaued(&self, config: &Config) -> bool {
        let next = match self.next {
            NextAction::ApplyStep => self.step_size,
            NextAction::Shrink | NextAction::Flip => self.step_size * config.shrink_factor(),
            NextAction::Inflate => self.step_size * config.inflate_factor(),
        };
        !next.is_normal() || next <= config.step_tol()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(1.0, 0.5, 2.0, 1e-2, 1e-8, 100).unwrap()
    }

    #[test]
    fn third_consecutive_improvement_inflates() {
        let config = config();
        let mut state = State::new(&config);

        assert_eq!(state.record(Point::new(0.0, 10.0), &config), Recorded::First);
        assert_eq!(state.record(Point::new(1.0, 9.0), &config), Recorded::Improved);
        assert_eq!(state.next, NextAction::ApplyStep);
        assert_eq!(state.record(Point::new(2.0, 8.0), &config), Recorded::Improved);
        assert_eq!(state.next, NextAction::ApplyStep);
        assert_eq!(state.record(Point::new(3.0, 7.0), &config), Recorded::Improved);
        assert_eq!(state.next, NextAction::Inflate);
    }

    #[test]
    fn failures_cycle_through_shrink_and_flip() {
        let config = config();
        let mut state = State::new(&config);
        state.record(Point::new(0.0, 0.0), &config);

        let mut seen = Vec::new();
        for i in 1..=4 {
            state.record(Point::new(f64::from(i), 1.0), &config);
            seen.push(state.next);
        }

        assert_eq!(
            seen,
            vec![
                NextAction::Shrink,
                NextAction::Flip,
                NextAction::ApplyStep,
                NextAction::Shrink
            ]
        );
    }

    #[test]
    fn success_restarts_the_failure_cycle() {
        let config = config();
        let mut state = State::new(&config);
        state.record(Point::new(0.0, 10.0), &config);

        state.record(Point::new(1.0, 11.0), &config);
        assert_eq!(state.next, NextAction::Shrink);
        state.record(Point::new(2.0, 12.0), &config);
        assert_eq!(state.next, NextAction::Flip);

        assert_eq!(state.record(Point::new(3.0, 5.0), &config), Recorded::Improved);
        assert_eq!(state.next, NextAction::ApplyStep);

        // The next failure starts over at Shrink instead of continuing past Flip.
        state.record(Point::new(4.0, 6.0), &config);
        assert_eq!(state.next, NextAction::Shrink);
    }

    #[test]
    fn small_improvement_converges() {
        let config = config();
        let mut state = State::new(&config);
        state.record(Point::new(0.0, 1.0), &config);

        assert_eq!(
            state.record(Point::new(0.1, 0.995), &config),
            Recorded::Converged
        );
        assert_eq!(state.best(), Some(Point::new(0.1, 0.995)));
    }

    #[test]
    fn points_stay_sorted_with_stable_ties() {
        let config = config();
        let mut state = State::new(&config);
        state.record(Point::new(0.0, 5.0), &config);
        state.record(Point::new(1.0, 2.0), &config);
        state.record(Point::new(2.0, 5.0), &config);
        state.record(Point::new(3.0, 2.0), &config);

        let xs: Vec<_> = state.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 3.0, 0.0, 2.0]);
    }

    #[test]
    fn flip_shrinks_and_reverses() {
        let config = config();
        let mut state = State::new(&config);
        state.next = NextAction::Flip;

        let x = state.next_candidate(Point::new(4.0, 0.0), &config);

        assert_eq!(x, 3.5);
        assert_eq!(state.direction, Direction::Negative);
        assert_eq!(state.step_size, 0.5);
    }

    #[test]
    fn plateau_when_step_would_vanish() {
        let config = Config::new(1.0, 0.5, 2.0, 1e-2, 0.3, 100).unwrap();
        let mut state = State::new(&config);
        state.next = NextAction::Shrink;
        assert!(!state.plateaued(&config));

        state.step_size = 0.5;
        assert!(state.plateaued(&config));
    }
}
