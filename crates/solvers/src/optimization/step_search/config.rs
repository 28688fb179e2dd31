use thiserror::Error;

/// Direction in which the next step is taken from the current best point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }

    /// Returns `1.0` or `-1.0`.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

/// Configuration for the step search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    step_size: f64,
    shrink_factor: f64,
    inflate_factor: f64,
    change_limit: f64,
    step_tol: f64,
    max_iters: usize,
    successes_before_inflate: usize,
    direction: Direction,
}

/// Errors that can occur when validating a step search config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("step_size must be finite and positive")]
    StepSize,

    #[error("shrink_factor must lie strictly between 0 and 1")]
    ShrinkFactor,

    #[error("inflate_factor must be finite and greater than 1")]
    InflateFactor,

    #[error("change_limit must be finite and non-negative")]
    ChangeLimit,

    #[error("step_tol must be finite and non-negative")]
    StepTol,

    #[error("max_iters must be at least 1")]
    MaxIters,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1.0, 0.5, 2.0, 1e-2, 1e-8, 10_000).unwrap()
    }
}

impl Config {
    /// Creates a new config with validated factors and tolerances.
    ///
    /// The search starts in the positive direction and inflates the step
    /// after more than two consecutive improvements; see
    /// [`with_direction`](Self::with_direction) and
    /// [`with_successes_before_inflate`](Self::with_successes_before_inflate).
    ///
    /// # Errors
    ///
    /// Returns an error if a factor or tolerance is out of range or
    /// `max_iters` is zero.
    pub fn new(
        step_size: f64,
        shrink_factor: f64,
        inflate_factor: f64,
        change_limit: f64,
        step_tol: f64,
        max_iters: usize,
    ) -> Result<Self, ConfigError> {
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(ConfigError::StepSize);
        }
        if !(shrink_factor > 0.0 && shrink_factor < 1.0) {
            return Err(ConfigError::ShrinkFactor);
        }
        if !inflate_factor.is_finite() || inflate_factor <= 1.0 {
            return Err(ConfigError::InflateFactor);
        }
        if !change_limit.is_finite() || change_limit < 0.0 {
            return Err(ConfigError::ChangeLimit);
        }
        if !step_tol.is_finite() || step_tol < 0.0 {
            return Err(ConfigError::StepTol);
        }
        if max_iters == 0 {
            return Err(ConfigError::MaxIters);
        }

        Ok(Self {
            step_size,
            shrink_factor,
            inflate_factor,
            change_limit,
            step_tol,
            max_iters,
            successes_before_inflate: 2,
            direction: Direction::Positive,
        })
    }

    /// Sets the initial search direction.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets how many consecutive improvements are tolerated before the step
    /// is inflated; the step grows on the next improvement after that.
    #[must_use]
    pub fn with_successes_before_inflate(mut self, successes: usize) -> Self {
        self.successes_before_inflate = successes;
        self
    }

    /// Returns the initial step size.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Returns the factor applied when the step shrinks.
    #[must_use]
    pub fn shrink_factor(&self) -> f64 {
        self.shrink_factor
    }

    /// Returns the factor applied when the step inflates.
    #[must_use]
    pub fn inflate_factor(&self) -> f64 {
        self.inflate_factor
    }

    /// Returns the improvement below which the search has converged.
    #[must_use]
    pub fn change_limit(&self) -> f64 {
        self.change_limit
    }

    /// Returns the step size below which the search has converged.
    #[must_use]
    pub fn step_tol(&self) -> f64 {
        self.step_tol
    }

    /// Returns the maximum number of iterations, rejected candidates included.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Returns the number of improvements tolerated before inflating.
    #[must_use]
    pub fn successes_before_inflate(&self) -> usize {
        self.successes_before_inflate
    }

    /// Returns the initial search direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.shrink_factor(), 0.5);
        assert_eq!(config.inflate_factor(), 2.0);
        assert_eq!(config.change_limit(), 1e-2);
        assert_eq!(config.max_iters(), 10_000);
        assert_eq!(config.successes_before_inflate(), 2);
        assert_eq!(config.direction(), Direction::Positive);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            Config::new(0.0, 0.5, 2.0, 1e-2, 0.0, 10),
            Err(ConfigError::StepSize)
        );
        assert_eq!(
            Config::new(1.0, 1.0, 2.0, 1e-2, 0.0, 10),
            Err(ConfigError::ShrinkFactor)
        );
        assert_eq!(
            Config::new(1.0, f64::NAN, 2.0, 1e-2, 0.0, 10),
            Err(ConfigError::ShrinkFactor)
        );
        assert_eq!(
            Config::new(1.0, 0.5, 1.0, 1e-2, 0.0, 10),
            Err(ConfigError::InflateFactor)
        );
        assert_eq!(
            Config::new(1.0, 0.5, 2.0, -1.0, 0.0, 10),
            Err(ConfigError::ChangeLimit)
        );
        assert_eq!(
            Config::new(1.0, 0.5, 2.0, 1e-2, f64::INFINITY, 10),
            Err(ConfigError::StepTol)
        );
        assert_eq!(
            Config::new(1.0, 0.5, 2.0, 1e-2, 0.0, 0),
            Err(ConfigError::MaxIters)
        );
    }

    #[test]
    fn direction_flips() {
        assert_eq!(Direction::Positive.flipped(), Direction::Negative);
        assert_eq!(Direction::Negative.flipped().sign(), 1.0);
    }
}
