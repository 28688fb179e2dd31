use std::time::Duration;

use thiserror::Error;

/// When the outer loop stops.
///
/// Reaching any of these is a terminal status, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopCriteria {
    /// Maximum number of outer iterations.
    pub max_iters: usize,

    /// Maximum number of objective evaluations, gradient perturbations excluded.
    pub max_evals: Option<usize>,

    /// Maximum wall-clock time.
    pub max_time: Option<Duration>,

    /// Stop once a feasible point reaches this objective.
    pub stop_value: Option<f64>,

    /// Converged when the objective changes by at most this much between
    /// feasible outer iterations.
    pub ftol_abs: f64,

    /// Like `ftol_abs`, relative to the objective's magnitude.
    pub ftol_rel: f64,

    /// Converged when no variable moves more than this between feasible
    /// outer iterations.
    pub xtol_abs: f64,

    /// Converged when every variable moves at most this fraction of its
    /// magnitude between feasible outer iterations.
    pub xtol_rel: f64,
}

impl Default for StopCriteria {
    fn default() -> Self {
        Self {
            max_iters: 100,
            max_evals: Some(10_000),
            max_time: Some(Duration::from_secs(3600)),
            stop_value: None,
            ftol_abs: 1e-6,
            ftol_rel: 1e-3,
            xtol_abs: 0.0,
            xtol_rel: 0.0,
        }
    }
}

/// How the penalty parameter evolves.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Penalty {
    /// Initial penalty, or `None` to derive it from the starting point.
    pub initial: Option<f64>,

    /// Factor applied when infeasibility did not shrink enough.
    pub growth: f64,

    /// Required infeasibility reduction per outer iteration.
    pub infeasibility_ratio: f64,
}

impl Default for Penalty {
    fn default() -> Self {
        Self {
            initial: None,
            growth: 10.0,
            infeasibility_ratio: 0.5,
        }
    }
}

/// Configuration for the augmented Lagrangian solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    stop: StopCriteria,
    penalty: Penalty,
}

/// Errors that can occur when validating an augmented Lagrangian config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_iters must be at least 1")]
    MaxIters,

    #[error("max_evals must be at least 1 when set")]
    MaxEvals,

    #[error("stop_value must not be NaN")]
    StopValue,

    #[error("tolerances must be finite and non-negative")]
    Tolerance,

    #[error("initial penalty must be finite and positive")]
    InitialPenalty,

    #[error("penalty growth must be finite and greater than 1")]
    Growth,

    #[error("infeasibility ratio must lie in (0, 1]")]
    InfeasibilityRatio,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(StopCriteria::default(), Penalty::default()).unwrap()
    }
}

impl Config {
    /// Creates a new config with validated criteria and penalty settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a limit is zero, a tolerance is negative or
    /// non-finite, or a penalty setting is out of range.
    pub fn new(stop: StopCriteria, penalty: Penalty) -> Result<Self, ConfigError> {
        if stop.max_iters == 0 {
            return Err(ConfigError::MaxIters);
        }
        if stop.max_evals == Some(0) {
            return Err(ConfigError::MaxEvals);
        }
        if stop.stop_value.is_some_and(f64::is_nan) {
            return Err(ConfigError::StopValue);
        }
        let tolerances = [stop.ftol_abs, stop.ftol_rel, stop.xtol_abs, stop.xtol_rel];
        if tolerances.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(ConfigError::Tolerance);
        }
        if penalty
            .initial
            .is_some_and(|rho| !rho.is_finite() || rho <= 0.0)
        {
            return Err(ConfigError::InitialPenalty);
        }
        if !penalty.growth.is_finite() || penalty.growth <= 1.0 {
            return Err(ConfigError::Growth);
        }
        if !(penalty.infeasibility_ratio > 0.0 && penalty.infeasibility_ratio <= 1.0) {
            return Err(ConfigError::InfeasibilityRatio);
        }

        Ok(Self { stop, penalty })
    }

    /// Returns the stop criteria.
    #[must_use]
    pub fn stop(&self) -> &StopCriteria {
        &self.stop
    }

    /// Returns the penalty settings.
    #[must_use]
    pub fn penalty(&self) -> &Penalty {
        &self.penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.stop().max_evals, Some(10_000));
        assert_eq!(config.stop().max_time, Some(Duration::from_secs(3600)));
        assert_eq!(config.penalty().growth, 10.0);
    }

    #[test]
    fn rejects_bad_values() {
        let stop = StopCriteria::default();
        let penalty = Penalty::default();

        let zero_evals = StopCriteria {
            max_evals: Some(0),
            ..stop
        };
        assert_eq!(
            Config::new(zero_evals, penalty),
            Err(ConfigError::MaxEvals)
        );

        let negative_tol = StopCriteria {
            ftol_rel: -1.0,
            ..stop
        };
        assert_eq!(
            Config::new(negative_tol, penalty),
            Err(ConfigError::Tolerance)
        );

        let nan_stop = StopCriteria {
            stop_value: Some(f64::NAN),
            ..stop
        };
        assert_eq!(Config::new(nan_stop, penalty), Err(ConfigError::StopValue));

        let infinite_xtol = StopCriteria {
            xtol_rel: f64::INFINITY,
            ..stop
        };
        assert_eq!(
            Config::new(infinite_xtol, penalty),
            Err(ConfigError::Tolerance)
        );

        let flat = Penalty {
            growth: 1.0,
            ..penalty
        };
        assert_eq!(Config::new(stop, flat), Err(ConfigError::Growth));

        let zero_rho = Penalty {
            initial: Some(0.0),
            ..penalty
        };
        assert_eq!(Config::new(stop, zero_rho), Err(ConfigError::InitialPenalty));

        let ratio = Penalty {
            infeasibility_ratio: 1.5,
            ..penalty
        };
        assert_eq!(
            Config::new(stop, ratio),
            Err(ConfigError::InfeasibilityRatio)
        );
    }
}
