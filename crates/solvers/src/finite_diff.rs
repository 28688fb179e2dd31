//! Finite-difference gradient estimation.
//!
//! The black-box pipeline provides function values only, so gradients are
//! estimated by perturbing one variable at a time. Each perturbed value
//! must be finite; a failed or non-finite evaluation fails the whole
//! gradient rather than contributing a zero partial.

use thiserror::Error;

/// Which sample points each partial derivative uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Points {
    /// `(f(x + h) - f(x)) / h`, one extra evaluation per variable.
    Forward,

    /// `(f(x) - f(x - h)) / h`, one extra evaluation per variable.
    Backward,

    /// `(f(x + h) - f(x - h)) / 2h`, two extra evaluations per variable.
    Central,
}

/// How the perturbation size is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Step {
    /// The same `h` for every variable.
    Absolute(f64),

    /// `h = rel * |x|`, falling back to `rel` when `x` is zero.
    Relative(f64),
}

/// Configuration for finite-difference gradients.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    points: Points,
    step: Step,
}

/// Errors that can occur when validating a finite-difference config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("step must be finite and positive")]
    Step,

    #[error("unsupported stencil: {points} points with centre at {center}")]
    Stencil { points: usize, center: usize },
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(Points::Forward, Step::Relative(1e-6)).unwrap()
    }
}

impl Config {
    /// Creates a new config with a validated step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step is non-positive or non-finite.
    pub fn new(points: Points, step: Step) -> Result<Self, ConfigError> {
        let h = match step {
            Step::Absolute(h) | Step::Relative(h) => h,
        };
        if !h.is_finite() || h <= 0.0 {
            return Err(ConfigError::Step);
        }

        Ok(Self { points, step })
    }

    /// Creates a config from a stencil size and the index of the centre
    /// sample within it.
    ///
    /// Two points centred at 0 is a forward difference, two points centred
    /// at 1 is a backward difference, three points centred at 1 is a
    /// central difference.
    ///
    /// # Errors
    ///
    /// Returns an error for any other stencil or an invalid step.
    pub fn from_stencil(points: usize, center: usize, step: Step) -> Result<Self, ConfigError> {
        let points = match (points, center) {
            (2, 0) => Points::Forward,
            (2, 1) => Points::Backward,
            (3, 1) => Points::Central,
            _ => return Err(ConfigError::Stencil { points, center }),
        };
        Self::new(points, step)
    }

    /// Returns the difference scheme.
    #[must_use]
    pub fn points(&self) -> Points {
        self.points
    }

    /// Returns the perturbation policy.
    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    /// Number of extra evaluations needed for one partial derivative.
    #[must_use]
    pub fn evals_per_partial(&self) -> usize {
        match self.points {
            Points::Forward | Points::Backward => 1,
            Points::Central => 2,
        }
    }

    fn raw_step(&self, x: f64) -> f64 {
        match self.step {
            Step::Absolute(h) => h,
            Step::Relative(rel) if x == 0.0 => rel,
            Step::Relative(rel) => rel * x.abs(),
        }
    }
}

/// Errors that can occur while estimating a gradient.
#[derive(Debug, Error)]
pub enum GradientError<E> {
    /// Evaluating a perturbed point failed.
    #[error("evaluation failed while perturbing x[{index}]")]
    Evaluation {
        index: usize,
        #[source]
        source: E,
    },

    /// A perturbed evaluation or the resulting partial was not finite.
    #[error("non-finite value {value} while perturbing x[{index}]")]
    NonFinite { index: usize, value: f64 },

    /// The perturbation vanished in floating point.
    #[error("perturbation of x[{index}] = {x} vanished")]
    InvalidStep { index: usize, x: f64 },

    /// A perturbed evaluation returned the wrong number of values.
    #[error("expected {expected} values, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Estimates the gradient of a scalar function at `x`.
///
/// `base` must be `f(x)`; it is reused by one-sided schemes and ignored by
/// central differences. The result is written into `out`, which must have
/// the same length as `x`.
///
/// # Errors
///
/// Returns an error if any perturbed evaluation fails or is non-finite, if
/// a perturbation vanishes, or if `out` has the wrong length.
pub fn gradient<F, E>(
    config: &Config,
    mut f: F,
    x: &[f64],
    base: f64,
    out: &mut [f64],
) -> Result<(), GradientError<E>>
where
    F: FnMut(&[f64]) -> Result<f64, E>,
{
    if out.len() != x.len() {
        return Err(GradientError::Length {
            expected: x.len(),
            actual: out.len(),
        });
    }

    let rows = jacobian(config, |xp| f(xp).map(|v| vec![v]), x, &[base])?;
    out.copy_from_slice(&rows[0]);
    Ok(())
}

/// Estimates the Jacobian of a vector-valued function at `x`.
///
/// `base` must be `f(x)`. The result has one row per output, so
/// `result[k][i]` is the partial of output `k` with respect to `x[i]`.
///
/// # Errors
///
/// Returns an error if any perturbed evaluation fails, returns a different
/// number of values than `base`, or yields a non-finite value, or if a
/// perturbation vanishes.
pub fn jacobian<F, E>(
    config: &Config,
    mut f: F,
    x: &[f64],
    base: &[f64],
) -> Result<Vec<Vec<f64>>, GradientError<E>>
where
    F: FnMut(&[f64]) -> Result<Vec<f64>, E>,
{
    let mut rows = vec![vec![0.0; x.len()]; base.len()];
    let mut xp = x.to_vec();

    for index in 0..x.len() {
        let partials = partial(config, &mut f, &mut xp, index, base)?;
        for (row, value) in rows.iter_mut().zip(partials) {
            row[index] = value;
        }
    }

    Ok(rows)
}

/// Computes the partials of every output with respect to `x[index]`.
///
/// `xp` is restored to its original value before returning.
fn partial<F, E>(
    config: &Config,
    f: &mut F,
    xp: &mut [f64],
    index: usize,
    base: &[f64],
) -> Result<Vec<f64>, GradientError<E>>
where
    F: FnMut(&[f64]) -> Result<Vec<f64>, E>,
{
    let x0 = xp[index];
    let raw = config.raw_step(x0);

    // Use the step actually representable around x0.
    let h = (x0 + raw) - x0;
    if !h.is_finite() || h <= 0.0 {
        return Err(GradientError::InvalidStep { index, x: x0 });
    }

    let mut sample = |value: f64| -> Result<Vec<f64>, GradientError<E>> {
        xp[index] = value;
        let result = f(xp);
        xp[index] = x0;

        let values = result.map_err(|source| GradientError::Evaluation { index, source })?;
        if values.len() != base.len() {
            return Err(GradientError::Length {
                expected: base.len(),
                actual: values.len(),
            });
        }
        if let Some(&value) = values.iter().find(|v| !v.is_finite()) {
            return Err(GradientError::NonFinite { index, value });
        }
        Ok(values)
    };

    let partials: Vec<f64> = match config.points {
        Points::Forward => {
            let plus = sample(x0 + h)?;
            plus.iter().zip(base).map(|(p, b)| (p - b) / h).collect()
        }
        Points::Backward => {
            let minus = sample(x0 - h)?;
            base.iter().zip(&minus).map(|(b, m)| (b - m) / h).collect()
        }
        Points::Central => {
            let plus = sample(x0 + h)?;
            let minus = sample(x0 - h)?;
            plus.iter()
                .zip(&minus)
                .map(|(p, m)| (p - m) / (2.0 * h))
                .collect()
        }
    };

    if let Some(&value) = partials.iter().find(|v| !v.is_finite()) {
        return Err(GradientError::NonFinite { index, value });
    }

    log::trace!("partial d/dx[{index}] with h = {h:e}: {partials:?}");
    Ok(partials)
}
