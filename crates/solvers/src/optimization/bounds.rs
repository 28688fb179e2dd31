use thiserror::Error;

/// Box bounds `lower[i] <= x[i] <= upper[i]` on the solver variables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

/// Errors that can occur when constructing [`Bounds`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum BoundsError {
    #[error("{lower} lower bounds but {upper} upper bounds")]
    Length { lower: usize, upper: usize },

    #[error("bounds of x[{index}] must be finite")]
    NonFinite { index: usize },

    #[error("lower bound {lower} of x[{index}] exceeds upper bound {upper}")]
    Inverted { index: usize, lower: f64, upper: f64 },
}

impl Bounds {
    /// Creates validated bounds.
    ///
    /// A variable may be fixed by giving it equal lower and upper bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the lengths differ, a bound is not finite, or a
    /// lower bound exceeds its upper bound.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, BoundsError> {
        if lower.len() != upper.len() {
            return Err(BoundsError::Length {
                lower: lower.len(),
                upper: upper.len(),
            });
        }

        for (index, (&lo, &hi)) in lower.iter().zip(&upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(BoundsError::NonFinite { index });
            }
            if lo > hi {
                return Err(BoundsError::Inverted {
                    index,
                    lower: lo,
                    upper: hi,
                });
            }
        }

        Ok(Self { lower, upper })
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    /// Returns `true` if there are no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// Returns the lower bounds.
    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Returns the upper bounds.
    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Returns `(lower, upper)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lower.iter().copied().zip(self.upper.iter().copied())
    }

    /// Returns the midpoint of every range.
    #[must_use]
    pub fn center(&self) -> Vec<f64> {
        self.pairs().map(|(lo, hi)| 0.5 * (lo + hi)).collect()
    }

    /// Returns the index of the first coordinate of `x` outside the bounds.
    #[must_use]
    pub fn violation(&self, x: &[f64]) -> Option<usize> {
        x.iter()
            .zip(self.pairs())
            .position(|(v, (lo, hi))| !(lo..=hi).contains(v))
    }

    /// Projects `x` onto the bounds in place.
    pub fn clamp(&self, x: &mut [f64]) {
        for (v, (lo, hi)) in x.iter_mut().zip(self.pairs()) {
            *v = v.clamp(lo, hi);
        }
    }
}
