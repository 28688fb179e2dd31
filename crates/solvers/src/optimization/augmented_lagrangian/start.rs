use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::optimization::Bounds;

use super::Error;

/// Where the solve starts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StartPosition {
    /// An explicit point.
    Given(Vec<f64>),

    /// The midpoint of every variable's range.
    CenterOfRange,

    /// A uniformly random point within the bounds, reproducible by seed.
    Random { seed: u64 },
}

impl StartPosition {
    /// Produces the start point for `bounds`.
    ///
    /// # Errors
    ///
    /// Returns an error if a given point has the wrong length or lies
    /// outside the bounds.
    pub fn resolve(&self, bounds: &Bounds) -> Result<Vec<f64>, Error> {
        match self {
            Self::Given(x) => {
                if x.len() != bounds.len() {
                    return Err(Error::WrongDimension {
                        expected: bounds.len(),
                        actual: x.len(),
                    });
                }
                if let Some(index) = bounds.violation(x) {
                    return Err(Error::StartOutOfBounds {
                        index,
                        value: x[index],
                    });
                }
                Ok(x.clone())
            }
            Self::CenterOfRange => Ok(bounds.center()),
            Self::Random { seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                Ok(bounds
                    .pairs()
                    .map(|(lo, hi)| rng.gen_range(lo..=hi))
                    .collect())
            }
        }
    }
}
