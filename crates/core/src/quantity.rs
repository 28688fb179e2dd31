/// A named engineering quantity reported alongside an optimization.
///
/// The target and expected range only drive how values are displayed
/// (scaled against the expected range); they never enter the optimization
/// math.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quantity {
    name: String,
    target: Option<f64>,
    expected_range: Option<(f64, f64)>,
}

impl Quantity {
    /// Creates a quantity with no target and no expected range.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            expected_range: None,
        }
    }

    /// Sets the target value shown next to the quantity.
    #[must_use]
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the expected `(min, max)` range used for display scaling.
    #[must_use]
    pub fn with_expected_range(mut self, min: f64, max: f64) -> Self {
        self.expected_range = Some((min, max));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn target(&self) -> Option<f64> {
        self.target
    }

    #[must_use]
    pub fn expected_range(&self) -> Option<(f64, f64)> {
        self.expected_range
    }

    /// Scales a value into `[0, 1]` over the expected range.
    ///
    /// Values outside the range map outside `[0, 1]`. Without a usable range
    /// (missing, non-finite, or zero width) the value is returned unchanged.
    #[must_use]
    pub fn normalized(&self, value: f64) -> f64 {
        match self.expected_range {
            Some((min, max)) if min.is_finite() && max.is_finite() && max != min => {
                (value - min) / (max - min)
            }
            _ => value,
        }
    }
}

/// Whether a constraint must equal zero or stay at or below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintKind {
    /// `h(x) = 0`
    Equality,

    /// `g(x) <= 0`
    Inequality,
}

/// A constraint definition: what it measures, its kind, and its tolerance.
///
/// Constraint values themselves come from
/// [`OptimizationProblem::constraint`](crate::OptimizationProblem::constraint),
/// addressed by the index of the definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    quantity: Quantity,
    kind: ConstraintKind,
    tolerance: f64,
}

impl Constraint {
    /// Creates a constraint definition.
    ///
    /// A negative or non-finite tolerance is treated as zero.
    pub fn new(quantity: Quantity, kind: ConstraintKind, tolerance: f64) -> Self {
        let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
            tolerance
        } else {
            0.0
        };
        Self {
            quantity,
            kind,
            tolerance,
        }
    }

    #[must_use]
    pub fn quantity(&self) -> &Quantity {
        &self.quantity
    }

    #[must_use]
    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns how far `value` is from satisfying the constraint (zero if satisfied exactly).
    #[must_use]
    pub fn violation(&self, value: f64) -> f64 {
        match self.kind {
            ConstraintKind::Equality => value.abs(),
            ConstraintKind::Inequality => value.max(0.0),
        }
    }

    /// Returns `true` if `value` satisfies the constraint within its tolerance.
    #[must_use]
    pub fn is_satisfied(&self, value: f64) -> bool {
        self.violation(value) <= self.tolerance
    }
}
