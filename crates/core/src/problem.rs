use crate::Constraint;

/// Defines an optimization problem to be solved.
///
/// A problem maps solver variables `x` into a model input, then computes an
/// objective (and, optionally, constraint values) from the model input and
/// output. Solvers minimize the objective.
///
/// The number of variables is only known at run time because it is dictated
/// by the host document (for example, how many parameters a parametric
/// definition exposes), so `x` is a slice rather than a fixed-size array.
pub trait OptimizationProblem {
    type Input;
    type Output;
    type InputError: std::error::Error + Send + Sync + 'static;
    type ObjectiveError: std::error::Error + Send + Sync + 'static;

    /// Returns the number of free variables.
    fn variable_count(&self) -> usize;

    /// Maps solver variables (`x`) into a model input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be constructed from `x`.
    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::InputError>;

    /// Computes the objective value from model input/output.
    ///
    /// # Errors
    ///
    /// Returns an error if the objective cannot be computed.
    fn objective(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<f64, Self::ObjectiveError>;

    /// Returns the constraint definitions, in index order.
    ///
    /// The default is an unconstrained problem.
    fn constraints(&self) -> &[Constraint] {
        &[]
    }

    /// Computes the value of the constraint at `index` from model input/output.
    ///
    /// Equality constraints are satisfied at zero, inequality constraints at
    /// or below zero. The value must depend only on `index`, `input`, and
    /// `output`: solvers may request constraints in any order.
    ///
    /// Only called for indices below `self.constraints().len()`. The default
    /// returns NaN, which solvers report as a non-finite constraint, so
    /// problems that declare constraints must override it.
    ///
    /// # Errors
    ///
    /// Returns an error if the constraint cannot be computed.
    fn constraint(
        &self,
        _index: usize,
        _input: &Self::Input,
        _output: &Self::Output,
    ) -> Result<f64, Self::ObjectiveError> {
        Ok(f64::NAN)
    }
}
