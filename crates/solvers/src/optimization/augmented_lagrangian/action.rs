/// Actions an observer can take during the augmented Lagrangian solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solve and return the best point found so far.
    StopEarly,
}
