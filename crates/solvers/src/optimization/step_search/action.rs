/// Actions an observer can take during the step search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the search and return the best point found so far.
    StopEarly,
}
