use crate::problem::{LpProblem, ProblemError};
use crate::solution::Solution;

/// Common interface for MILP backends
///
/// Implementations must be re-entrant: one backend may serve concurrent
/// solves from several threads.
pub trait Backend: Send + Sync {
    /// Solve the problem to a terminal status
    ///
    /// Returns an error only when the problem itself is malformed; every
    /// modelling outcome (infeasible, unbounded, limits) is a status.
    fn solve(&self, problem: &LpProblem) -> Result<Solution, ProblemError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
