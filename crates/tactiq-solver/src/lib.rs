mod backend;
mod branch_bound;
mod problem;
mod simplex;
mod solution;

pub use backend::Backend;
pub use branch_bound::BranchAndBound;
pub use problem::{Constraint, ConstraintOp, LpProblem, Objective, ProblemError, Variable, VariableKind};
pub use simplex::{Bound, LpResult, LpStatus, Simplex};
pub use solution::{Solution, SolutionStatus, SolveStats};
