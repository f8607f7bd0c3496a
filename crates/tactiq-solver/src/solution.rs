use std::fmt;

/// The result of solving a problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Values for each variable (empty unless a point is available)
    pub values: Vec<f64>,
    /// Objective value at `values`
    pub objective_value: f64,
    /// Search statistics
    pub stats: SolveStats,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolutionStatus {
    /// A proven optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// A limit was reached with a feasible but unproven point
    Undefined,
    /// A limit was reached before any feasible point was found
    NotSolved,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Branch-and-bound nodes evaluated
    pub nodes: usize,
    /// Simplex pivots across all nodes
    pub lp_iterations: usize,
}

impl SolutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "Optimal",
            SolutionStatus::Infeasible => "Infeasible",
            SolutionStatus::Unbounded => "Unbounded",
            SolutionStatus::Undefined => "Undefined",
            SolutionStatus::NotSolved => "Not Solved",
        }
    }

    pub fn is_optimal(self) -> bool {
        self == SolutionStatus::Optimal
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Solution {
    pub fn optimal(values: Vec<f64>, objective_value: f64, stats: SolveStats) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            stats,
        }
    }

    pub fn infeasible(stats: SolveStats) -> Self {
        Self::without_point(SolutionStatus::Infeasible, f64::NAN, stats)
    }

    pub fn unbounded(stats: SolveStats) -> Self {
        Self::without_point(SolutionStatus::Unbounded, f64::NAN, stats)
    }

    pub fn not_solved(stats: SolveStats) -> Self {
        Self::without_point(SolutionStatus::NotSolved, f64::NAN, stats)
    }

    /// A limit stopped the search while holding an incumbent
    pub fn undefined(values: Vec<f64>, objective_value: f64, stats: SolveStats) -> Self {
        Self {
            status: SolutionStatus::Undefined,
            values,
            objective_value,
            stats,
        }
    }

    fn without_point(status: SolutionStatus, objective_value: f64, stats: SolveStats) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(SolutionStatus::Optimal.to_string(), "Optimal");
        assert_eq!(SolutionStatus::NotSolved.to_string(), "Not Solved");
        assert!(!SolutionStatus::Undefined.is_optimal());
    }
}
