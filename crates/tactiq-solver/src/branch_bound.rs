use tracing::{info, trace};

use crate::backend::Backend;
use crate::problem::{LpProblem, ProblemError};
use crate::simplex::{Bound, LpStatus, Simplex};
use crate::solution::{Solution, SolveStats};

/// Depth-first branch-and-bound over simplex relaxations
///
/// The search order depends only on the problem, so identical problems
/// always produce identical solutions.
#[derive(Debug, Clone)]
pub struct BranchAndBound {
    simplex: Simplex,
    /// Maximum relaxations evaluated before giving up
    max_nodes: usize,
    /// Distance from an integer below which a value counts as integral
    integrality_tolerance: f64,
    /// Emit progress at info level instead of trace
    verbose: bool,
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self {
            simplex: Simplex::default(),
            max_nodes: 100_000,
            integrality_tolerance: 1e-6,
            verbose: false,
        }
    }
}

impl BranchAndBound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_simplex(mut self, simplex: Simplex) -> Self {
        self.simplex = simplex;
        self
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = max;
        self
    }

    pub fn with_integrality_tolerance(mut self, tol: f64) -> Self {
        self.integrality_tolerance = tol;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn search(&self, problem: &LpProblem) -> Solution {
        // Compare in maximization terms
        let sense = if problem.objective.minimize { -1.0 } else { 1.0 };
        let root: Vec<Bound> = problem
            .variables
            .iter()
            .map(|v| Bound { lower: v.lower, upper: v.upper })
            .collect();

        let mut stack = vec![root];
        let mut incumbent: Option<(Vec<f64>, f64)> = None;
        let mut stats = SolveStats::default();
        let mut limit_hit = false;

        while let Some(bounds) = stack.pop() {
            if stats.nodes >= self.max_nodes {
                limit_hit = true;
                break;
            }
            stats.nodes += 1;

            let lp = self.simplex.solve_with_bounds(problem, &bounds);
            stats.lp_iterations += lp.iterations;
            match lp.status {
                LpStatus::Optimal => {}
                LpStatus::Infeasible => continue,
                LpStatus::Unbounded if stats.nodes == 1 => return Solution::unbounded(stats),
                // Children of a bounded root stay bounded
                LpStatus::Unbounded => continue,
                LpStatus::IterationLimit => {
                    limit_hit = true;
                    continue;
                }
            }

            if let Some((_, best)) = &incumbent {
                let margin = self.simplex.tolerance() * (1.0 + best.abs());
                if sense * lp.objective_value <= sense * best + margin {
                    continue;
                }
            }

            match self.branching_variable(problem, &lp.values) {
                None => {
                    let values = self.round_integers(problem, lp.values);
                    let objective = problem.objective_at(&values);
                    if self.verbose {
                        info!(node = stats.nodes, objective, "new incumbent");
                    } else {
                        trace!(node = stats.nodes, objective, "new incumbent");
                    }
                    incumbent = Some((values, objective));
                }
                Some(j) => {
                    let value = lp.values[j];
                    let floor = value.floor();

                    let mut down = bounds.clone();
                    down[j].upper = Some(floor);
                    let mut up = bounds;
                    up[j].lower = floor + 1.0;

                    // Nearer rounding is explored first
                    if value - floor > 0.5 {
                        stack.push(down);
                        stack.push(up);
                    } else {
                        stack.push(up);
                        stack.push(down);
                    }
                }
            }
        }

        if self.verbose {
            info!(nodes = stats.nodes, lp_iterations = stats.lp_iterations, limit_hit, "search finished");
        } else {
            trace!(nodes = stats.nodes, lp_iterations = stats.lp_iterations, limit_hit, "search finished");
        }

        match (incumbent, limit_hit) {
            (Some((values, objective)), false) => Solution::optimal(values, objective, stats),
            (Some((values, objective)), true) => Solution::undefined(values, objective, stats),
            (None, false) => Solution::infeasible(stats),
            (None, true) => Solution::not_solved(stats),
        }
    }

    /// Most fractional integer variable, lowest index on ties
    fn branching_variable(&self, problem: &LpProblem, values: &[f64]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (j, var) in problem.variables.iter().enumerate() {
            if !var.is_integer() {
                continue;
            }
            let frac = values[j] - values[j].floor();
            let distance = frac.min(1.0 - frac);
            if distance > self.integrality_tolerance && best.is_none_or(|(_, d)| distance > d) {
                best = Some((j, distance));
            }
        }
        best.map(|(j, _)| j)
    }

    fn round_integers(&self, problem: &LpProblem, mut values: Vec<f64>) -> Vec<f64> {
        for (value, var) in values.iter_mut().zip(&problem.variables) {
            if var.is_integer() {
                *value = value.round();
            }
        }
        values
    }
}

impl Backend for BranchAndBound {
    fn solve(&self, problem: &LpProblem) -> Result<Solution, ProblemError> {
        problem.validate()?;
        Ok(self.search(problem))
    }

    fn name(&self) -> &str {
        "branch-and-bound"
    }
}
