use crate::problem::{ConstraintOp, LpProblem};

/// Consecutive degenerate pivots tolerated before switching to Bland's rule
const DEGENERATE_PIVOT_LIMIT: usize = 50;

/// Bounded two-phase simplex for the LP relaxation of a problem
#[derive(Debug, Clone)]
pub struct Simplex {
    /// Maximum pivots per solve before giving up
    max_iterations: usize,
    /// Tolerance for pivoting and reduced costs
    tolerance: f64,
    /// Residual allowed on artificial variables at the end of phase 1
    feasibility_tolerance: f64,
}

impl Default for Simplex {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            feasibility_tolerance: 1e-7,
        }
    }
}

/// Variable domain used for one relaxation solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub lower: f64,
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    IterationLimit,
}

/// Outcome of one LP relaxation
#[derive(Debug, Clone)]
pub struct LpResult {
    pub status: LpStatus,
    /// Values in the original variable space (empty unless optimal)
    pub values: Vec<f64>,
    pub objective_value: f64,
    /// Pivots performed
    pub iterations: usize,
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_feasibility_tolerance(mut self, tol: f64) -> Self {
        self.feasibility_tolerance = tol;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Solve the continuous relaxation using the problem's own bounds
    pub fn solve(&self, problem: &LpProblem) -> LpResult {
        let bounds: Vec<Bound> = problem
            .variables
            .iter()
            .map(|v| Bound { lower: v.lower, upper: v.upper })
            .collect();
        self.solve_with_bounds(problem, &bounds)
    }

    /// Solve the continuous relaxation with overridden variable bounds
    pub fn solve_with_bounds(&self, problem: &LpProblem, bounds: &[Bound]) -> LpResult {
        let reduced = self.reduce(problem, bounds);
        let mut tableau = self.build_tableau(&reduced, problem.objective.minimize);
        let mut iterations = 0;

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, &mut iterations) {
                Phase1Result::Feasible => {}
                Phase1Result::Infeasible => return LpResult::without_point(LpStatus::Infeasible, iterations),
                Phase1Result::IterationLimit => {
                    return LpResult::without_point(LpStatus::IterationLimit, iterations);
                }
            }
        }

        // Phase 2: Optimize
        let exclude_from = tableau.n_vars + tableau.n_slack;
        match self.run(&mut tableau, exclude_from, &mut iterations) {
            SimplexResult::Optimal => {}
            SimplexResult::Unbounded => return LpResult::without_point(LpStatus::Unbounded, iterations),
            SimplexResult::IterationLimit => {
                return LpResult::without_point(LpStatus::IterationLimit, iterations);
            }
        }

        let values = self.extract_values(&tableau, &reduced);
        LpResult {
            status: LpStatus::Optimal,
            objective_value: problem.objective_at(&values),
            values,
            iterations,
        }
    }

    /// Eliminate fixed variables, shift lower bounds to zero and turn finite
    /// upper bounds into rows
    fn reduce(&self, problem: &LpProblem, bounds: &[Bound]) -> Reduced {
        let n = problem.num_variables();
        let mut columns = Vec::with_capacity(n);
        let mut offsets = vec![0.0; n];

        for (j, b) in bounds.iter().enumerate() {
            offsets[j] = b.lower;
            let fixed = b.upper.is_some_and(|u| u - b.lower <= self.tolerance);
            if !fixed {
                columns.push(j);
            }
        }

        let mut rows = Vec::with_capacity(problem.num_constraints() + columns.len());
        for c in &problem.constraints {
            let shift: f64 = c
                .coefficients
                .iter()
                .zip(&offsets)
                .map(|(a, l)| a * l)
                .sum();
            rows.push(Row {
                coefficients: columns.iter().map(|&j| c.coefficients[j]).collect(),
                op: c.op,
                rhs: c.rhs - shift,
            });
        }

        for (k, &j) in columns.iter().enumerate() {
            if let Some(upper) = bounds[j].upper {
                let mut coefficients = vec![0.0; columns.len()];
                coefficients[k] = 1.0;
                rows.push(Row {
                    coefficients,
                    op: ConstraintOp::Le,
                    rhs: upper - bounds[j].lower,
                });
            }
        }

        let objective = columns.iter().map(|&j| problem.objective.coefficients[j]).collect();

        Reduced {
            columns,
            offsets,
            rows,
            objective,
        }
    }

    fn build_tableau(&self, reduced: &Reduced, minimize: bool) -> Tableau {
        let n_vars = reduced.columns.len();
        let n_constraints = reduced.rows.len();

        // Normalize to non-negative right-hand sides
        let rows: Vec<Row> = reduced
            .rows
            .iter()
            .map(|r| {
                if r.rhs < 0.0 {
                    Row {
                        coefficients: r.coefficients.iter().map(|a| -a).collect(),
                        op: r.op.flipped(),
                        rhs: -r.rhs,
                    }
                } else {
                    r.clone()
                }
            })
            .collect();

        // Count slack and artificial variables needed
        let mut n_slack = 0;
        let mut n_artificial = 0;
        for r in &rows {
            match r.op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let total_cols = n_vars + n_slack + n_artificial + 1; // +1 for RHS
        let total_rows = n_constraints + 1; // +1 for objective

        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; total_rows],
            basic_vars: vec![0; n_constraints],
            n_vars,
            n_slack,
            n_artificial,
        };

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;

        for (i, r) in rows.iter().enumerate() {
            tableau.data[i][..n_vars].copy_from_slice(&r.coefficients);
            tableau.data[i][total_cols - 1] = r.rhs;

            match r.op {
                ConstraintOp::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    tableau.basic_vars[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    tableau.data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // Objective row (last row). Pivoting maximizes, so a minimization
        // objective is stored negated.
        let obj_row = n_constraints;
        for (j, &coef) in reduced.objective.iter().enumerate() {
            tableau.data[obj_row][j] = if minimize { -coef } else { coef };
        }

        tableau
    }

    fn phase1(&self, tableau: &mut Tableau, iterations: &mut usize) -> Phase1Result {
        let n_constraints = tableau.data.len() - 1;
        let n_cols = tableau.data[0].len();
        let art_start = tableau.n_vars + tableau.n_slack;

        let orig_obj = tableau.data[n_constraints].clone();

        // Maximize -sum(artificials)
        tableau.data[n_constraints].fill(0.0);
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[n_constraints][j] = -1.0;
        }

        // Price out the basic artificials
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] += tableau.data[i][j];
                }
            }
        }

        match self.run(tableau, n_cols - 1, iterations) {
            SimplexResult::Optimal => {}
            // Phase 1 is bounded below by zero
            SimplexResult::Unbounded => return Phase1Result::Infeasible,
            SimplexResult::IterationLimit => return Phase1Result::IterationLimit,
        }

        let rhs_col = n_cols - 1;
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start && tableau.data[i][rhs_col].abs() > self.feasibility_tolerance {
                return Phase1Result::Infeasible;
            }
        }

        self.drive_out_artificials(tableau);

        // Restore original objective and price out basic variables
        tableau.data[n_constraints] = orig_obj;
        for i in 0..n_constraints {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[n_constraints][basic];
            if ratio.abs() > self.tolerance {
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        Phase1Result::Feasible
    }

    /// Replace zero-level artificials in the basis with structural or slack
    /// columns; rows where none exists are redundant and stay inert.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let n_constraints = tableau.data.len() - 1;
        let rhs_col = tableau.data[0].len() - 1;
        let art_start = tableau.n_vars + tableau.n_slack;

        for i in 0..n_constraints {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            tableau.data[i][rhs_col] = 0.0;

            let mut best: Option<(usize, f64)> = None;
            for j in 0..art_start {
                let magnitude = tableau.data[i][j].abs();
                if magnitude > self.tolerance && best.is_none_or(|(_, m)| magnitude > m) {
                    best = Some((j, magnitude));
                }
            }
            if let Some((col, _)) = best {
                self.pivot(tableau, i, col);
            }
        }
    }

    /// Pivot until no entering column below `exclude_from` improves the objective
    fn run(&self, tableau: &mut Tableau, exclude_from: usize, iterations: &mut usize) -> SimplexResult {
        let rhs_col = tableau.data[0].len() - 1;
        let mut degenerate_run = 0;

        while *iterations < self.max_iterations {
            let bland = degenerate_run >= DEGENERATE_PIVOT_LIMIT;
            let Some(pivot_col) = self.find_pivot_column(tableau, exclude_from, bland) else {
                return SimplexResult::Optimal;
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col, bland) else {
                return SimplexResult::Unbounded;
            };

            if tableau.data[pivot_row][rhs_col].abs() <= self.tolerance {
                degenerate_run += 1;
            } else {
                degenerate_run = 0;
            }

            self.pivot(tableau, pivot_row, pivot_col);
            *iterations += 1;
        }

        SimplexResult::IterationLimit
    }

    /// Dantzig pricing, or the lowest improving index under Bland's rule
    fn find_pivot_column(&self, tableau: &Tableau, exclude_from: usize, bland: bool) -> Option<usize> {
        let obj_row = tableau.data.len() - 1;
        let n_cols = exclude_from.min(tableau.data[0].len() - 1);

        let mut max_val = self.tolerance;
        let mut max_col = None;

        for j in 0..n_cols {
            let rc = tableau.data[obj_row][j];
            if rc > max_val {
                if bland {
                    return Some(j);
                }
                max_val = rc;
                max_col = Some(j);
            }
        }

        max_col
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize, bland: bool) -> Option<usize> {
        let n_constraints = tableau.data.len() - 1;
        let rhs_col = tableau.data[0].len() - 1;

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..n_constraints {
            let val = tableau.data[i][col];
            if val > self.tolerance {
                let ratio = (tableau.data[i][rhs_col] / val).max(0.0);
                let better = match min_row {
                    None => true,
                    Some(r) if bland => {
                        ratio < min_ratio - self.tolerance
                            || (ratio <= min_ratio + self.tolerance && tableau.basic_vars[i] < tableau.basic_vars[r])
                    }
                    Some(_) => ratio < min_ratio - self.tolerance,
                };
                if better {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }

        min_row
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_rows = tableau.data.len();

        tableau.basic_vars[row] = col;

        let pivot_val = tableau.data[row][col];
        for v in tableau.data[row].iter_mut() {
            *v /= pivot_val;
        }
        tableau.data[row][col] = 1.0;

        let pivot_row = tableau.data[row].clone();
        for i in 0..n_rows {
            if i == row {
                continue;
            }
            let factor = tableau.data[i][col];
            if factor.abs() <= f64::EPSILON {
                continue;
            }
            for (v, p) in tableau.data[i].iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
            tableau.data[i][col] = 0.0;
        }
    }

    fn extract_values(&self, tableau: &Tableau, reduced: &Reduced) -> Vec<f64> {
        let rhs_col = tableau.data[0].len() - 1;
        let mut shifted = vec![0.0; tableau.n_vars];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < tableau.n_vars {
                shifted[basic] = tableau.data[i][rhs_col];
            }
        }

        let mut values = reduced.offsets.clone();
        for (k, &j) in reduced.columns.iter().enumerate() {
            values[j] += shifted[k];
        }
        values
    }
}

impl LpResult {
    fn without_point(status: LpStatus, iterations: usize) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value: f64::NAN,
            iterations,
        }
    }
}

/// Problem rows over the free columns only
struct Reduced {
    /// Original index of each tableau column
    columns: Vec<usize>,
    /// Lower bound (or fixed value) of every original variable
    offsets: Vec<f64>,
    rows: Vec<Row>,
    objective: Vec<f64>,
}

#[derive(Clone)]
struct Row {
    coefficients: Vec<f64>,
    op: ConstraintOp,
    rhs: f64,
}

struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
}

enum SimplexResult {
    Optimal,
    Unbounded,
    IterationLimit,
}

enum Phase1Result {
    Feasible,
    Infeasible,
    IterationLimit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{LpProblem, Variable};

    fn continuous(names: &[&str]) -> Vec<Variable> {
        names.iter().map(|n| Variable::continuous(*n)).collect()
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=11
        let mut problem = LpProblem::new(continuous(&["x", "y"]));
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let result = Simplex::new().solve(&problem);

        assert_eq!(result.status, LpStatus::Optimal);
        assert!((result.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", result.values[0]);
        assert!((result.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", result.values[1]);
        assert!((result.objective_value - 11.0).abs() < 1e-6, "obj = {} (expected 11)", result.objective_value);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let mut problem = LpProblem::new(continuous(&["x", "y"]));
        problem.set_objective(vec![2.0, 3.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let result = Simplex::new().solve(&problem);

        assert_eq!(result.status, LpStatus::Optimal);
        assert!((result.values[0] - 3.0).abs() < 1e-6);
        assert!((result.values[1] - 1.0).abs() < 1e-6);
        assert!((result.objective_value - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible() {
        // x >= 5
        // x <= 3
        let mut problem = LpProblem::new(continuous(&["x"]));
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("lower", vec![1.0], ConstraintOp::Ge, 5.0);
        problem.add_constraint("upper", vec![1.0], ConstraintOp::Le, 3.0);

        let result = Simplex::new().solve(&problem);

        assert_eq!(result.status, LpStatus::Infeasible);
        assert!(result.values.is_empty());
    }

    #[test]
    fn test_unbounded() {
        let mut problem = LpProblem::new(continuous(&["x", "y"]));
        problem.set_objective(vec![1.0, 1.0], false);
        problem.add_constraint("diff", vec![1.0, -1.0], ConstraintOp::Le, 2.0);

        let result = Simplex::new().solve(&problem);

        assert_eq!(result.status, LpStatus::Unbounded);
    }

    #[test]
    fn test_variable_bounds_become_rows() {
        // Maximize x + y with x in [0, 1], y in [0, 1] and x + y <= 5
        let mut problem = LpProblem::new(vec![Variable::binary("x"), Variable::binary("y")]);
        problem.set_objective(vec![1.0, 1.0], false);
        problem.add_constraint("loose", vec![1.0, 1.0], ConstraintOp::Le, 5.0);

        let result = Simplex::new().solve(&problem);

        assert_eq!(result.status, LpStatus::Optimal);
        assert!((result.objective_value - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_fixed_variables_are_substituted() {
        // x fixed at 1 turns x + y = 0 into y = -1, which is infeasible for y >= 0
        let mut problem = LpProblem::new(vec![Variable::binary("x"), Variable::binary("y")]);
        problem.set_objective(vec![1.0, 1.0], false);
        problem.add_constraint("link", vec![1.0, 1.0], ConstraintOp::Eq, 0.0);

        let fixed = [
            Bound { lower: 1.0, upper: Some(1.0) },
            Bound { lower: 0.0, upper: Some(1.0) },
        ];
        let result = Simplex::new().solve_with_bounds(&problem, &fixed);
        assert_eq!(result.status, LpStatus::Infeasible);

        // x - y = 0 with x fixed at 1 forces y = 1 through a negative rhs row
        let mut problem = LpProblem::new(vec![Variable::binary("x"), Variable::binary("y")]);
        problem.set_objective(vec![0.0, -1.0], false);
        problem.add_constraint("tie", vec![1.0, -1.0], ConstraintOp::Eq, 0.0);

        let result = Simplex::new().solve_with_bounds(&problem, &fixed);
        assert_eq!(result.status, LpStatus::Optimal);
        assert!((result.values[0] - 1.0).abs() < 1e-9);
        assert!((result.values[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_assignment_terminates() {
        // Three workers, three tasks, every worker does exactly one task and
        // every task gets exactly one worker; many ties in the profit matrix.
        let profit = [[1.0, 1.0, 1.0], [1.0, 1.0, 2.0], [2.0, 1.0, 1.0]];
        let names: Vec<String> = (0..9).map(|k| format!("a{}{}", k / 3, k % 3)).collect();
        let mut problem = LpProblem::new(names.iter().map(Variable::binary).collect());
        problem.set_objective(profit.iter().flatten().copied().collect(), false);
        for w in 0..3 {
            let mut row = vec![0.0; 9];
            for t in 0..3 {
                row[w * 3 + t] = 1.0;
            }
            problem.add_constraint(format!("worker_{}", w), row, ConstraintOp::Eq, 1.0);
        }
        for t in 0..3 {
            let mut row = vec![0.0; 9];
            for w in 0..3 {
                row[w * 3 + t] = 1.0;
            }
            problem.add_constraint(format!("task_{}", t), row, ConstraintOp::Eq, 1.0);
        }

        let result = Simplex::new().solve(&problem);

        assert_eq!(result.status, LpStatus::Optimal);
        assert!((result.objective_value - 5.0).abs() < 1e-6, "obj = {}", result.objective_value);
    }

    #[test]
    fn test_iteration_limit_is_not_optimal() {
        let mut problem = LpProblem::new(continuous(&["x", "y"]));
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);

        let result = Simplex::new().with_max_iterations(0).solve(&problem);

        assert_eq!(result.status, LpStatus::IterationLimit);
    }
}
