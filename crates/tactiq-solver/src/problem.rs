use thiserror::Error;

/// Represents a mixed-integer linear programming problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Decision variables, in column order
    pub variables: Vec<Variable>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    /// Lower bound (finite)
    pub lower: f64,
    /// Upper bound, `None` when unbounded above
    pub upper: Option<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Continuous,
    /// Integer restricted to {0, 1}
    Binary,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    pub fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("Objective has {found} coefficients but the problem has {expected} variables")]
    ObjectiveLength { expected: usize, found: usize },
    #[error("Constraint {name} has {found} coefficients but the problem has {expected} variables")]
    ConstraintLength { name: String, expected: usize, found: usize },
    #[error("Variable {0} has lower bound above its upper bound")]
    EmptyDomain(String),
    #[error("Non-finite value in {0}")]
    NonFinite(String),
}

impl Variable {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Continuous,
            lower: 0.0,
            upper: None,
        }
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Binary,
            lower: 0.0,
            upper: Some(1.0),
        }
    }

    pub fn is_integer(&self) -> bool {
        self.kind == VariableKind::Binary
    }
}

impl LpProblem {
    pub fn new(variables: Vec<Variable>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    /// Tighten the upper bound of a variable
    pub fn set_upper(&mut self, var: usize, upper: f64) {
        let v = &mut self.variables[var];
        v.upper = Some(v.upper.map_or(upper, |u| u.min(upper)));
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Evaluate the objective at the given point
    pub fn objective_at(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Check dimensions and bounds before handing the problem to a backend
    pub fn validate(&self) -> Result<(), ProblemError> {
        let n = self.num_variables();
        if self.objective.coefficients.len() != n {
            return Err(ProblemError::ObjectiveLength {
                expected: n,
                found: self.objective.coefficients.len(),
            });
        }
        if self.objective.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ProblemError::NonFinite("objective".to_string()));
        }

        for v in &self.variables {
            if !v.lower.is_finite() || v.upper.is_some_and(|u| !u.is_finite()) {
                return Err(ProblemError::NonFinite(v.name.clone()));
            }
            if v.upper.is_some_and(|u| u < v.lower) {
                return Err(ProblemError::EmptyDomain(v.name.clone()));
            }
        }

        for c in &self.constraints {
            if c.coefficients.len() != n {
                return Err(ProblemError::ConstraintLength {
                    name: c.name.clone(),
                    expected: n,
                    found: c.coefficients.len(),
                });
            }
            if !c.rhs.is_finite() || c.coefficients.iter().any(|a| !a.is_finite()) {
                return Err(ProblemError::NonFinite(c.name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_short_rows() {
        let mut problem = LpProblem::new(vec![Variable::binary("a"), Variable::binary("b")]);
        problem.set_objective(vec![1.0, 1.0], false);
        problem.add_constraint("short", vec![1.0], ConstraintOp::Le, 1.0);

        let err = problem.validate().unwrap_err();
        assert_eq!(
            err,
            ProblemError::ConstraintLength {
                name: "short".to_string(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_set_upper_only_tightens() {
        let mut problem = LpProblem::new(vec![Variable::binary("a"), Variable::continuous("b")]);
        problem.set_upper(0, 0.0);
        problem.set_upper(0, 1.0);
        problem.set_upper(1, 7.5);

        assert_eq!(problem.variables[0].upper, Some(0.0));
        assert_eq!(problem.variables[1].upper, Some(7.5));
        assert!(problem.validate().is_ok());
    }
}
