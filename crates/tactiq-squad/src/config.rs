//! Optimizer configuration.
//!
//! Defaults reproduce the standard selection: skill weight 1.0 against a
//! cost penalty of 0.1, with solver output suppressed. Any field may be
//! overridden from TOML:
//!
//! ```
//! use tactiq_squad::OptimizerConfig;
//!
//! let config = OptimizerConfig::from_toml_str(r#"
//!     [weights]
//!     cost = 0.25
//!
//!     [solver]
//!     max_nodes = 5000
//! "#).unwrap();
//!
//! assert_eq!(config.weights.skill, 1.0);
//! assert_eq!(config.weights.cost, 0.25);
//! assert_eq!(config.solver.max_nodes, 5000);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tactiq_solver::{BranchAndBound, Simplex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub weights: Weights,
    pub solver: SolverSettings,
}

/// Objective weights: maximize `skill * rating - cost * cost`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Weights {
    pub skill: f64,
    pub cost: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self { skill: 1.0, cost: 0.1 }
    }
}

impl Weights {
    pub fn score(&self, rating: f64, cost: f64) -> f64 {
        self.skill * rating - self.cost * cost
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Simplex pivots allowed per relaxation
    pub max_iterations: usize,
    /// Branch-and-bound nodes allowed per solve
    pub max_nodes: usize,
    /// Pivot and reduced-cost tolerance
    pub tolerance: f64,
    /// Residual allowed on artificials when proving LP feasibility
    pub feasibility_tolerance: f64,
    /// Distance from an integer still treated as integral
    pub integrality_tolerance: f64,
    /// Log solver progress at info level
    pub verbose: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            max_nodes: 100_000,
            tolerance: 1e-9,
            feasibility_tolerance: 1e-7,
            integrality_tolerance: 1e-6,
            verbose: false,
        }
    }
}

impl SolverSettings {
    /// Default backend configured from these settings
    pub fn backend(&self) -> BranchAndBound {
        let simplex = Simplex::new()
            .with_max_iterations(self.max_iterations)
            .with_tolerance(self.tolerance)
            .with_feasibility_tolerance(self.feasibility_tolerance);
        BranchAndBound::new()
            .with_simplex(simplex)
            .with_max_nodes(self.max_nodes)
            .with_integrality_tolerance(self.integrality_tolerance)
            .verbose(self.verbose)
    }
}

impl OptimizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file can't be read, isn't valid TOML, or holds
    /// values that fail [`OptimizerConfig::validate`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_weights(mut self, skill: f64, cost: f64) -> Self {
        self.weights = Weights { skill, cost };
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.solver.max_nodes = max_nodes;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.solver.verbose = verbose;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Weights { skill, cost } = self.weights;
        if !skill.is_finite() || skill <= 0.0 {
            return Err(ConfigError::Invalid(format!("skill weight must be positive, got {}", skill)));
        }
        if !cost.is_finite() || cost < 0.0 {
            return Err(ConfigError::Invalid(format!("cost weight must be non-negative, got {}", cost)));
        }
        let tolerances = [
            ("tolerance", self.solver.tolerance),
            ("feasibility_tolerance", self.solver.feasibility_tolerance),
            ("integrality_tolerance", self.solver.integrality_tolerance),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }
        // At one half every point counts as integral
        if self.solver.integrality_tolerance >= 0.5 {
            return Err(ConfigError::Invalid(format!(
                "integrality_tolerance must be below 0.5, got {}",
                self.solver.integrality_tolerance
            )));
        }
        if self.solver.max_nodes == 0 {
            return Err(ConfigError::Invalid("max_nodes must be at least 1".to_string()));
        }
        Ok(())
    }
}
