pub mod config;
pub mod diagnosis;
pub mod error;
pub mod formation;
pub mod model;
pub mod optimizer;
pub mod outcome;
pub mod player;
pub mod roster;

pub use config::{ConfigError, OptimizerConfig, SolverSettings, Weights};
pub use diagnosis::{InfeasibilityReason, diagnose};
pub use error::SquadError;
pub use formation::{CostBudget, Formation, ParseFormationError};
pub use model::{ModelBuilder, SquadConstraint, SquadModel};
pub use optimizer::{Optimizer, optimize};
pub use outcome::{SelectedPlayer, SelectionOutcome, SquadSummary};
pub use player::{ParsePositionError, Player, PositionCategory, Role};
pub use roster::{Roster, filter};
pub use tactiq_solver::SolutionStatus;
