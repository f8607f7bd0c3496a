use tactiq_solver::ProblemError;
use thiserror::Error;

/// Preconditions that fail before any solver work
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SquadError {
    #[error("No players found for team {team_id}")]
    EmptyTeam { team_id: u32 },
    #[error("Team {team_id} has no eligible Goalkeeper")]
    NoGoalkeeper { team_id: u32 },
    #[error("Invalid model: {0}")]
    Model(#[from] ProblemError),
}
