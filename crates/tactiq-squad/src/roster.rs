use tracing::debug;

use crate::error::SquadError;
use crate::player::{Player, Role};

/// Eligible subset of the candidate pool for one team, in pool order
#[derive(Debug, Clone)]
pub struct Roster<'a> {
    team_id: u32,
    players: Vec<&'a Player>,
}

/// Select the players of `team_id` and check the preconditions the model
/// cannot express as a useful error on its own.
pub fn filter(players: &[Player], team_id: u32) -> Result<Roster<'_>, SquadError> {
    let selected: Vec<&Player> = players.iter().filter(|p| p.team_id == team_id).collect();

    if selected.is_empty() {
        return Err(SquadError::EmptyTeam { team_id });
    }
    if !selected.iter().any(|p| p.can_play(Role::Goalkeeper)) {
        return Err(SquadError::NoGoalkeeper { team_id });
    }

    debug!(team_id, eligible = selected.len(), pool = players.len(), "filtered roster");

    Ok(Roster {
        team_id,
        players: selected,
    })
}

impl<'a> Roster<'a> {
    pub fn team_id(&self) -> u32 {
        self.team_id
    }

    pub fn players(&self) -> &[&'a Player] {
        &self.players
    }

    /// Players eligible for at least one of `roles`
    pub fn count_eligible_any(&self, roles: &[Role]) -> usize {
        self.players
            .iter()
            .filter(|p| roles.iter().any(|&r| p.can_play(r)))
            .count()
    }

    /// Indices of players eligible for both roles
    pub fn covering(&self, a: Role, b: Role) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.position.covers(a, b))
            .map(|(i, _)| i)
            .collect()
    }
}
