use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tactical role a selected player occupies on the pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Defender,
    Midfielder,
    Forward,
    Goalkeeper,
}

impl Role {
    /// All roles, in model order
    pub const ALL: [Role; 4] = [Role::Defender, Role::Midfielder, Role::Forward, Role::Goalkeeper];

    /// Outfield roles, whose counts come from the formation request
    pub const OUTFIELD: [Role; 3] = [Role::Defender, Role::Midfielder, Role::Forward];

    pub fn index(self) -> usize {
        match self {
            Role::Defender => 0,
            Role::Midfielder => 1,
            Role::Forward => 2,
            Role::Goalkeeper => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Defender => "Defender",
            Role::Midfielder => "Midfielder",
            Role::Forward => "Forward",
            Role::Goalkeeper => "Goalkeeper",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position category recorded for a player in the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionCategory {
    Forward,
    Midfielder,
    Defender,
    Goalkeeper,
    ForwardMidfielder,
    MidfielderDefender,
    Universal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown position category: {0}")]
pub struct ParsePositionError(pub String);

impl PositionCategory {
    pub const ALL: [PositionCategory; 7] = [
        PositionCategory::Forward,
        PositionCategory::Midfielder,
        PositionCategory::Defender,
        PositionCategory::Goalkeeper,
        PositionCategory::ForwardMidfielder,
        PositionCategory::MidfielderDefender,
        PositionCategory::Universal,
    ];

    /// Roles a player of this category may be assigned
    pub fn eligible_roles(self) -> &'static [Role] {
        match self {
            PositionCategory::Forward => &[Role::Forward],
            PositionCategory::Midfielder => &[Role::Midfielder],
            PositionCategory::Defender => &[Role::Defender],
            PositionCategory::Goalkeeper => &[Role::Goalkeeper],
            PositionCategory::ForwardMidfielder => &[Role::Forward, Role::Midfielder],
            PositionCategory::MidfielderDefender => &[Role::Midfielder, Role::Defender],
            PositionCategory::Universal => &[Role::Forward, Role::Midfielder, Role::Defender],
        }
    }

    pub fn is_eligible(self, role: Role) -> bool {
        self.eligible_roles().contains(&role)
    }

    /// Eligible for both roles of the pair
    pub fn covers(self, a: Role, b: Role) -> bool {
        self.is_eligible(a) && self.is_eligible(b)
    }

    pub fn is_all_rounder(self) -> bool {
        self.eligible_roles().len() > 1
    }

    /// Label used in the roster data
    pub fn label(self) -> &'static str {
        match self {
            PositionCategory::Forward => "Forward",
            PositionCategory::Midfielder => "Midfielder",
            PositionCategory::Defender => "Defender",
            PositionCategory::Goalkeeper => "Goalkeeper",
            PositionCategory::ForwardMidfielder => "Forward-Mid All-rounder",
            PositionCategory::MidfielderDefender => "Mid-Back All-rounder",
            PositionCategory::Universal => "All All-rounder",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            PositionCategory::ForwardMidfielder => "Forward-Midfielder All-rounder",
            PositionCategory::MidfielderDefender => "Midfielder-Defender All-rounder",
            PositionCategory::Universal => "Universal All-rounder",
            other => other.label(),
        }
    }
}

impl fmt::Display for PositionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PositionCategory {
    type Err = ParsePositionError;

    /// Accepts the roster labels and the long display names, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PositionCategory::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(wanted) || p.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParsePositionError(s.to_string()))
    }
}

/// One row of the candidate pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub team_id: u32,
    pub name: String,
    pub team_name: String,
    pub position: PositionCategory,
    /// Higher is better
    pub rating: f64,
    /// Training burden; lower is better
    pub cost: f64,
}

impl Player {
    pub fn new(id: u32, team_id: u32, name: impl Into<String>, position: PositionCategory, rating: f64, cost: f64) -> Self {
        Self {
            id,
            team_id,
            name: name.into(),
            team_name: String::new(),
            position,
            rating,
            cost,
        }
    }

    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = team_name.into();
        self
    }

    pub fn can_play(&self, role: Role) -> bool {
        self.position.is_eligible(role)
    }
}
