use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::Role;

/// Requested squad shape; the goalkeeper count is always one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Formation {
    pub defenders: u32,
    pub midfielders: u32,
    pub forwards: u32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid formation '{0}', expected defenders-midfielders-forwards such as 4-4-2")]
pub struct ParseFormationError(pub String);

impl Formation {
    pub const GOALKEEPERS: u32 = 1;

    pub fn new(defenders: u32, midfielders: u32, forwards: u32) -> Self {
        Self {
            defenders,
            midfielders,
            forwards,
        }
    }

    /// Required number of players in the role
    pub fn count(&self, role: Role) -> u32 {
        match role {
            Role::Defender => self.defenders,
            Role::Midfielder => self.midfielders,
            Role::Forward => self.forwards,
            Role::Goalkeeper => Self::GOALKEEPERS,
        }
    }

    /// Total players requested, widened so any role counts fit
    pub fn squad_size(&self) -> u64 {
        u64::from(self.defenders) + u64::from(self.midfielders) + u64::from(self.forwards) + u64::from(Self::GOALKEEPERS)
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.defenders, self.midfielders, self.forwards)
    }
}

impl FromStr for Formation {
    type Err = ParseFormationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFormationError(s.to_string());
        let counts = s
            .trim()
            .split('-')
            .map(|part| part.trim().parse::<u32>().map_err(|_| err()))
            .collect::<Result<Vec<_>, _>>()?;

        match counts[..] {
            [defenders, midfielders, forwards] => Ok(Self::new(defenders, midfielders, forwards)),
            _ => Err(err()),
        }
    }
}

/// Upper bound on the summed cost of the selected squad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBudget(f64);

impl CostBudget {
    /// Absent, non-positive and non-finite limits mean unconstrained
    pub fn new(limit: Option<f64>) -> Option<Self> {
        limit.filter(|l| l.is_finite() && *l > 0.0).map(Self)
    }

    pub fn limit(self) -> f64 {
        self.0
    }

    pub fn allows(self, cost: f64) -> bool {
        cost <= self.0 + 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_size() {
        let formation = Formation::new(4, 4, 2);
        assert_eq!(formation.count(Role::Defender), 4);
        assert_eq!(formation.count(Role::Forward), 2);
        assert_eq!(formation.count(Role::Goalkeeper), 1);
        assert_eq!(formation.squad_size(), 11);
        assert_eq!(Formation::new(u32::MAX, u32::MAX, 1).squad_size(), 2 * u64::from(u32::MAX) + 2);
    }

    #[test]
    fn test_parse_and_display() {
        let formation: Formation = "3-5-2".parse().unwrap();
        assert_eq!(formation, Formation::new(3, 5, 2));
        assert_eq!(formation.to_string(), "3-5-2");
        assert_eq!(" 4 - 3 - 3 ".parse(), Ok(Formation::new(4, 3, 3)));

        assert!("4-4".parse::<Formation>().is_err());
        assert!("4-4-2-1".parse::<Formation>().is_err());
        assert!("4-x-2".parse::<Formation>().is_err());
        assert!("4--2".parse::<Formation>().is_err());
    }

    #[test]
    fn test_budget_unconstrained_when_not_positive() {
        assert_eq!(CostBudget::new(None), None);
        assert_eq!(CostBudget::new(Some(0.0)), None);
        assert_eq!(CostBudget::new(Some(-3.0)), None);
        assert_eq!(CostBudget::new(Some(f64::NAN)), None);

        let budget = CostBudget::new(Some(40.0)).unwrap();
        assert_eq!(budget.limit(), 40.0);
        assert!(budget.allows(40.0));
        assert!(!budget.allows(40.5));
    }
}
