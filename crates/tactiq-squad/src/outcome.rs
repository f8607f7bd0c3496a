use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tactiq_solver::SolutionStatus;

use crate::diagnosis::InfeasibilityReason;
use crate::formation::{CostBudget, Formation};
use crate::player::{PositionCategory, Role};

/// A chosen player and the role assigned to them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPlayer {
    pub name: String,
    pub team_name: String,
    pub position: PositionCategory,
    pub role: Role,
    pub rating: f64,
    pub cost: f64,
}

/// Result of one optimization request
///
/// The roster is empty unless the status is optimal; callers should branch
/// on `status` rather than on the roster length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub team_id: u32,
    pub formation: Formation,
    pub budget: Option<CostBudget>,
    pub roster: Vec<SelectedPlayer>,
    pub status: SolutionStatus,
    /// Weighted rating-minus-cost of the roster; NaN without a roster
    pub objective: f64,
    /// Set when the status is infeasible
    pub reason: Option<InfeasibilityReason>,
}

/// Flat digest of an outcome for tables and assistant context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadSummary {
    pub total_players: usize,
    pub total_rating: f64,
    pub total_cost: f64,
    pub formation: String,
    pub status: String,
    pub objective: f64,
    pub budget: Option<f64>,
    pub budget_met: Option<bool>,
    pub players: Vec<SelectedPlayer>,
}

impl SelectionOutcome {
    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    pub fn total_rating(&self) -> f64 {
        self.roster.iter().map(|p| p.rating).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.roster.iter().map(|p| p.cost).sum()
    }

    /// Number of selected players per assigned role
    pub fn role_counts(&self) -> BTreeMap<Role, u32> {
        let mut counts = BTreeMap::new();
        for p in &self.roster {
            *counts.entry(p.role).or_insert(0) += 1;
        }
        counts
    }

    /// Players holding `role`, highest rated first
    pub fn players_in(&self, role: Role) -> Vec<&SelectedPlayer> {
        let mut players: Vec<&SelectedPlayer> = self.roster.iter().filter(|p| p.role == role).collect();
        players.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        players
    }

    pub fn summary(&self) -> SquadSummary {
        let total_cost = self.total_cost();
        SquadSummary {
            total_players: self.roster.len(),
            total_rating: self.total_rating(),
            total_cost,
            formation: self.formation.to_string(),
            status: self.status.to_string(),
            objective: self.objective,
            budget: self.budget.map(CostBudget::limit),
            budget_met: self.budget.map(|b| b.allows(total_cost)),
            players: self.roster.clone(),
        }
    }
}

impl SquadSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(name: &str, role: Role, rating: f64, cost: f64) -> SelectedPlayer {
        SelectedPlayer {
            name: name.to_string(),
            team_name: "Rovers".to_string(),
            position: PositionCategory::Universal,
            role,
            rating,
            cost,
        }
    }

    fn outcome() -> SelectionOutcome {
        SelectionOutcome {
            team_id: 7,
            formation: Formation::new(1, 1, 0),
            budget: CostBudget::new(Some(12.0)),
            roster: vec![
                selected("A", Role::Goalkeeper, 70.0, 4.0),
                selected("B", Role::Defender, 65.0, 3.0),
                selected("C", Role::Midfielder, 75.0, 6.0),
            ],
            status: SolutionStatus::Optimal,
            objective: 197.7,
            reason: None,
        }
    }

    #[test]
    fn test_role_counts() {
        let counts = outcome().role_counts();
        assert_eq!(counts.get(&Role::Goalkeeper), Some(&1));
        assert_eq!(counts.get(&Role::Defender), Some(&1));
        assert_eq!(counts.get(&Role::Forward), None);
    }

    #[test]
    fn test_summary_reports_budget() {
        let summary = outcome().summary();
        assert_eq!(summary.total_players, 3);
        assert_eq!(summary.total_rating, 210.0);
        assert_eq!(summary.total_cost, 13.0);
        assert_eq!(summary.formation, "1-1-0");
        assert_eq!(summary.status, "Optimal");
        assert_eq!(summary.budget_met, Some(false));
    }

    #[test]
    fn test_summary_json() {
        let json = outcome().summary().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["formation"], "1-1-0");
        assert_eq!(value["players"][2]["role"], "Midfielder");
        assert_eq!(value["budget"], 12.0);
    }
}
