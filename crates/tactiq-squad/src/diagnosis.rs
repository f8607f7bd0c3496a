use std::fmt;

use serde::{Deserialize, Serialize};

use crate::formation::{CostBudget, Formation};
use crate::model::{ALL_ROUNDER_FLOOR, ALL_ROUNDER_PAIRS};
use crate::player::Role;
use crate::roster::Roster;

/// Why an infeasible request cannot be met
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InfeasibilityReason {
    /// Fewer players can fill `roles` than the formation asks for
    RoleShortage {
        roles: Vec<Role>,
        requested: u64,
        available: usize,
    },
    /// The formation leaves too few slots for the flexible-player floor
    FloorShortage {
        roles: (Role, Role),
        minimum: u32,
        slots: u64,
    },
    /// Even the cheapest squad of the requested size is over budget
    BudgetTooTight { budget: f64, minimum_cost: f64 },
    /// The constraints conflict in a way the checks above don't isolate
    Solver,
}

impl fmt::Display for InfeasibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfeasibilityReason::RoleShortage {
                roles,
                requested,
                available,
            } => {
                let names: Vec<&str> = roles.iter().map(|r| r.label()).collect();
                write!(
                    f,
                    "Requested {} {} but only {} eligible players",
                    requested,
                    names.join("/"),
                    available
                )
            }
            InfeasibilityReason::FloorShortage { roles, minimum, slots } => write!(
                f,
                "At least {} {}-{} all-rounders must be selected but the formation leaves only {} slots they can fill",
                minimum,
                roles.0.label(),
                roles.1.label(),
                slots
            ),
            InfeasibilityReason::BudgetTooTight { budget, minimum_cost } => write!(
                f,
                "Budget of {:.2} is below the cheapest possible squad cost of {:.2}",
                budget, minimum_cost
            ),
            InfeasibilityReason::Solver => f.write_str("No squad satisfies all constraints together"),
        }
    }
}

/// Outfield role groups, singles first
const ROLE_GROUPS: [&[Role]; 7] = [
    &[Role::Defender],
    &[Role::Midfielder],
    &[Role::Forward],
    &[Role::Defender, Role::Midfielder],
    &[Role::Defender, Role::Forward],
    &[Role::Midfielder, Role::Forward],
    &[Role::Defender, Role::Midfielder, Role::Forward],
];

/// Explain an infeasible status with the first failing necessary condition
pub fn diagnose(roster: &Roster<'_>, formation: &Formation, budget: Option<CostBudget>) -> InfeasibilityReason {
    // Every group of roles needs at least as many candidates as slots
    for roles in ROLE_GROUPS {
        let requested: u64 = roles.iter().map(|&r| u64::from(formation.count(r))).sum();
        let available = roster.count_eligible_any(roles);
        if requested > available as u64 {
            return InfeasibilityReason::RoleShortage {
                roles: roles.to_vec(),
                requested,
                available,
            };
        }
    }

    for roles in ALL_ROUNDER_PAIRS {
        let flexible = roster.covering(roles.0, roles.1);
        let minimum = ALL_ROUNDER_FLOOR.min(flexible.len() as u32);
        let slots: u64 = Role::OUTFIELD
            .into_iter()
            .filter(|&r| flexible.iter().any(|&i| roster.players()[i].can_play(r)))
            .map(|r| u64::from(formation.count(r)))
            .sum();
        if slots < u64::from(minimum) {
            return InfeasibilityReason::FloorShortage { roles, minimum, slots };
        }
    }

    if let Some(budget) = budget {
        let minimum_cost = cheapest_squad_cost(roster, formation);
        if !budget.allows(minimum_cost) {
            return InfeasibilityReason::BudgetTooTight {
                budget: budget.limit(),
                minimum_cost,
            };
        }
    }

    InfeasibilityReason::Solver
}

/// Cheapest goalkeeper plus the cheapest outfield players, ignoring roles
fn cheapest_squad_cost(roster: &Roster<'_>, formation: &Formation) -> f64 {
    let keeper = roster
        .players()
        .iter()
        .filter(|p| p.can_play(Role::Goalkeeper))
        .map(|p| p.cost)
        .fold(f64::INFINITY, f64::min);

    let mut outfield: Vec<f64> = roster
        .players()
        .iter()
        .filter(|p| !p.can_play(Role::Goalkeeper))
        .map(|p| p.cost)
        .collect();
    outfield.sort_by(f64::total_cmp);

    let needed = usize::try_from(formation.squad_size() - u64::from(Formation::GOALKEEPERS)).unwrap_or(usize::MAX);
    keeper + outfield.iter().take(needed).sum::<f64>()
}
