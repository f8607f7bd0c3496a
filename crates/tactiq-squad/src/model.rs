//! Selection model construction.
//!
//! Variables, per eligible player `i` (in roster order):
//! - `select[i]`: player is in the squad
//! - `assign[i][r]`: player occupies role `r`
//!
//! Constraints are accumulated as typed [`SquadConstraint`] values and
//! lowered to a solver problem in one step by [`ModelBuilder::build`].

use tactiq_solver::{ConstraintOp, LpProblem, Variable};
use tracing::debug;

use crate::config::Weights;
use crate::formation::{CostBudget, Formation};
use crate::player::{Player, Role};
use crate::roster::Roster;

/// Role pairs that get a minimum number of flexible players
pub const ALL_ROUNDER_PAIRS: [(Role, Role); 2] = [(Role::Midfielder, Role::Defender), (Role::Forward, Role::Midfielder)];

/// Highest all-rounder floor requested per pair
pub const ALL_ROUNDER_FLOOR: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum SquadConstraint {
    /// `assign[player][role] <= select[player]`
    RoleEligibility { player: usize, role: Role },
    /// `assign[player][role] = 0`
    RoleExcluded { player: usize, role: Role },
    /// `sum_r assign[player][r] = select[player]`
    SingleRole { player: usize },
    /// `sum_i assign[i][role] = count`
    FormationCount { role: Role, count: u32 },
    /// `sum_i select[i] = size`
    SquadSize { size: u64 },
    /// `sum_i cost[i] * select[i] <= limit`
    Budget { limit: f64 },
    /// `sum_{i in players} select[i] >= minimum`
    AllRounderFloor {
        roles: (Role, Role),
        players: Vec<usize>,
        minimum: u32,
    },
}

/// Immutable accumulator of selection constraints
#[derive(Debug, Clone)]
pub struct ModelBuilder<'a> {
    players: Vec<&'a Player>,
    weights: Weights,
    constraints: Vec<SquadConstraint>,
}

/// Lowered problem plus the variable layout needed to read a solution
#[derive(Debug, Clone)]
pub struct SquadModel {
    problem: LpProblem,
    n_players: usize,
    constraints: Vec<SquadConstraint>,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(roster: &Roster<'a>, weights: Weights) -> Self {
        Self {
            players: roster.players().to_vec(),
            weights,
            constraints: Vec::new(),
        }
    }

    pub fn constrain(mut self, constraint: SquadConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Role eligibility and single-role constraints for every player
    pub fn eligibility(self) -> Self {
        let mut builder = self;
        for i in 0..builder.players.len() {
            let position = builder.players[i].position;
            for role in Role::ALL {
                builder = if position.is_eligible(role) {
                    builder.constrain(SquadConstraint::RoleEligibility { player: i, role })
                } else {
                    builder.constrain(SquadConstraint::RoleExcluded { player: i, role })
                };
            }
            builder = builder.constrain(SquadConstraint::SingleRole { player: i });
        }
        builder
    }

    /// Exact per-role counts and the matching squad size
    pub fn formation(self, formation: &Formation) -> Self {
        let mut builder = self;
        for role in Role::ALL {
            builder = builder.constrain(SquadConstraint::FormationCount {
                role,
                count: formation.count(role),
            });
        }
        builder.constrain(SquadConstraint::SquadSize {
            size: formation.squad_size(),
        })
    }

    pub fn budget(self, budget: Option<CostBudget>) -> Self {
        match budget {
            Some(b) => self.constrain(SquadConstraint::Budget { limit: b.limit() }),
            None => self,
        }
    }

    /// Floors of 1 and then 2 flexible players per pair, each added only
    /// when the roster holds enough of them
    pub fn all_rounder_floors(self) -> Self {
        let mut builder = self;
        for roles in ALL_ROUNDER_PAIRS {
            let flexible: Vec<usize> = builder
                .players
                .iter()
                .enumerate()
                .filter(|(_, p)| p.position.covers(roles.0, roles.1))
                .map(|(i, _)| i)
                .collect();

            let cap = ALL_ROUNDER_FLOOR.min(flexible.len() as u32);
            for minimum in 1..=cap {
                builder = builder.constrain(SquadConstraint::AllRounderFloor {
                    roles,
                    players: flexible.clone(),
                    minimum,
                });
            }
        }
        builder
    }

    pub fn constraints(&self) -> &[SquadConstraint] {
        &self.constraints
    }

    pub fn build(self) -> SquadModel {
        let n = self.players.len();
        let layout = Layout { n_players: n };

        let mut variables = Vec::with_capacity(layout.len());
        for p in &self.players {
            variables.push(Variable::binary(format!("select_{}", p.id)));
        }
        for p in &self.players {
            for role in Role::ALL {
                variables.push(Variable::binary(format!("assign_{}_{}", p.id, role.label())));
            }
        }

        let mut problem = LpProblem::new(variables);
        let mut objective = vec![0.0; layout.len()];
        for (i, p) in self.players.iter().enumerate() {
            objective[layout.select(i)] = self.weights.score(p.rating, p.cost);
        }
        problem.set_objective(objective, false);

        for constraint in &self.constraints {
            self.lower(&mut problem, &layout, constraint);
        }

        debug!(
            players = n,
            variables = problem.num_variables(),
            rows = problem.num_constraints(),
            "built selection model"
        );

        SquadModel {
            problem,
            n_players: n,
            constraints: self.constraints,
        }
    }

    fn lower(&self, problem: &mut LpProblem, layout: &Layout, constraint: &SquadConstraint) {
        let mut row = vec![0.0; layout.len()];
        match constraint {
            SquadConstraint::RoleEligibility { player, role } => {
                row[layout.assign(*player, *role)] = 1.0;
                row[layout.select(*player)] = -1.0;
                problem.add_constraint(format!("eligible_{}_{}", player, role.label()), row, ConstraintOp::Le, 0.0);
            }
            SquadConstraint::RoleExcluded { player, role } => {
                problem.set_upper(layout.assign(*player, *role), 0.0);
            }
            SquadConstraint::SingleRole { player } => {
                for role in Role::ALL {
                    row[layout.assign(*player, role)] = 1.0;
                }
                row[layout.select(*player)] = -1.0;
                problem.add_constraint(format!("single_role_{}", player), row, ConstraintOp::Eq, 0.0);
            }
            SquadConstraint::FormationCount { role, count } => {
                for i in 0..layout.n_players {
                    row[layout.assign(i, *role)] = 1.0;
                }
                problem.add_constraint(format!("formation_{}", role.label()), row, ConstraintOp::Eq, f64::from(*count));
            }
            SquadConstraint::SquadSize { size } => {
                for i in 0..layout.n_players {
                    row[layout.select(i)] = 1.0;
                }
                problem.add_constraint("squad_size", row, ConstraintOp::Eq, *size as f64);
            }
            SquadConstraint::Budget { limit } => {
                for (i, p) in self.players.iter().enumerate() {
                    row[layout.select(i)] = p.cost;
                }
                problem.add_constraint("budget", row, ConstraintOp::Le, *limit);
            }
            SquadConstraint::AllRounderFloor { roles, players, minimum } => {
                for &i in players {
                    row[layout.select(i)] = 1.0;
                }
                problem.add_constraint(
                    format!("floor_{}_{}_{}", roles.0.label(), roles.1.label(), minimum),
                    row,
                    ConstraintOp::Ge,
                    f64::from(*minimum),
                );
            }
        }
    }
}

impl SquadModel {
    pub fn problem(&self) -> &LpProblem {
        &self.problem
    }

    pub fn constraints(&self) -> &[SquadConstraint] {
        &self.constraints
    }

    pub fn n_players(&self) -> usize {
        self.n_players
    }

    pub fn select_var(&self, player: usize) -> usize {
        Layout { n_players: self.n_players }.select(player)
    }

    pub fn assign_var(&self, player: usize, role: Role) -> usize {
        Layout { n_players: self.n_players }.assign(player, role)
    }

    /// Players with `select = 1` and the single role they hold
    pub fn selections(&self, values: &[f64]) -> Vec<(usize, Option<Role>)> {
        (0..self.n_players)
            .filter(|&i| values[self.select_var(i)] > 0.5)
            .map(|i| {
                let role = Role::ALL
                    .into_iter()
                    .find(|&r| values[self.assign_var(i, r)] > 0.5);
                (i, role)
            })
            .collect()
    }
}

/// Select variables first, then four assignment variables per player
#[derive(Clone, Copy)]
struct Layout {
    n_players: usize,
}

impl Layout {
    fn len(&self) -> usize {
        self.n_players * (1 + Role::ALL.len())
    }

    fn select(&self, player: usize) -> usize {
        player
    }

    fn assign(&self, player: usize, role: Role) -> usize {
        self.n_players + player * Role::ALL.len() + role.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PositionCategory;
    use crate::roster;

    fn pool() -> Vec<Player> {
        vec![
            Player::new(1, 1, "Keeper", PositionCategory::Goalkeeper, 70.0, 5.0),
            Player::new(2, 1, "Back", PositionCategory::Defender, 65.0, 4.0),
            Player::new(3, 1, "Pivot", PositionCategory::MidfielderDefender, 68.0, 6.0),
            Player::new(4, 1, "Ten", PositionCategory::ForwardMidfielder, 71.0, 8.0),
            Player::new(5, 1, "Engine", PositionCategory::Universal, 72.0, 7.0),
        ]
    }

    #[test]
    fn test_squad_size_row_for_wide_formation() {
        let pool = pool();
        let roster = roster::filter(&pool, 1).unwrap();
        let model = ModelBuilder::new(&roster, Weights::default())
            .formation(&Formation::new(u32::MAX, u32::MAX, 0))
            .build();

        assert!(model.constraints().contains(&SquadConstraint::SquadSize {
            size: 2 * u64::from(u32::MAX) + 1
        }));
        let size_row = model
            .problem()
            .constraints
            .iter()
            .find(|c| c.name == "squad_size")
            .unwrap();
        assert_eq!(size_row.rhs, 2.0 * f64::from(u32::MAX) + 1.0);
    }

    #[test]
    fn test_problem_serializes() {
        let pool = pool();
        let roster = roster::filter(&pool, 1).unwrap();
        let model = ModelBuilder::new(&roster, Weights::default())
            .eligibility()
            .formation(&Formation::new(1, 1, 1))
            .build();

        let value = serde_json::to_value(model.problem()).unwrap();
        assert_eq!(value["variables"][0]["name"], "select_1");
        assert_eq!(value["variables"][0]["kind"], "Binary");
        assert_eq!(value["objective"]["minimize"], false);
        assert_eq!(value["constraints"].as_array().unwrap().len(), model.problem().num_constraints());
    }

    #[test]
    fn test_eligibility_constraints() {
        let pool = pool();
        let roster = roster::filter(&pool, 1).unwrap();
        let builder = ModelBuilder::new(&roster, Weights::default()).eligibility();

        let excluded = builder
            .constraints()
            .iter()
            .filter(|c| matches!(c, SquadConstraint::RoleExcluded { .. }))
            .count();
        // 3 + 3 + 2 + 2 + 1 roles outside each player's category
        assert_eq!(excluded, 11);
        assert!(builder.constraints().contains(&SquadConstraint::RoleEligibility {
            player: 4,
            role: Role::Forward
        }));
        assert!(builder.constraints().contains(&SquadConstraint::RoleExcluded {
            player: 2,
            role: Role::Forward
        }));
    }

    #[test]
    fn test_floors_capped_by_availability() {
        let pool = pool();
        let roster = roster::filter(&pool, 1).unwrap();
        let builder = ModelBuilder::new(&roster, Weights::default()).all_rounder_floors();

        let floors: Vec<(Role, Role, u32, usize)> = builder
            .constraints()
            .iter()
            .filter_map(|c| match c {
                SquadConstraint::AllRounderFloor { roles, players, minimum } => {
                    Some((roles.0, roles.1, *minimum, players.len()))
                }
                _ => None,
            })
            .collect();

        assert_eq!(
            floors,
            vec![
                (Role::Midfielder, Role::Defender, 1, 2),
                (Role::Midfielder, Role::Defender, 2, 2),
                (Role::Forward, Role::Midfielder, 1, 2),
                (Role::Forward, Role::Midfielder, 2, 2),
            ]
        );
    }

    #[test]
    fn test_single_flexible_player_gets_floor_of_one() {
        let pool = vec![
            Player::new(1, 1, "Keeper", PositionCategory::Goalkeeper, 70.0, 5.0),
            Player::new(2, 1, "Pivot", PositionCategory::MidfielderDefender, 68.0, 6.0),
        ];
        let roster = roster::filter(&pool, 1).unwrap();
        let builder = ModelBuilder::new(&roster, Weights::default()).all_rounder_floors();

        assert_eq!(
            builder.constraints(),
            &[SquadConstraint::AllRounderFloor {
                roles: (Role::Midfielder, Role::Defender),
                players: vec![1],
                minimum: 1,
            }]
        );
    }

    #[test]
    fn test_budget_is_optional() {
        let pool = pool();
        let roster = roster::filter(&pool, 1).unwrap();

        let without = ModelBuilder::new(&roster, Weights::default()).budget(None);
        assert!(without.constraints().is_empty());

        let with = ModelBuilder::new(&roster, Weights::default()).budget(CostBudget::new(Some(30.0)));
        assert_eq!(with.constraints(), &[SquadConstraint::Budget { limit: 30.0 }]);
    }

    #[test]
    fn test_build_layout_and_objective() {
        let pool = pool();
        let roster = roster::filter(&pool, 1).unwrap();
        let model = ModelBuilder::new(&roster, Weights::default())
            .eligibility()
            .formation(&Formation::new(1, 1, 1))
            .build();

        let problem = model.problem();
        assert_eq!(problem.num_variables(), 25);
        // 9 eligibility rows, 5 single-role rows, 4 formation rows, 1 size row
        assert_eq!(problem.num_constraints(), 19);
        assert!(!problem.objective.minimize);
        assert!((problem.objective.coefficients[model.select_var(0)] - 69.5).abs() < 1e-12);
        assert_eq!(problem.objective.coefficients[model.assign_var(0, Role::Goalkeeper)], 0.0);

        // Excluded roles are bounded at zero instead of getting rows
        let gk_as_defender = &problem.variables[model.assign_var(0, Role::Defender)];
        assert_eq!(gk_as_defender.upper, Some(0.0));
        let gk_as_keeper = &problem.variables[model.assign_var(0, Role::Goalkeeper)];
        assert_eq!(gk_as_keeper.upper, Some(1.0));
    }

    #[test]
    fn test_selections_read_roles() {
        let pool = pool();
        let roster = roster::filter(&pool, 1).unwrap();
        let model = ModelBuilder::new(&roster, Weights::default()).build();

        let mut values = vec![0.0; model.problem().num_variables()];
        values[model.select_var(0)] = 1.0;
        values[model.assign_var(0, Role::Goalkeeper)] = 1.0;
        values[model.select_var(4)] = 1.0;
        values[model.assign_var(4, Role::Midfielder)] = 1.0;

        assert_eq!(
            model.selections(&values),
            vec![(0, Some(Role::Goalkeeper)), (4, Some(Role::Midfielder))]
        );
    }
}
