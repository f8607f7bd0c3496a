use std::time::Instant;

use tactiq_solver::{Backend, BranchAndBound, SolutionStatus};
use tracing::{debug, warn};

use crate::config::OptimizerConfig;
use crate::diagnosis::diagnose;
use crate::error::SquadError;
use crate::formation::{CostBudget, Formation};
use crate::model::{ModelBuilder, SquadModel};
use crate::outcome::{SelectedPlayer, SelectionOutcome};
use crate::player::{Player, Role};
use crate::roster::{self, Roster};

/// Squad optimizer over a swappable MILP backend
///
/// Holds no per-request state; one instance can serve concurrent requests.
pub struct Optimizer {
    config: OptimizerConfig,
    backend: Box<dyn Backend>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        let backend: BranchAndBound = config.solver.backend();
        Self {
            config,
            backend: Box::new(backend),
        }
    }

    pub fn with_backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Select the best squad of `formation` from the players of `team_id`
    ///
    /// A budget that is absent or not positive leaves cost unconstrained.
    pub fn optimize(
        &self,
        players: &[Player],
        team_id: u32,
        formation: Formation,
        cost_budget: Option<f64>,
    ) -> Result<SelectionOutcome, SquadError> {
        let roster = roster::filter(players, team_id)?;
        self.optimize_roster(&roster, formation, CostBudget::new(cost_budget))
    }

    /// Same as [`Optimizer::optimize`] on an already filtered roster
    pub fn optimize_roster(
        &self,
        roster: &Roster<'_>,
        formation: Formation,
        budget: Option<CostBudget>,
    ) -> Result<SelectionOutcome, SquadError> {
        let model = ModelBuilder::new(roster, self.config.weights)
            .eligibility()
            .formation(&formation)
            .budget(budget)
            .all_rounder_floors()
            .build();

        let started = Instant::now();
        let solution = self.backend.solve(model.problem())?;
        debug!(
            backend = self.backend.name(),
            team_id = roster.team_id(),
            %formation,
            status = %solution.status,
            nodes = solution.stats.nodes,
            lp_iterations = solution.stats.lp_iterations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solved selection model"
        );

        let mut outcome = SelectionOutcome {
            team_id: roster.team_id(),
            formation,
            budget,
            roster: Vec::new(),
            status: solution.status,
            objective: f64::NAN,
            reason: None,
        };

        match solution.status {
            SolutionStatus::Optimal => match self.extract(roster, &model, &formation, &solution.values) {
                Some(selected) => {
                    outcome.objective = self.objective_of(&selected);
                    let drift = (outcome.objective - solution.objective_value).abs();
                    if drift > 1e-6 * (1.0 + outcome.objective.abs()) {
                        warn!(
                            reported = solution.objective_value,
                            recomputed = outcome.objective,
                            "backend objective differs from roster objective"
                        );
                    }
                    outcome.roster = selected;
                }
                None => outcome.status = SolutionStatus::Undefined,
            },
            SolutionStatus::Infeasible => {
                let reason = diagnose(roster, &formation, budget);
                debug!(team_id = roster.team_id(), %reason, "selection infeasible");
                outcome.reason = Some(reason);
            }
            SolutionStatus::Unbounded | SolutionStatus::Undefined | SolutionStatus::NotSolved => {
                warn!(team_id = roster.team_id(), status = %solution.status, "no squad selected");
            }
        }

        Ok(outcome)
    }

    /// Read the roster from an optimal point, or `None` if the point does
    /// not describe a complete squad of the requested shape
    fn extract(
        &self,
        roster: &Roster<'_>,
        model: &SquadModel,
        formation: &Formation,
        values: &[f64],
    ) -> Option<Vec<SelectedPlayer>> {
        if values.len() != model.problem().num_variables() {
            warn!(
                values = values.len(),
                variables = model.problem().num_variables(),
                "solution does not cover every model variable"
            );
            return None;
        }

        let mut selected = Vec::with_capacity(model.n_players());
        for (i, role) in model.selections(values) {
            let player = roster.players()[i];
            let Some(role) = role.filter(|&r| player.can_play(r)) else {
                warn!(player = %player.name, "selected player has no eligible role in solution");
                return None;
            };
            selected.push(SelectedPlayer {
                name: player.name.clone(),
                team_name: player.team_name.clone(),
                position: player.position,
                role,
                rating: player.rating,
                cost: player.cost,
            });
        }

        for role in Role::ALL {
            let count = selected.iter().filter(|p| p.role == role).count();
            if count != formation.count(role) as usize {
                warn!(%role, count, wanted = formation.count(role), "solution breaks formation");
                return None;
            }
        }

        Some(selected)
    }

    fn objective_of(&self, selected: &[SelectedPlayer]) -> f64 {
        selected
            .iter()
            .map(|p| self.config.weights.score(p.rating, p.cost))
            .sum()
    }
}

/// Optimize with the default configuration and backend
pub fn optimize(
    players: &[Player],
    team_id: u32,
    formation: Formation,
    cost_budget: Option<f64>,
) -> Result<SelectionOutcome, SquadError> {
    Optimizer::default().optimize(players, team_id, formation, cost_budget)
}
