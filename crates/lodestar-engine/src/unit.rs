// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! One independent search run.
//!
//! A `SearchUnit` owns its model outright and mutates it in place; nothing
//! inside a run yields, blocks, or shares state. The loop is the adaptive
//! repair cycle:
//!
//! 1. decay the weak tabu list;
//! 2. pick the variable with the worst aggregated error (uniform among
//!    ties, frozen variables masked while at least one is free);
//! 3. score every candidate move of that variable by its predicted error
//!    delta, summed over the constraints it touches;
//! 4. keep the delta-minimal candidates, tie-broken by the objective's
//!    heuristics;
//! 5. commit, or escape: strictly worsening best candidates restart the
//!    search, plateaus are walked with a small restart probability, and a
//!    saturated tabu list triggers partial resets.
//!
//! The wall-clock budget and the cooperative stop flag are checked between
//! iterations only; an iteration in flight always completes.

use fixedbitset::FixedBitSet;
use lodestar_model::{error::SolverError, model::Model, variable::Variable};
use lodestar_search::{
    monitor::{RunMonitor, SearchCommand},
    options::{Options, ResolvedOptions},
    rng::SearchRng,
    stats::SearchStatistics,
};
use smallvec::{SmallVec, smallvec};
use tracing::trace;

use crate::{
    ERROR_EPSILON,
    neighborhood::{MoveShape, Neighborhood},
    tables::ErrorTables,
    tabu::WeakTabuList,
};

/// A single, sequential search run over an exclusively owned model.
pub struct SearchUnit {
    model: Model,
    tables: ErrorTables,
    tabu: WeakTabuList,
    neighborhood: Neighborhood,
    options: ResolvedOptions,
    rng: SearchRng,
    stats: SearchStatistics,

    best_sat_error: f64,
    best_opt_cost: f64,
    best_values: Vec<i32>,
    attempt_best_sat_error: f64,
    resets_since_restart: u32,
    started: bool,

    // Reusable scratch buffers for the hot loop.
    worst_scratch: Vec<usize>,
    affected_scratch: Vec<usize>,
    candidate_values: Vec<i32>,
    shortlist_values: Vec<i32>,
    shortlist_partners: Vec<usize>,
    counted: FixedBitSet,
}

impl SearchUnit {
    /// Sets up a unit over `model`.
    ///
    /// # Panics
    ///
    /// Panics if the model has no variables.
    pub fn new(model: Model, permutation: bool, options: &Options, rng: SearchRng) -> Self {
        assert!(
            !model.is_empty(),
            "called `SearchUnit::new` with a model that has no variables"
        );
        let resolved = options.resolve(model.len());
        let shape = if permutation {
            MoveShape::Permutation
        } else {
            MoveShape::Local
        };
        let neighborhood = Neighborhood::new(
            shape,
            resolved.plateau_restart_chance,
            resolved.number_start_samplings,
        );
        let tables = ErrorTables::build(&model);
        let tabu = WeakTabuList::new(
            model.len(),
            resolved.tabu_time_selected,
            resolved.tabu_time_local_min,
        );
        let counted = FixedBitSet::with_capacity(model.constraints.len());
        let best_values = model.values();

        Self {
            model,
            tables,
            tabu,
            neighborhood,
            options: resolved,
            rng,
            stats: SearchStatistics::default(),
            best_sat_error: f64::MAX,
            best_opt_cost: f64::MAX,
            best_values,
            attempt_best_sat_error: f64::MAX,
            resets_since_restart: 0,
            started: false,
            worst_scratch: Vec::new(),
            affected_scratch: Vec::new(),
            candidate_values: Vec::new(),
            shortlist_values: Vec::new(),
            shortlist_partners: Vec::new(),
            counted,
        }
    }

    /// Runs the search until the monitor terminates it or, for pure
    /// satisfaction problems, a solution is found.
    ///
    /// Returns `true` iff a zero-error assignment was reached. The model is
    /// left restored to the best assignment found.
    pub fn search(&mut self, monitor: &RunMonitor) -> Result<bool, SolverError> {
        self.restart()?;

        loop {
            if !matches!(monitor.search_command(), SearchCommand::Continue) {
                break;
            }
            if self.best_sat_error == 0.0 && !self.model.is_optimization() {
                break;
            }
            self.stats.on_iteration();

            let free_variables = self.tabu.decay();
            self.tables.refresh_non_tabu(&self.tabu);

            // A saturated tabu list means the search is circling: shake a
            // fraction of the variables loose, or restart outright once the
            // resets themselves stop helping.
            if self.tabu.frozen_count() >= self.options.reset_threshold as usize {
                if self.resets_since_restart >= self.options.restart_threshold {
                    self.restart()?;
                } else {
                    self.partial_reset()?;
                }
                continue;
            }

            self.tables
                .worst_variables(free_variables, &self.tabu, &mut self.worst_scratch);
            debug_assert!(
                !self.worst_scratch.is_empty(),
                "worst-variable pick produced no candidates"
            );
            let chosen = if self.worst_scratch.len() > 1 {
                *self.rng.pick(&self.worst_scratch)
            } else {
                self.worst_scratch[0]
            };

            match self.neighborhood.shape() {
                MoveShape::Local => self.local_step(chosen)?,
                MoveShape::Permutation => self.permutation_step(chosen)?,
            }

            self.tables.debug_check(&self.model);
        }

        self.stats.set_elapsed(monitor.budget().elapsed());
        self.model.restore(&self.best_values)?;
        Ok(self.best_sat_error == 0.0)
    }

    /// Best satisfaction error reached so far.
    #[inline(always)]
    pub fn best_sat_error(&self) -> f64 {
        self.best_sat_error
    }

    /// Best objective cost among zero-error assignments; `f64::MAX` until
    /// one is found.
    #[inline(always)]
    pub fn best_opt_cost(&self) -> f64 {
        self.best_opt_cost
    }

    /// Values of the best assignment found, by engine id.
    #[inline(always)]
    pub fn best_values(&self) -> &[i32] {
        &self.best_values
    }

    /// Statistics of this run.
    #[inline(always)]
    pub fn statistics(&self) -> &SearchStatistics {
        &self.stats
    }

    /// Whether the model carries a user objective.
    #[inline(always)]
    pub fn is_optimization(&self) -> bool {
        self.model.is_optimization()
    }

    /// The owned model.
    #[inline(always)]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Mutable access to the owned model.
    #[inline(always)]
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// Runs the objective's optimization post-process over the stored best
    /// cost and solution. Called once by the driver after the budget
    /// elapses on a satisfied optimization run.
    pub fn postprocess_optimization(&mut self) {
        self.model
            .objective
            .postprocess_optimization(&mut self.best_opt_cost, &mut self.best_values);
    }

    // ------------------------------------------------------------------
    // Moves
    // ------------------------------------------------------------------

    /// One single-variable step: enumerate the chosen variable's domain,
    /// score, tie-break, and apply the acceptance regime.
    fn local_step(&mut self, chosen: usize) -> Result<(), SolverError> {
        self.candidate_values.clear();
        self.candidate_values
            .extend_from_slice(self.model.variables[chosen].domain().values());
        self.affected_scratch.clear();
        self.affected_scratch
            .extend_from_slice(self.tables.constraints_of(chosen));

        let mut best_delta = f64::MAX;
        self.shortlist_values.clear();
        for candidate_index in 0..self.candidate_values.len() {
            let value = self.candidate_values[candidate_index];
            let mut delta = 0.0;
            for affected_index in 0..self.affected_scratch.len() {
                let c = self.affected_scratch[affected_index];
                let cell = &mut self.model.constraints[c];
                let position = cell.position_of(chosen);
                delta += cell.delta_error(&[(position, value)])?;
            }
            if delta < best_delta {
                best_delta = delta;
                self.shortlist_values.clear();
                self.shortlist_values.push(value);
            } else if delta == best_delta {
                self.shortlist_values.push(value);
            }
        }

        if best_delta > ERROR_EPSILON {
            self.stats.on_local_minimum();
            return self.restart();
        }

        let winner = if self.shortlist_values.len() > 1 {
            self.model
                .objective
                .heuristic_value(chosen, &self.shortlist_values, &mut self.rng)?
        } else {
            self.shortlist_values[0]
        };

        let plateau = best_delta.abs() <= ERROR_EPSILON;
        if plateau {
            if self.tables.total_error() <= ERROR_EPSILON && self.model.is_optimization() {
                let current_cost = self.model.objective.cost()?;
                let candidate_cost = self.model.objective.simulate_cost(chosen, winner)?;
                return self.satisfied_plateau_step(current_cost, candidate_cost, |unit| {
                    unit.commit_local(chosen, winner, true)
                });
            }
            if self.rng.chance(self.neighborhood.plateau_restart_chance()) {
                self.stats.on_plateau_local_minimum();
                return self.restart();
            }
            return self.commit_local(chosen, winner, true);
        }

        self.commit_local(chosen, winner, false)
    }

    /// One permutation step: try swapping the chosen variable with every
    /// other variable, score, tie-break, and apply the acceptance regime.
    fn permutation_step(&mut self, chosen: usize) -> Result<(), SolverError> {
        let n = self.model.len();
        debug_assert!(
            n > 1,
            "permutation mode needs at least two variables to swap"
        );

        let mut best_delta = f64::MAX;
        self.shortlist_partners.clear();
        for partner in 0..n {
            if partner == chosen {
                continue;
            }
            let delta = self.delta_swap(chosen, partner)?;
            if delta < best_delta {
                best_delta = delta;
                self.shortlist_partners.clear();
                self.shortlist_partners.push(partner);
            } else if delta == best_delta {
                self.shortlist_partners.push(partner);
            }
        }

        if best_delta > ERROR_EPSILON {
            self.stats.on_local_minimum();
            return self.restart();
        }

        let winner = if self.shortlist_partners.len() > 1 {
            self.model
                .objective
                .heuristic_variable(&self.shortlist_partners, &mut self.rng)
        } else {
            self.shortlist_partners[0]
        };

        let plateau = best_delta.abs() <= ERROR_EPSILON;
        if plateau {
            if self.tables.total_error() <= ERROR_EPSILON && self.model.is_optimization() {
                let current_cost = self.model.objective.cost()?;
                let candidate_cost = self.model.objective.simulate_swap_cost(chosen, winner)?;
                return self.satisfied_plateau_step(current_cost, candidate_cost, |unit| {
                    unit.commit_swap(chosen, winner, true)
                });
            }
            if self.rng.chance(self.neighborhood.plateau_restart_chance()) {
                self.stats.on_plateau_local_minimum();
                return self.restart();
            }
            return self.commit_swap(chosen, winner, true);
        }

        self.commit_swap(chosen, winner, false)
    }

    /// The acceptance regime on a satisfied optimization plateau: commit
    /// cost-improving moves, walk equal-cost plateaus with a small restart
    /// probability (decided before committing), abandon cost-worsening ones.
    fn satisfied_plateau_step(
        &mut self,
        current_cost: f64,
        candidate_cost: f64,
        commit: impl FnOnce(&mut Self) -> Result<(), SolverError>,
    ) -> Result<(), SolverError> {
        if candidate_cost < current_cost {
            return commit(self);
        }
        if candidate_cost == current_cost {
            if self.rng.chance(self.neighborhood.plateau_restart_chance()) {
                self.stats.on_plateau_local_minimum();
                return self.restart();
            }
            return commit(self);
        }
        self.stats.on_local_minimum();
        self.restart()
    }

    /// Predicted total-error change of swapping `chosen` with `partner`,
    /// counting each constraint in the union of their scopes exactly once.
    fn delta_swap(&mut self, chosen: usize, partner: usize) -> Result<f64, SolverError> {
        let value_chosen = self.model.variables[chosen].value();
        let value_partner = self.model.variables[partner].value();

        self.counted.clear();
        let mut delta = 0.0;

        self.affected_scratch.clear();
        self.affected_scratch
            .extend_from_slice(self.tables.constraints_of(chosen));
        for affected_index in 0..self.affected_scratch.len() {
            let c = self.affected_scratch[affected_index];
            self.counted.insert(c);
            let cell = &mut self.model.constraints[c];
            let mut changes: SmallVec<[(usize, i32); 2]> =
                smallvec![(cell.position_of(chosen), value_partner)];
            if cell.watches_engine_id(partner) {
                changes.push((cell.position_of(partner), value_chosen));
            }
            delta += cell.delta_error(&changes)?;
        }

        self.affected_scratch.clear();
        self.affected_scratch
            .extend_from_slice(self.tables.constraints_of(partner));
        for affected_index in 0..self.affected_scratch.len() {
            let c = self.affected_scratch[affected_index];
            if self.counted.contains(c) {
                continue;
            }
            let cell = &mut self.model.constraints[c];
            let position = cell.position_of(partner);
            delta += cell.delta_error(&[(position, value_chosen)])?;
        }

        Ok(delta)
    }

    // ------------------------------------------------------------------
    // Commits
    // ------------------------------------------------------------------

    /// Applies a single-variable assignment and propagates it everywhere.
    fn commit_local(&mut self, chosen: usize, value: i32, plateau: bool) -> Result<(), SolverError> {
        self.model.variables[chosen].set_value(value)?;

        self.affected_scratch.clear();
        self.affected_scratch
            .extend_from_slice(self.tables.constraints_of(chosen));
        for affected_index in 0..self.affected_scratch.len() {
            let c = self.affected_scratch[affected_index];
            let new_error = {
                let cell = &mut self.model.constraints[c];
                cell.update_variable(chosen, value);
                cell.refresh_error()?
            };
            self.tables.commit_constraint_error(c, new_error);
        }
        self.tables.rebuild_variable_errors(&self.affected_scratch);

        self.model.objective.update_variable(chosen, value);
        self.model.auxiliary.update_variable(chosen, value);

        self.stats.on_local_move(plateau);
        self.finish_commit(chosen)
    }

    /// Applies a swap and propagates it everywhere.
    fn commit_swap(
        &mut self,
        chosen: usize,
        partner: usize,
        plateau: bool,
    ) -> Result<(), SolverError> {
        Variable::swap_assignment(&mut self.model.variables, chosen, partner);
        let value_chosen = self.model.variables[chosen].value();
        let value_partner = self.model.variables[partner].value();

        self.counted.clear();
        self.affected_scratch.clear();
        for &c in self.tables.constraints_of(chosen) {
            if !self.counted.contains(c) {
                self.counted.insert(c);
                self.affected_scratch.push(c);
            }
        }
        for &c in self.tables.constraints_of(partner) {
            if !self.counted.contains(c) {
                self.counted.insert(c);
                self.affected_scratch.push(c);
            }
        }

        for affected_index in 0..self.affected_scratch.len() {
            let c = self.affected_scratch[affected_index];
            let new_error = {
                let cell = &mut self.model.constraints[c];
                if cell.watches_engine_id(chosen) {
                    cell.update_variable(chosen, value_chosen);
                }
                if cell.watches_engine_id(partner) {
                    cell.update_variable(partner, value_partner);
                }
                cell.refresh_error()?
            };
            self.tables.commit_constraint_error(c, new_error);
        }
        self.tables.rebuild_variable_errors(&self.affected_scratch);

        self.model.objective.update_variable(chosen, value_chosen);
        self.model.objective.update_variable(partner, value_partner);
        self.model.auxiliary.update_variable(chosen, value_chosen);
        self.model.auxiliary.update_variable(partner, value_partner);

        self.stats.on_local_move(plateau);
        self.finish_commit(chosen)
    }

    /// Best-so-far bookkeeping and tabu marking after a committed move.
    fn finish_commit(&mut self, chosen: usize) -> Result<(), SolverError> {
        let improved = self.after_state_change()?;
        let mark_selected = if self.options.tabu_selected_requires_improvement {
            improved
        } else {
            true
        };
        if mark_selected {
            self.tabu.mark_selected(chosen);
        } else {
            self.tabu.mark_local_min(chosen);
        }
        self.tables.refresh_non_tabu(&self.tabu);
        Ok(())
    }

    /// Folds the current configuration into the best-so-far state.
    ///
    /// Returns `true` iff the best satisfaction error strictly improved.
    fn after_state_change(&mut self) -> Result<bool, SolverError> {
        let mut current = self.tables.total_error();
        if current <= ERROR_EPSILON {
            current = 0.0;
        }
        if current < self.attempt_best_sat_error {
            self.attempt_best_sat_error = current;
            trace!(error = current, "attempt improved");
        }

        let improved = current < self.best_sat_error;
        if improved {
            self.best_sat_error = current;
            if !(current == 0.0 && self.model.is_optimization()) {
                self.snapshot();
            }
            trace!(error = current, "new best satisfaction error");
        }

        if current == 0.0 && self.model.is_optimization() {
            let cost = self.model.objective.cost()?;
            if cost < self.best_opt_cost {
                self.best_opt_cost = cost;
                self.snapshot();
                self.model
                    .objective
                    .postprocess_satisfaction(&mut self.best_opt_cost, &mut self.best_values);
                trace!(cost = self.best_opt_cost, "new best objective cost");
            }
        }

        Ok(improved)
    }

    fn snapshot(&mut self) {
        self.best_values.clear();
        self.best_values
            .extend(self.model.variables.iter().map(Variable::value));
    }

    // ------------------------------------------------------------------
    // Escapes
    // ------------------------------------------------------------------

    /// Re-samples a random fraction of the variables and clears the tabu
    /// list, keeping the rest of the configuration.
    fn partial_reset(&mut self) -> Result<(), SolverError> {
        self.stats.on_reset();
        self.resets_since_restart += 1;
        trace!(resets = self.resets_since_restart, "partial reset");

        let n = self.model.len();
        let count = self.options.percent_to_reset.min(n);

        // Partial Fisher-Yates: the first `count` entries end up distinct
        // and uniformly chosen.
        self.worst_scratch.clear();
        self.worst_scratch.extend(0..n);
        for i in 0..count {
            let j = i + self.rng.index(n - i);
            self.worst_scratch.swap(i, j);
        }

        for i in 0..count {
            let variable = self.worst_scratch[i];
            if self.neighborhood.is_permutation() {
                if n > 1 {
                    let mut other = self.rng.index(n);
                    if other == variable {
                        other = (other + 1) % n;
                    }
                    Variable::swap_assignment(&mut self.model.variables, variable, other);
                }
            } else {
                self.model.variables[variable].pick_random_value(&mut self.rng);
            }
        }

        self.tabu.clear();
        self.model.sync_mirrors();
        self.tables.recompute(&mut self.model, &self.tabu)?;
        self.after_state_change()?;
        Ok(())
    }

    /// Discards the configuration and starts an attempt from scratch.
    ///
    /// The first start honors a custom or resumed assignment; every later
    /// restart randomizes.
    fn restart(&mut self) -> Result<(), SolverError> {
        if self.started {
            self.stats.on_restart();
            trace!(restarts = self.stats.restarts, "restart");
            self.generate_initial_configuration()?;
        } else if !self.options.custom_first_start {
            self.generate_initial_configuration()?;
        }
        self.started = true;

        self.tabu.clear();
        self.resets_since_restart = 0;
        self.attempt_best_sat_error = f64::MAX;

        self.model.sync_mirrors();
        self.tables.recompute(&mut self.model, &self.tabu)?;
        self.after_state_change()?;
        self.tables.debug_check(&self.model);
        Ok(())
    }

    /// Samples a starting configuration: the best of a handful of
    /// Monte-Carlo rounds (random bubble passes in permutation mode),
    /// stopping early on a zero-error round.
    fn generate_initial_configuration(&mut self) -> Result<(), SolverError> {
        let samplings = self.neighborhood.start_samplings();

        if !self.neighborhood.is_permutation() && samplings == 1 {
            self.monte_carlo_sampling();
            return Ok(());
        }

        let mut best_error = f64::MAX;
        let mut best_values = Vec::new();
        for _ in 0..samplings {
            if self.neighborhood.is_permutation() {
                self.random_permutation_pass();
            } else {
                self.monte_carlo_sampling();
            }
            let error = self.evaluate_current()?;
            if error < best_error {
                best_error = error;
                best_values = self.model.values();
            }
            if error <= ERROR_EPSILON {
                break;
            }
        }
        self.model.restore(&best_values)?;
        Ok(())
    }

    /// Uniform random value for every variable.
    fn monte_carlo_sampling(&mut self) {
        for variable in &mut self.model.variables {
            variable.pick_random_value(&mut self.rng);
        }
    }

    /// One pass over all variable pairs, swapping each with probability 1/2.
    fn random_permutation_pass(&mut self) {
        let n = self.model.len();
        for i in 0..n.saturating_sub(1) {
            for j in (i + 1)..n {
                if self.rng.coin() {
                    Variable::swap_assignment(&mut self.model.variables, i, j);
                }
            }
        }
    }

    /// Total error of the current assignment, with mirrors re-synced.
    fn evaluate_current(&mut self) -> Result<f64, SolverError> {
        self.model.sync_mirrors();
        self.model.refresh_errors()
    }
}

impl std::fmt::Debug for SearchUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchUnit")
            .field("variables", &self.model.len())
            .field("best_sat_error", &self.best_sat_error)
            .field("best_opt_cost", &self.best_opt_cost)
            .field("iterations", &self.stats.search_iterations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestar_model::{
        constraint::Constraint,
        domain::Domain,
        global::AllDifferent,
        index::VariableId,
        objective::Objective,
        variable::Variable,
    };
    use lodestar_search::monitor::{StopToken, TimeBudget};
    use std::time::Duration;

    fn monitor_with_budget(budget: Duration) -> RunMonitor {
        RunMonitor::new(TimeBudget::new(budget), StopToken::new())
    }

    fn all_different_model(n: usize, domain_len: usize) -> Model {
        let variables: Vec<Variable> = (0..n)
            .map(|i| {
                Variable::new(
                    VariableId::new(i),
                    format!("v{i}"),
                    Domain::range(1, domain_len),
                    0,
                )
            })
            .collect();
        let constraint = AllDifferent::new((0..n).map(VariableId::new).collect());
        Model::new(variables, vec![Box::new(constraint)], None, None).unwrap()
    }

    #[test]
    fn test_solves_all_different() {
        let model = all_different_model(3, 3);
        let mut unit = SearchUnit::new(model, false, &Options::default(), SearchRng::seeded(42));
        let satisfied = unit
            .search(&monitor_with_budget(Duration::from_secs(2)))
            .unwrap();

        assert!(satisfied, "a 3-variable all-different over 3 values is trivially satisfiable");
        assert_eq!(unit.best_sat_error(), 0.0);

        let mut solution = unit.best_values().to_vec();
        solution.sort_unstable();
        assert_eq!(solution, vec![1, 2, 3]);
    }

    #[test]
    fn test_final_solution_satisfies_every_constraint() {
        let model = all_different_model(5, 5);
        let mut unit = SearchUnit::new(model, false, &Options::default(), SearchRng::seeded(7));
        let satisfied = unit
            .search(&monitor_with_budget(Duration::from_secs(2)))
            .unwrap();
        assert!(satisfied);

        // The model was restored to the best assignment; every constraint
        // must report zero on its own mirror.
        for cell in &unit.model().constraints {
            assert_eq!(cell.compute_error().unwrap(), 0.0);
        }
    }

    #[test]
    fn test_unsatisfiable_with_tiny_budget_returns_false() {
        // Three variables over two values cannot be pairwise distinct.
        let model = all_different_model(3, 2);
        let mut unit = SearchUnit::new(model, false, &Options::default(), SearchRng::seeded(3));
        let satisfied = unit
            .search(&monitor_with_budget(Duration::from_micros(100)))
            .unwrap();

        assert!(!satisfied);
        assert!(unit.best_sat_error() > 0.0);
        // The best candidate is still a legal assignment.
        for value in unit.best_values() {
            assert!((1..=2).contains(value));
        }
    }

    #[test]
    fn test_same_seed_reproduces_the_run() {
        for seed in [1u64, 17, 99] {
            let mut a = SearchUnit::new(
                all_different_model(6, 6),
                false,
                &Options::default(),
                SearchRng::seeded(seed),
            );
            let mut b = SearchUnit::new(
                all_different_model(6, 6),
                false,
                &Options::default(),
                SearchRng::seeded(seed),
            );
            let monitor = monitor_with_budget(Duration::from_secs(2));
            let sat_a = a.search(&monitor).unwrap();
            let sat_b = b.search(&monitor_with_budget(Duration::from_secs(2))).unwrap();

            assert_eq!(sat_a, sat_b);
            assert_eq!(a.best_values(), b.best_values());
            assert_eq!(
                a.statistics().local_moves,
                b.statistics().local_moves,
                "identical seeds must replay the identical trajectory"
            );
        }
    }

    // Queens on a permutation of columns: only diagonal attacks remain.
    struct NoDiagonalAttack {
        scope: Vec<VariableId>,
    }

    impl Constraint for NoDiagonalAttack {
        fn variables(&self) -> &[VariableId] {
            &self.scope
        }

        fn error(&self, assignment: &[Variable]) -> f64 {
            let mut conflicts = 0.0;
            for i in 0..assignment.len() {
                for j in (i + 1)..assignment.len() {
                    let distance = (j - i) as i32;
                    if (assignment[i].value() - assignment[j].value()).abs() == distance {
                        conflicts += 1.0;
                    }
                }
            }
            conflicts
        }
    }

    fn queens_model(n: usize) -> Model {
        let variables: Vec<Variable> = (0..n)
            .map(|i| {
                let mut v = Variable::new(
                    VariableId::new(i),
                    format!("row{i}"),
                    Domain::range(0, n),
                    0,
                );
                v.set_value(i as i32).unwrap();
                v
            })
            .collect();
        let constraint = NoDiagonalAttack {
            scope: (0..n).map(VariableId::new).collect(),
        };
        Model::new(variables, vec![Box::new(constraint)], None, None).unwrap()
    }

    #[test]
    fn test_permutation_mode_solves_four_queens() {
        let mut unit = SearchUnit::new(
            queens_model(4),
            true,
            &Options::default(),
            SearchRng::seeded(11),
        );
        let satisfied = unit
            .search(&monitor_with_budget(Duration::from_secs(2)))
            .unwrap();
        assert!(satisfied, "4-queens has permutation solutions");

        // The value multiset must be the initial permutation 0..4.
        let mut solution = unit.best_values().to_vec();
        solution.sort_unstable();
        assert_eq!(solution, vec![0, 1, 2, 3]);

        // And it must actually solve 4-queens.
        assert!(
            unit.best_values() == [1, 3, 0, 2] || unit.best_values() == [2, 0, 3, 1],
            "unexpected 4-queens solution: {:?}",
            unit.best_values()
        );
    }

    #[test]
    fn test_permutation_mode_preserves_value_multiset() {
        // Unsatisfiable diagonal problem: 3-queens has no solution, so the
        // unit churns through swaps, resets, and restarts for the full
        // budget. The multiset must survive all of it.
        let mut unit = SearchUnit::new(
            queens_model(3),
            true,
            &Options::default(),
            SearchRng::seeded(5),
        );
        let satisfied = unit
            .search(&monitor_with_budget(Duration::from_millis(30)))
            .unwrap();
        assert!(!satisfied, "3-queens has no solution");

        let mut values = unit.best_values().to_vec();
        values.sort_unstable();
        assert_eq!(values, vec![0, 1, 2]);
    }

    struct PreferHigh {
        negate: bool,
    }

    impl Objective for PreferHigh {
        fn name(&self) -> &str {
            "prefer high"
        }

        fn cost(&self, assignment: &[Variable]) -> f64 {
            let total: f64 = assignment.iter().map(|v| v.value() as f64).sum();
            if self.negate { -total } else { total }
        }

        fn is_maximization(&self) -> bool {
            self.negate
        }
    }

    #[test]
    fn test_optimization_walks_toward_lower_cost() {
        // No constraints beyond a trivially satisfiable one; the unit should
        // spend its budget descending the objective.
        let variables: Vec<Variable> = (0..3)
            .map(|i| Variable::new(VariableId::new(i), format!("v{i}"), Domain::range(0, 8), 4))
            .collect();
        let constraint = AllDifferent::new(vec![
            VariableId::new(0),
            VariableId::new(1),
            VariableId::new(2),
        ]);
        let model = Model::new(
            variables,
            vec![Box::new(constraint)],
            Some(Box::new(PreferHigh { negate: false })),
            None,
        )
        .unwrap();

        let mut unit = SearchUnit::new(model, false, &Options::default(), SearchRng::seeded(23));
        let satisfied = unit
            .search(&monitor_with_budget(Duration::from_millis(50)))
            .unwrap();
        assert!(satisfied);
        // The distinct-value minimum of a sum over 0..8 domains is 0+1+2.
        assert_eq!(unit.best_opt_cost(), 3.0);
    }

    #[test]
    fn test_custom_starting_point_is_honored_on_first_start() {
        let options = Options {
            custom_starting_point: true,
            seed: Some(1),
            ..Options::default()
        };
        // Start at an already-satisfying assignment; with a custom start the
        // first configuration is exactly the declared one, so the first
        // iteration already sees error zero.
        let variables: Vec<Variable> = (0..3)
            .map(|i| {
                let mut v =
                    Variable::new(VariableId::new(i), format!("v{i}"), Domain::range(1, 3), 0);
                v.set_value(i as i32 + 1).unwrap();
                v
            })
            .collect();
        let constraint = AllDifferent::new(vec![
            VariableId::new(0),
            VariableId::new(1),
            VariableId::new(2),
        ]);
        let model = Model::new(variables, vec![Box::new(constraint)], None, None).unwrap();

        let mut unit = SearchUnit::new(model, false, &options, SearchRng::seeded(1));
        let satisfied = unit
            .search(&monitor_with_budget(Duration::from_secs(1)))
            .unwrap();
        assert!(satisfied);
        assert_eq!(unit.best_values(), &[1, 2, 3]);
        assert_eq!(
            unit.statistics().local_moves,
            0,
            "a satisfying custom start needs no moves at all"
        );
    }
}
