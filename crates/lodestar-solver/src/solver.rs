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

//! The solve driver.
//!
//! A [`Solver`] wraps a [`ModelBuilder`] and a permutation flag. Each solve
//! call builds one fresh model per search unit, so units share nothing: in a
//! parallel run every unit owns its own model, random stream, and tables,
//! and the only cross-thread state is the stop flag that ends a satisfaction
//! race once some unit finds a solution. Optimization runs let every unit
//! spend the full budget, then compare objective costs.
//!
//! Running out of budget is reported as an unsatisfied result, never as an
//! error.

use lodestar_engine::unit::SearchUnit;
use lodestar_model::{builder::ModelBuilder, error::SolverError};
use lodestar_search::{
    monitor::{RunMonitor, StopToken, TimeBudget},
    options::Options,
    result::SolveResult,
    rng::SearchRng,
    stats::SearchStatistics,
};
use std::time::Duration;
use tracing::debug;

/// The user-facing solver: a model builder plus a move shape.
pub struct Solver<B: ModelBuilder> {
    builder: B,
    permutation: bool,
}

impl<B: ModelBuilder> Solver<B> {
    /// Creates a solver using single-variable local moves.
    pub fn new(builder: B) -> Self {
        Self {
            builder,
            permutation: false,
        }
    }

    /// Creates a solver for a permutation problem: moves swap two variables'
    /// values, so the declared starting values fix the value multiset for
    /// the whole search.
    pub fn new_permutation(builder: B) -> Self {
        Self {
            builder,
            permutation: true,
        }
    }

    /// The wrapped builder.
    #[inline(always)]
    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// Solves with default options.
    pub fn solve(&self, timeout: Duration) -> Result<SolveResult, SolverError> {
        self.solve_with(timeout, &Options::default())
    }

    /// Solves with default options and a budget given in microseconds, the
    /// native unit of this engine's time accounting.
    pub fn solve_micros(&self, timeout_micros: u64) -> Result<SolveResult, SolverError> {
        self.solve(Duration::from_micros(timeout_micros))
    }

    /// Solves within `timeout`, honoring `options`.
    ///
    /// Returns the best result found; `SolveResult::satisfied` tells whether
    /// a zero-error assignment was reached. Errors are reserved for broken
    /// models and extension-point contract violations.
    pub fn solve_with(
        &self,
        timeout: Duration,
        options: &Options,
    ) -> Result<SolveResult, SolverError> {
        let budget = TimeBudget::new(timeout);
        let stop = StopToken::new();

        let parallel = options.parallel_runs && options.number_threads > 1;
        let unit_count = if parallel { options.number_threads } else { 1 };
        let mut units = self.build_units(unit_count, options)?;

        if units.len() == 1 {
            let monitor = RunMonitor::new(budget.clone(), stop.clone());
            units[0].search(&monitor)?;
        } else {
            let is_optimization = units[0].is_optimization();
            let outcomes: Vec<Result<bool, SolverError>> = std::thread::scope(|scope| {
                let mut handles = Vec::with_capacity(units.len());
                for unit in &mut units {
                    let monitor = RunMonitor::new(budget.clone(), stop.clone());
                    let stop_handle = stop.clone();
                    handles.push(scope.spawn(move || {
                        let outcome = unit.search(&monitor);
                        // A satisfaction race ends at the first solution; in
                        // optimization mode every unit runs out its budget
                        // and the costs are compared afterwards.
                        if !is_optimization && matches!(outcome, Ok(true)) {
                            stop_handle.request_stop();
                        }
                        outcome
                    }));
                }
                handles
                    .into_iter()
                    .map(|handle| handle.join().expect("search unit thread panicked"))
                    .collect()
            });
            for outcome in outcomes {
                outcome?;
            }
        }

        self.finalize(units, budget)
    }

    fn build_units(&self, count: usize, options: &Options) -> Result<Vec<SearchUnit>, SolverError> {
        (0..count)
            .map(|index| {
                let model = self.builder.build_model()?;
                let rng = match options.seed {
                    Some(seed) => SearchRng::seeded(seed.wrapping_add(index as u64)),
                    None => SearchRng::from_entropy(),
                };
                Ok(SearchUnit::new(model, self.permutation, options, rng))
            })
            .collect()
    }

    /// Index of the best unit: satisfied beats unsatisfied, then lower
    /// objective cost (optimization) or lower satisfaction error.
    fn pick_winner(units: &[SearchUnit]) -> usize {
        let mut winner = 0;
        for index in 1..units.len() {
            let candidate = &units[index];
            let current = &units[winner];
            let candidate_sat = candidate.best_sat_error() == 0.0;
            let current_sat = current.best_sat_error() == 0.0;
            let better = match (candidate_sat, current_sat) {
                (true, true) => candidate.best_opt_cost() < current.best_opt_cost(),
                (true, false) => true,
                (false, true) => false,
                (false, false) => candidate.best_sat_error() < current.best_sat_error(),
            };
            if better {
                winner = index;
            }
        }
        winner
    }

    fn finalize(
        &self,
        mut units: Vec<SearchUnit>,
        budget: TimeBudget,
    ) -> Result<SolveResult, SolverError> {
        let winner = Self::pick_winner(&units);
        let mut total_statistics = SearchStatistics::default();
        for unit in &units {
            total_statistics.absorb(unit.statistics());
        }
        let unit = &mut units[winner];

        let satisfied = unit.best_sat_error() == 0.0;
        let is_optimization = unit.is_optimization();
        let maximization = unit.model().objective.is_maximization();

        let mut cost_before_postprocess = None;
        let cost = if satisfied && is_optimization {
            cost_before_postprocess = Some(unit.best_opt_cost());
            unit.postprocess_optimization();
            let polished = unit.best_values().to_vec();
            unit.model_mut().restore(&polished)?;

            let mut cost = unit.best_opt_cost();
            // The search always minimizes; a maximization objective returned
            // negated values, so the report flips the sign back.
            if maximization {
                cost = -cost;
                cost_before_postprocess = cost_before_postprocess.map(|value| -value);
            }
            cost
        } else {
            unit.best_sat_error()
        };

        let result = SolveResult {
            satisfied,
            cost,
            solution: unit.best_values().to_vec(),
            cost_before_postprocess,
            statistics: unit.statistics().clone(),
            total_statistics,
        };

        debug!(
            elapsed_micros = budget.elapsed_micros() as u64,
            satisfaction_error = unit.best_sat_error(),
            iterations = result.statistics.search_iterations,
            cost = result.cost,
            postprocess_delta = result
                .cost_before_postprocess
                .map(|before| result.cost - before)
                .unwrap_or(0.0),
            "solve finished"
        );

        Ok(result)
    }
}
