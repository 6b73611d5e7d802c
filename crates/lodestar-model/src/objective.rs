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

//! The objective extension point and its engine-side cell.
//!
//! An [`Objective`] scores satisfying assignments; lower is better, and the
//! engine only ever minimizes. Maximization problems are modeled by returning
//! the negated value from [`Objective::cost`] and setting
//! [`Objective::is_maximization`], which flips the sign back in the reported
//! result (reporting only — the search itself still minimizes).
//!
//! Besides the cost, an objective may supply two tie-break heuristics the
//! engine consults when several candidate moves are equally good, and two
//! post-processing hooks that may polish a solution after the fact. All of
//! them have sensible defaults; a model without any objective gets the
//! [`NullObjective`], which makes the run a pure satisfaction search.

use crate::{error::SolverError, index::VariableId, variable::Variable};
use rand::{Rng, RngCore};
use smallvec::SmallVec;

/// A user-defined objective function. Lower cost is better.
pub trait Objective: Send {
    /// Informational name, used in traces and error messages.
    fn name(&self) -> &str;

    /// The scalar cost of `assignment`. May be negative; must not be NaN.
    fn cost(&self, assignment: &[Variable]) -> f64;

    /// Whether [`Objective::cost`] returns a negated maximization value.
    ///
    /// This is purely a reporting convention: when `true`, the final cost is
    /// negated before being handed back to the caller. It is never inferred
    /// from cost signs.
    fn is_maximization(&self) -> bool {
        false
    }

    /// Tie-break across candidate values for the variable at `position`.
    ///
    /// Returning `None` (the default) selects the engine fallback: the
    /// candidate minimizing [`Objective::cost`], ties broken uniformly.
    fn heuristic_value(
        &self,
        assignment: &[Variable],
        position: usize,
        candidates: &[i32],
        rng: &mut dyn RngCore,
    ) -> Option<i32> {
        let _ = (assignment, position, candidates, rng);
        None
    }

    /// Tie-break across candidate swap partners in permutation mode.
    ///
    /// Returning `None` (the default) selects a uniformly random candidate.
    fn heuristic_variable(
        &self,
        candidates: &[VariableId],
        rng: &mut dyn RngCore,
    ) -> Option<VariableId> {
        let _ = (candidates, rng);
        None
    }

    /// Hook run when a satisfying assignment improves the incumbent during
    /// an optimization search. May rewrite `best_cost` and `solution`, but
    /// only to improve them.
    fn postprocess_satisfaction(
        &self,
        assignment: &[Variable],
        best_cost: &mut f64,
        solution: &mut [i32],
    ) {
        let _ = (assignment, best_cost, solution);
    }

    /// Hook run once after the budget elapses on a satisfied optimization
    /// run. May rewrite `best_cost` and `solution`, but only to improve them.
    fn postprocess_optimization(
        &self,
        assignment: &[Variable],
        best_cost: &mut f64,
        solution: &mut [i32],
    ) {
        let _ = (assignment, best_cost, solution);
    }
}

/// Installed when the model declares no objective: cost 0, uniform picks.
pub struct NullObjective;

impl Objective for NullObjective {
    fn name(&self) -> &str {
        "null objective"
    }

    fn cost(&self, _assignment: &[Variable]) -> f64 {
        0.0
    }

    fn heuristic_value(
        &self,
        _assignment: &[Variable],
        _position: usize,
        candidates: &[i32],
        rng: &mut dyn RngCore,
    ) -> Option<i32> {
        Some(candidates[rng.gen_range(0..candidates.len())])
    }

    fn heuristic_variable(
        &self,
        candidates: &[VariableId],
        rng: &mut dyn RngCore,
    ) -> Option<VariableId> {
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}

/// Engine-side wrapper around the objective: a mirror of the *full* variable
/// vector (engine id == mirror position) plus validated cost access.
pub struct ObjectiveCell {
    inner: Box<dyn Objective>,
    mirror: Vec<Variable>,
}

impl ObjectiveCell {
    /// Wraps a user objective; the mirror is seeded from `variables`.
    pub fn new(inner: Box<dyn Objective>, variables: &[Variable]) -> Self {
        Self {
            inner,
            mirror: variables.to_vec(),
        }
    }

    /// Creates the null cell used for pure satisfaction runs.
    pub fn null(variables: &[Variable]) -> Self {
        Self::new(Box::new(NullObjective), variables)
    }

    /// The objective's informational name.
    #[inline(always)]
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Whether the reported cost must be sign-flipped.
    #[inline(always)]
    pub fn is_maximization(&self) -> bool {
        self.inner.is_maximization()
    }

    /// Read access to the mirror.
    #[inline(always)]
    pub fn mirror(&self) -> &[Variable] {
        &self.mirror
    }

    /// Propagates a committed engine change into the mirror.
    #[inline]
    pub fn update_variable(&mut self, engine_id: usize, new_value: i32) {
        self.mirror[engine_id].assign_unchecked(new_value);
    }

    /// The cost of the current mirror.
    pub fn cost(&self) -> Result<f64, SolverError> {
        self.validate(self.inner.cost(&self.mirror))
    }

    /// The cost if the variable at `engine_id` took `value`; the mirror is
    /// restored before returning.
    pub fn simulate_cost(&mut self, engine_id: usize, value: i32) -> Result<f64, SolverError> {
        let saved = self.mirror[engine_id].value();
        self.mirror[engine_id].assign_unchecked(value);
        let cost = self.inner.cost(&self.mirror);
        self.mirror[engine_id].assign_unchecked(saved);
        self.validate(cost)
    }

    /// The cost if the variables at `a` and `b` exchanged their values; the
    /// mirror is restored before returning.
    pub fn simulate_swap_cost(&mut self, a: usize, b: usize) -> Result<f64, SolverError> {
        let (value_a, value_b) = (self.mirror[a].value(), self.mirror[b].value());
        self.mirror[a].assign_unchecked(value_b);
        self.mirror[b].assign_unchecked(value_a);
        let cost = self.inner.cost(&self.mirror);
        self.mirror[a].assign_unchecked(value_a);
        self.mirror[b].assign_unchecked(value_b);
        self.validate(cost)
    }

    /// Value tie-break for the variable at `engine_id`.
    ///
    /// Consults the user heuristic first; the fallback simulates every
    /// candidate and keeps the cost-minimal ones, breaking remaining ties
    /// uniformly.
    pub fn heuristic_value<R: Rng>(
        &mut self,
        engine_id: usize,
        candidates: &[i32],
        rng: &mut R,
    ) -> Result<i32, SolverError> {
        debug_assert!(
            !candidates.is_empty(),
            "called `ObjectiveCell::heuristic_value` with no candidates"
        );
        if let Some(value) = self
            .inner
            .heuristic_value(&self.mirror, engine_id, candidates, rng)
        {
            return Ok(value);
        }

        let mut best_cost = f64::MAX;
        let mut shortlist: SmallVec<[i32; 8]> = SmallVec::new();
        for &candidate in candidates {
            let cost = self.simulate_cost(engine_id, candidate)?;
            if cost < best_cost {
                best_cost = cost;
                shortlist.clear();
                shortlist.push(candidate);
            } else if cost == best_cost {
                shortlist.push(candidate);
            }
        }
        Ok(shortlist[rng.gen_range(0..shortlist.len())])
    }

    /// Swap-partner tie-break; `candidates` are engine ids.
    ///
    /// Consults the user heuristic (which sees original ids) first; the
    /// fallback is a uniform pick.
    pub fn heuristic_variable<R: Rng>(&self, candidates: &[usize], rng: &mut R) -> usize {
        debug_assert!(
            !candidates.is_empty(),
            "called `ObjectiveCell::heuristic_variable` with no candidates"
        );
        let originals: SmallVec<[VariableId; 8]> = candidates
            .iter()
            .map(|&engine_id| self.mirror[engine_id].original_id())
            .collect();
        if let Some(chosen) = self.inner.heuristic_variable(&originals, rng) {
            if let Some(offset) = originals.iter().position(|&id| id == chosen) {
                return candidates[offset];
            }
        }
        candidates[rng.gen_range(0..candidates.len())]
    }

    /// Runs the satisfaction post-process hook.
    pub fn postprocess_satisfaction(&self, best_cost: &mut f64, solution: &mut [i32]) {
        self.inner
            .postprocess_satisfaction(&self.mirror, best_cost, solution);
    }

    /// Runs the optimization post-process hook.
    pub fn postprocess_optimization(&self, best_cost: &mut f64, solution: &mut [i32]) {
        self.inner
            .postprocess_optimization(&self.mirror, best_cost, solution);
    }

    fn validate(&self, value: f64) -> Result<f64, SolverError> {
        if value.is_nan() {
            return Err(SolverError::Cost {
                name: self.inner.name().to_string(),
                assignment: self.mirror.iter().map(Variable::value).collect(),
            });
        }
        Ok(value)
    }
}

impl std::fmt::Debug for ObjectiveCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectiveCell")
            .field("name", &self.inner.name())
            .field("variables", &self.mirror.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct SumCost;

    impl Objective for SumCost {
        fn name(&self) -> &str {
            "sum"
        }

        fn cost(&self, assignment: &[Variable]) -> f64 {
            assignment.iter().map(|v| v.value() as f64).sum()
        }
    }

    fn variables() -> Vec<Variable> {
        (0..3)
            .map(|i| Variable::new(VariableId::new(i), format!("v{i}"), Domain::range(0, 10), 4))
            .collect()
    }

    #[test]
    fn test_cost_tracks_mirror_updates() {
        let vars = variables();
        let mut cell = ObjectiveCell::new(Box::new(SumCost), &vars);
        assert_eq!(cell.name(), "sum");
        assert_eq!(cell.cost().unwrap(), 12.0);
        cell.update_variable(1, 9);
        assert_eq!(cell.cost().unwrap(), 17.0);
        assert_eq!(cell.mirror()[1].value(), 9);
    }

    #[test]
    fn test_simulate_cost_restores_mirror() {
        let vars = variables();
        let mut cell = ObjectiveCell::new(Box::new(SumCost), &vars);
        let simulated = cell.simulate_cost(0, 0).unwrap();
        assert_eq!(simulated, 8.0);
        assert_eq!(cell.cost().unwrap(), 12.0);
    }

    #[test]
    fn test_simulate_swap_cost_is_symmetric() {
        let vars = variables();
        let mut cell = ObjectiveCell::new(Box::new(SumCost), &vars);
        cell.update_variable(0, 1);
        // A swap never changes a sum objective.
        assert_eq!(cell.simulate_swap_cost(0, 2).unwrap(), cell.cost().unwrap());
    }

    #[test]
    fn test_default_value_heuristic_minimizes_cost() {
        let vars = variables();
        let mut cell = ObjectiveCell::new(Box::new(SumCost), &vars);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let picked = cell.heuristic_value(0, &[3, 1, 7], &mut rng).unwrap();
        assert_eq!(picked, 1, "the sum objective is minimized by the smallest value");
    }

    #[test]
    fn test_null_objective_costs_nothing_and_picks_uniformly() {
        let vars = variables();
        let mut cell = ObjectiveCell::null(&vars);
        assert_eq!(cell.cost().unwrap(), 0.0);

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let candidates = [2, 4, 6];
        let mut seen = std::collections::HashSet::new();
        for _ in 0..128 {
            seen.insert(cell.heuristic_value(0, &candidates, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3, "uniform picks should reach every candidate");
    }

    #[test]
    fn test_heuristic_variable_fallback_stays_in_candidates() {
        let vars = variables();
        let cell = ObjectiveCell::null(&vars);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..32 {
            let picked = cell.heuristic_variable(&[0, 2], &mut rng);
            assert!(picked == 0 || picked == 2);
        }
    }
}
