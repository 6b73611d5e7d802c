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

//! The constraint extension point and its engine-side cell.
//!
//! Users implement [`Constraint`] to score how far an assignment is from
//! satisfying their rule: `error` must be nonnegative, deterministic, and
//! exactly zero on satisfying assignments. The magnitude is a
//! distance-to-satisfaction of the modeler's choosing.
//!
//! The engine never talks to a `Constraint` directly. It drives a
//! [`ConstraintCell`], which owns a private mirror of the watched variables,
//! translates engine variable ids into mirror positions, caches the current
//! error, and supplies a simulation fallback for constraints that do not
//! implement an incremental [`Constraint::delta_error`]. Whether a constraint
//! provides its own delta is detected once, by probing with a no-op change
//! when the model is built.

use crate::{
    error::SolverError,
    index::{ConstraintId, VariableId},
    variable::Variable,
};
use smallvec::SmallVec;

/// A user-defined constraint over a subset of the model's variables.
///
/// Implementations see only their own mirror of the watched variables, in
/// the order returned by [`Constraint::variables`]; `position` arguments
/// below always index into that order.
pub trait Constraint: Send {
    /// The variables this constraint watches, by original id.
    ///
    /// The returned slice must be non-empty, free of duplicates, and stable
    /// for the lifetime of the constraint.
    fn variables(&self) -> &[VariableId];

    /// The error of `assignment`: nonnegative, zero iff satisfied.
    ///
    /// Must be deterministic — two calls without an interleaved update return
    /// the same value — and free of side effects, since the engine also calls
    /// it while simulating candidate moves.
    fn error(&self, assignment: &[Variable]) -> f64;

    /// Predicted signed change of [`Constraint::error`] if the variables at
    /// the given mirror positions took the given values.
    ///
    /// Returning `None` (the default) selects the engine's fallback, which
    /// simulates the change on the mirror and diffs two full error
    /// computations. An override is treated as equally authoritative and is
    /// detected once at model construction by a benign probe call.
    fn delta_error(&self, assignment: &[Variable], changes: &[(usize, i32)]) -> Option<f64> {
        let _ = (assignment, changes);
        None
    }

    /// Hook invoked right before a committed change reaches the mirror, so
    /// implementations can maintain derived state incrementally.
    ///
    /// `assignment` still holds the old value at `position` when this runs.
    /// The default does nothing; stateless constraints never need it.
    fn value_committed(&mut self, assignment: &[Variable], position: usize, new_value: i32) {
        let _ = (assignment, position, new_value);
    }
}

/// Engine-side wrapper around one constraint: mirror, id translation, error
/// cache, and the expert-delta flag.
///
/// The cell is the single writer of its mirror. Invariant: after every
/// committed engine change, each mirror entry equals the engine's current
/// value of the corresponding variable.
pub struct ConstraintCell {
    id: ConstraintId,
    inner: Box<dyn Constraint>,
    mirror: Vec<Variable>,
    /// Engine variable id -> position in `mirror`; `None` for unwatched ids.
    positions: Vec<Option<usize>>,
    /// Engine ids of the watched variables, in mirror order.
    watched: Vec<usize>,
    current_error: f64,
    uses_expert_delta: bool,
}

impl ConstraintCell {
    /// Wraps a constraint; the mirror is populated afterwards through
    /// [`ConstraintCell::make_variable_id_mapping`].
    pub fn new(id: ConstraintId, inner: Box<dyn Constraint>) -> Self {
        Self {
            id,
            inner,
            mirror: Vec::new(),
            positions: Vec::new(),
            watched: Vec::new(),
            current_error: 0.0,
            uses_expert_delta: false,
        }
    }

    /// The engine-assigned id of this constraint.
    #[inline(always)]
    pub fn id(&self) -> ConstraintId {
        self.id
    }

    /// Returns `true` iff the wrapped constraint watches `original_id`.
    #[inline]
    pub fn has_variable(&self, original_id: VariableId) -> bool {
        self.inner.variables().contains(&original_id)
    }

    /// The watched original ids, in mirror order.
    #[inline]
    pub fn watched_original_ids(&self) -> &[VariableId] {
        self.inner.variables()
    }

    /// Installs the translation `engine_id -> mirror position` and seeds the
    /// mirror entry with a copy of `variable`.
    ///
    /// Must be called exactly once per watched variable, in the order of
    /// [`Constraint::variables`], before any error or update call.
    ///
    /// # Panics
    ///
    /// Panics if called twice for the same engine id or out of watch-list
    /// order.
    pub fn make_variable_id_mapping(&mut self, engine_id: usize, variable: &Variable) {
        assert_eq!(
            self.inner.variables().get(self.mirror.len()),
            Some(&variable.original_id()),
            "called `ConstraintCell::make_variable_id_mapping` out of watch-list order on constraint {}",
            self.id
        );
        if self.positions.len() <= engine_id {
            self.positions.resize(engine_id + 1, None);
        }
        assert!(
            self.positions[engine_id].is_none(),
            "called `ConstraintCell::make_variable_id_mapping` twice for engine id {} on constraint {}",
            engine_id,
            self.id
        );
        self.positions[engine_id] = Some(self.mirror.len());
        self.watched.push(engine_id);
        self.mirror.push(variable.clone());
    }

    /// Engine ids of the watched variables, in mirror order.
    #[inline(always)]
    pub fn watched_engine_ids(&self) -> &[usize] {
        &self.watched
    }

    /// Mirror position of an engine variable id.
    ///
    /// # Panics
    ///
    /// Panics if the variable is not watched by this constraint.
    #[inline(always)]
    pub fn position_of(&self, engine_id: usize) -> usize {
        self.positions
            .get(engine_id)
            .copied()
            .flatten()
            .unwrap_or_else(|| {
                panic!(
                    "variable with engine id {} is not in the scope of constraint {}",
                    engine_id, self.id
                )
            })
    }

    /// Returns `true` iff the engine variable id is watched.
    #[inline(always)]
    pub fn watches_engine_id(&self, engine_id: usize) -> bool {
        matches!(self.positions.get(engine_id), Some(Some(_)))
    }

    /// Read access to the mirror, mostly for tests and invariant checks.
    #[inline(always)]
    pub fn mirror(&self) -> &[Variable] {
        &self.mirror
    }

    /// Propagates a committed engine change into the mirror.
    ///
    /// Idempotent for identical values: re-sending the current value is a
    /// no-op and does not reach the [`Constraint::value_committed`] hook.
    pub fn update_variable(&mut self, engine_id: usize, new_value: i32) {
        let position = self.position_of(engine_id);
        if self.mirror[position].value() == new_value {
            return;
        }
        self.inner
            .value_committed(&self.mirror, position, new_value);
        self.mirror[position].assign_unchecked(new_value);
    }

    /// The cached error, valid as of the last refresh.
    #[inline(always)]
    pub fn current_error(&self) -> f64 {
        self.current_error
    }

    /// Recomputes the error from the mirror without touching the cache.
    pub fn compute_error(&self) -> Result<f64, SolverError> {
        self.validate(self.inner.error(&self.mirror))
    }

    /// Recomputes the error from the mirror and stores it as current.
    pub fn refresh_error(&mut self) -> Result<f64, SolverError> {
        let value = self.compute_error()?;
        self.current_error = value;
        Ok(value)
    }

    /// Probes the wrapped constraint once to learn whether it implements an
    /// expert [`Constraint::delta_error`]. Called at model construction.
    pub fn probe_expert_delta(&mut self) {
        debug_assert!(
            !self.mirror.is_empty(),
            "called `ConstraintCell::probe_expert_delta` on constraint {} before its mirror was populated",
            self.id
        );
        let benign = [(0usize, self.mirror[0].value())];
        self.uses_expert_delta = self.inner.delta_error(&self.mirror, &benign).is_some();
    }

    /// Returns `true` iff the probe found an expert delta implementation.
    #[inline(always)]
    pub fn uses_expert_delta(&self) -> bool {
        self.uses_expert_delta
    }

    /// Predicted signed error change if the given mirror positions took the
    /// given values.
    ///
    /// Dispatches to the expert implementation when the probe found one,
    /// otherwise simulates on the mirror: apply the changes, recompute, diff
    /// against the cached error, restore.
    pub fn delta_error(&mut self, changes: &[(usize, i32)]) -> Result<f64, SolverError> {
        if self.uses_expert_delta {
            if let Some(delta) = self.inner.delta_error(&self.mirror, changes) {
                return Ok(delta);
            }
            // An override that answers the probe but not a real query falls
            // back to simulation rather than aborting the run.
        }

        let mut saved: SmallVec<[(usize, i32); 2]> = SmallVec::new();
        for &(position, value) in changes {
            saved.push((position, self.mirror[position].value()));
            self.mirror[position].assign_unchecked(value);
        }
        let after = self.inner.error(&self.mirror);
        for &(position, value) in saved.iter().rev() {
            self.mirror[position].assign_unchecked(value);
        }
        let after = self.validate(after)?;
        Ok(after - self.current_error)
    }

    fn validate(&self, value: f64) -> Result<f64, SolverError> {
        if value.is_nan() || value < 0.0 {
            return Err(SolverError::Contract {
                id: self.id,
                value,
                assignment: self.mirror.iter().map(Variable::value).collect(),
            });
        }
        Ok(value)
    }
}

impl std::fmt::Debug for ConstraintCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintCell")
            .field("id", &self.id)
            .field("watched", &self.watched)
            .field("current_error", &self.current_error)
            .field("uses_expert_delta", &self.uses_expert_delta)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    // |x - y|, no expert delta.
    struct EqualPair {
        scope: Vec<VariableId>,
    }

    impl Constraint for EqualPair {
        fn variables(&self) -> &[VariableId] {
            &self.scope
        }

        fn error(&self, assignment: &[Variable]) -> f64 {
            (assignment[0].value() - assignment[1].value()).abs() as f64
        }
    }

    // Same rule with an expert delta.
    struct EqualPairExpert {
        scope: Vec<VariableId>,
    }

    impl Constraint for EqualPairExpert {
        fn variables(&self) -> &[VariableId] {
            &self.scope
        }

        fn error(&self, assignment: &[Variable]) -> f64 {
            (assignment[0].value() - assignment[1].value()).abs() as f64
        }

        fn delta_error(&self, assignment: &[Variable], changes: &[(usize, i32)]) -> Option<f64> {
            let mut values = [assignment[0].value(), assignment[1].value()];
            let before = (values[0] - values[1]).abs() as f64;
            for &(position, value) in changes {
                values[position] = value;
            }
            let after = (values[0] - values[1]).abs() as f64;
            Some(after - before)
        }
    }

    struct NegativeError {
        scope: Vec<VariableId>,
    }

    impl Constraint for NegativeError {
        fn variables(&self) -> &[VariableId] {
            &self.scope
        }

        fn error(&self, _assignment: &[Variable]) -> f64 {
            -1.0
        }
    }

    fn scope() -> Vec<VariableId> {
        vec![VariableId::new(0), VariableId::new(1)]
    }

    fn cell_with(inner: Box<dyn Constraint>) -> ConstraintCell {
        let mut cell = ConstraintCell::new(ConstraintId::new(0), inner);
        let a = Variable::new(VariableId::new(0), "a", Domain::range(0, 10), 2);
        let b = Variable::new(VariableId::new(1), "b", Domain::range(0, 10), 5);
        cell.make_variable_id_mapping(0, &a);
        cell.make_variable_id_mapping(1, &b);
        cell.probe_expert_delta();
        cell.refresh_error().unwrap();
        cell
    }

    #[test]
    fn test_probe_detects_default_delta() {
        let cell = cell_with(Box::new(EqualPair { scope: scope() }));
        assert!(!cell.uses_expert_delta());
        assert_eq!(cell.id(), ConstraintId::new(0));
        assert!(cell.has_variable(VariableId::new(1)));
        assert!(!cell.has_variable(VariableId::new(9)));
    }

    #[test]
    fn test_probe_detects_expert_delta() {
        let cell = cell_with(Box::new(EqualPairExpert { scope: scope() }));
        assert!(cell.uses_expert_delta());
    }

    #[test]
    fn test_default_delta_matches_error_difference() {
        // a = 2, b = 5, error 3. Moving a to 5 should report -3.
        let mut cell = cell_with(Box::new(EqualPair { scope: scope() }));
        assert_eq!(cell.current_error(), 3.0);
        let delta = cell.delta_error(&[(0, 5)]).unwrap();
        assert_eq!(delta, -3.0);
        // Simulation must leave the mirror untouched.
        assert_eq!(cell.mirror()[0].value(), 2);
        assert_eq!(cell.current_error(), 3.0);
    }

    #[test]
    fn test_expert_delta_agrees_with_default() {
        let mut plain = cell_with(Box::new(EqualPair { scope: scope() }));
        let mut expert = cell_with(Box::new(EqualPairExpert { scope: scope() }));
        for candidate in 0..10 {
            let d0 = plain.delta_error(&[(1, candidate)]).unwrap();
            let d1 = expert.delta_error(&[(1, candidate)]).unwrap();
            assert_eq!(d0, d1, "deltas disagree for candidate {candidate}");
        }
    }

    #[test]
    fn test_pair_delta_counts_both_changes() {
        let mut cell = cell_with(Box::new(EqualPair { scope: scope() }));
        // Swap-shaped change: a=5, b=2 keeps |a-b| at 3.
        let delta = cell.delta_error(&[(0, 5), (1, 2)]).unwrap();
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn test_update_variable_is_idempotent() {
        let mut cell = cell_with(Box::new(EqualPair { scope: scope() }));
        cell.update_variable(0, 7);
        cell.update_variable(0, 7);
        assert_eq!(cell.mirror()[0].value(), 7);
        cell.refresh_error().unwrap();
        assert_eq!(cell.current_error(), 2.0);
    }

    #[test]
    fn test_negative_error_is_a_contract_violation() {
        let mut cell = ConstraintCell::new(
            ConstraintId::new(4),
            Box::new(NegativeError { scope: scope() }),
        );
        let a = Variable::new(VariableId::new(0), "a", Domain::range(0, 3), 0);
        let b = Variable::new(VariableId::new(1), "b", Domain::range(0, 3), 0);
        cell.make_variable_id_mapping(0, &a);
        cell.make_variable_id_mapping(1, &b);
        let err = cell.refresh_error().unwrap_err();
        match err {
            SolverError::Contract { id, value, .. } => {
                assert_eq!(id, ConstraintId::new(4));
                assert_eq!(value, -1.0);
            }
            other => panic!("expected a contract error, got {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "twice for engine id")]
    fn test_double_mapping_panics() {
        let mut cell = ConstraintCell::new(
            ConstraintId::new(0),
            Box::new(EqualPair {
                scope: vec![VariableId::new(0), VariableId::new(0)],
            }),
        );
        let a = Variable::new(VariableId::new(0), "a", Domain::range(0, 3), 0);
        cell.make_variable_id_mapping(0, &a);
        cell.make_variable_id_mapping(0, &a);
    }
}
