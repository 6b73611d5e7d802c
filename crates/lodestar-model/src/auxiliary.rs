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

//! User-attached auxiliary data.
//!
//! Auxiliary data is derived state (lookup tables, running aggregates,
//! geometry caches) that constraints and the objective want to consult
//! cheaply. The engine notifies it after every committed change to one of
//! its watched variables, and asks for a full rebuild whenever the search
//! jumps to a fresh configuration (restarts and partial resets).

use crate::{index::VariableId, variable::Variable};

/// Derived state kept in sync with a watched subset of the variables.
pub trait AuxiliaryData: Send {
    /// The variables whose changes this data wants to observe, by original
    /// id.
    fn variables(&self) -> &[VariableId];

    /// Notification that the variable at `position` (into the watch list)
    /// is about to take `new_value`. `assignment` still holds the old value.
    fn update(&mut self, assignment: &[Variable], position: usize, new_value: i32);

    /// Full rebuild after the search discarded the current configuration.
    ///
    /// The default replays [`AuxiliaryData::update`] for every watched
    /// variable with its current value.
    fn refresh(&mut self, assignment: &[Variable]) {
        for position in 0..assignment.len() {
            let value = assignment[position].value();
            self.update(assignment, position, value);
        }
    }
}

/// Installed when the model declares no auxiliary data.
pub struct NullAuxiliaryData;

impl AuxiliaryData for NullAuxiliaryData {
    fn variables(&self) -> &[VariableId] {
        &[]
    }

    fn update(&mut self, _assignment: &[Variable], _position: usize, _new_value: i32) {}
}

/// Engine-side wrapper: watched mirror plus id translation, mirroring the
/// shape of `ConstraintCell`.
pub struct AuxiliaryCell {
    inner: Box<dyn AuxiliaryData>,
    mirror: Vec<Variable>,
    /// Engine variable id -> position in `mirror`; `None` for unwatched ids.
    positions: Vec<Option<usize>>,
    /// Engine ids of the watched variables, in mirror order.
    watched: Vec<usize>,
}

impl AuxiliaryCell {
    /// Wraps user auxiliary data; the mirror is populated through
    /// [`AuxiliaryCell::make_variable_id_mapping`].
    pub fn new(inner: Box<dyn AuxiliaryData>) -> Self {
        Self {
            inner,
            mirror: Vec::new(),
            positions: Vec::new(),
            watched: Vec::new(),
        }
    }

    /// Creates the no-op cell used when no auxiliary data is declared.
    pub fn null() -> Self {
        Self::new(Box::new(NullAuxiliaryData))
    }

    /// The watched original ids, in mirror order.
    #[inline]
    pub fn watched_original_ids(&self) -> &[VariableId] {
        self.inner.variables()
    }

    /// Installs the translation `engine_id -> mirror position`; same
    /// contract as the constraint cell variant.
    pub fn make_variable_id_mapping(&mut self, engine_id: usize, variable: &Variable) {
        assert_eq!(
            self.inner.variables().get(self.mirror.len()),
            Some(&variable.original_id()),
            "called `AuxiliaryCell::make_variable_id_mapping` out of watch-list order"
        );
        if self.positions.len() <= engine_id {
            self.positions.resize(engine_id + 1, None);
        }
        assert!(
            self.positions[engine_id].is_none(),
            "called `AuxiliaryCell::make_variable_id_mapping` twice for engine id {engine_id}"
        );
        self.positions[engine_id] = Some(self.mirror.len());
        self.watched.push(engine_id);
        self.mirror.push(variable.clone());
    }

    /// Propagates a committed engine change; a no-op for unwatched ids and
    /// for identical values.
    pub fn update_variable(&mut self, engine_id: usize, new_value: i32) {
        let Some(Some(position)) = self.positions.get(engine_id).copied() else {
            return;
        };
        if self.mirror[position].value() == new_value {
            return;
        }
        self.inner.update(&self.mirror, position, new_value);
        self.mirror[position].assign_unchecked(new_value);
    }

    /// Re-syncs the mirror from the engine's variables and asks the wrapped
    /// data for a full rebuild.
    pub fn refresh(&mut self, variables: &[Variable]) {
        for (position, &engine_id) in self.watched.iter().enumerate() {
            let value = variables[engine_id].value();
            self.mirror[position].assign_unchecked(value);
        }
        self.inner.refresh(&self.mirror);
    }
}

impl std::fmt::Debug for AuxiliaryCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuxiliaryCell")
            .field("watched", &self.watched)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use std::sync::{
        Arc,
        atomic::{AtomicI64, AtomicUsize, Ordering},
    };

    // Tracks the running sum of its watched variables through shared state
    // so the test can observe it from outside the cell.
    struct RunningSum {
        scope: Vec<VariableId>,
        sum: Arc<AtomicI64>,
        refreshes: Arc<AtomicUsize>,
    }

    impl AuxiliaryData for RunningSum {
        fn variables(&self) -> &[VariableId] {
            &self.scope
        }

        fn update(&mut self, assignment: &[Variable], position: usize, new_value: i32) {
            let diff = (new_value - assignment[position].value()) as i64;
            self.sum.fetch_add(diff, Ordering::Relaxed);
        }

        fn refresh(&mut self, assignment: &[Variable]) {
            let total = assignment.iter().map(|v| v.value() as i64).sum();
            self.sum.store(total, Ordering::Relaxed);
            self.refreshes.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn variables() -> Vec<Variable> {
        (0..3)
            .map(|i| Variable::new(VariableId::new(i), format!("v{i}"), Domain::range(0, 10), 1))
            .collect()
    }

    fn bound_cell(
        vars: &[Variable],
        sum: Arc<AtomicI64>,
        refreshes: Arc<AtomicUsize>,
    ) -> AuxiliaryCell {
        sum.store(2, Ordering::Relaxed);
        let mut cell = AuxiliaryCell::new(Box::new(RunningSum {
            scope: vec![VariableId::new(0), VariableId::new(2)],
            sum,
            refreshes,
        }));
        cell.make_variable_id_mapping(0, &vars[0]);
        cell.make_variable_id_mapping(2, &vars[2]);
        cell
    }

    #[test]
    fn test_update_variable_feeds_watched_changes() {
        let vars = variables();
        let sum = Arc::new(AtomicI64::new(0));
        let refreshes = Arc::new(AtomicUsize::new(0));
        let mut cell = bound_cell(&vars, Arc::clone(&sum), refreshes);

        cell.update_variable(0, 5);
        cell.update_variable(1, 9); // unwatched, ignored
        cell.update_variable(2, 2);

        // Starting sum 2, +4 for variable 0, +1 for variable 2.
        assert_eq!(sum.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn test_refresh_rebuilds_from_engine_state() {
        let mut vars = variables();
        let sum = Arc::new(AtomicI64::new(0));
        let refreshes = Arc::new(AtomicUsize::new(0));
        let mut cell = bound_cell(&vars, Arc::clone(&sum), Arc::clone(&refreshes));

        vars[0].set_value(7).unwrap();
        vars[2].set_value(3).unwrap();
        cell.refresh(&vars);

        assert_eq!(sum.load(Ordering::Relaxed), 10);
        assert_eq!(refreshes.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_null_cell_ignores_everything() {
        let vars = variables();
        let mut cell = AuxiliaryCell::null();
        cell.update_variable(0, 5);
        cell.refresh(&vars);
    }
}
