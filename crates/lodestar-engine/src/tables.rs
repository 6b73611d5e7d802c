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

//! Error bookkeeping.
//!
//! The tables the search consults every iteration, built once per unit:
//!
//! - `constraint_errors[c]` — current error of constraint `c`.
//! - `variable_errors[v]` — sum of `constraint_errors` over the constraints
//!   watching `v`.
//! - `non_tabu_errors[v]` — `variable_errors[v]` masked to zero for frozen
//!   variables.
//! - the incidence matrix `variable -> constraints` and its transpose.
//!
//! After a committed move only the affected constraints are re-evaluated;
//! their watchers' per-variable sums are then rebuilt exactly from the
//! constraint table, so the tables never accumulate drift against the
//! constraints' own view of the world.

use fixedbitset::FixedBitSet;
use lodestar_model::{error::SolverError, model::Model};

use crate::tabu::WeakTabuList;

/// Per-constraint and per-variable error tables plus incidence.
#[derive(Debug, Clone)]
pub struct ErrorTables {
    constraint_errors: Vec<f64>,
    variable_errors: Vec<f64>,
    non_tabu_errors: Vec<f64>,
    /// `incidence[v]` — constraints watching variable `v`.
    incidence: Vec<Vec<usize>>,
    /// `watchers[c]` — variables watched by constraint `c`.
    watchers: Vec<Vec<usize>>,
    total_error: f64,
    /// Scratch for deduplicating watcher sets during commits.
    touched: FixedBitSet,
}

impl ErrorTables {
    /// Builds the incidence structures from a model and zero-filled tables.
    ///
    /// Call [`ErrorTables::recompute`] before the first read.
    pub fn build(model: &Model) -> Self {
        let n = model.len();
        let m = model.constraints.len();

        let mut incidence = vec![Vec::new(); n];
        for (v, variable) in model.variables.iter().enumerate() {
            for (c, cell) in model.constraints.iter().enumerate() {
                if cell.has_variable(variable.original_id()) {
                    incidence[v].push(c);
                }
            }
        }
        let watchers: Vec<Vec<usize>> = model
            .constraints
            .iter()
            .map(|cell| cell.watched_engine_ids().to_vec())
            .collect();

        Self {
            constraint_errors: vec![0.0; m],
            variable_errors: vec![0.0; n],
            non_tabu_errors: vec![0.0; n],
            incidence,
            watchers,
            total_error: 0.0,
            touched: FixedBitSet::with_capacity(n),
        }
    }

    /// Constraints watching `variable`.
    #[inline(always)]
    pub fn constraints_of(&self, variable: usize) -> &[usize] {
        &self.incidence[variable]
    }

    /// Current error of a constraint.
    #[inline(always)]
    pub fn constraint_error(&self, constraint: usize) -> f64 {
        self.constraint_errors[constraint]
    }

    /// Aggregated error of a variable.
    #[inline(always)]
    pub fn variable_error(&self, variable: usize) -> f64 {
        self.variable_errors[variable]
    }

    /// Aggregated error of a variable, masked to zero while it is frozen.
    #[inline(always)]
    pub fn non_tabu_error(&self, variable: usize) -> f64 {
        self.non_tabu_errors[variable]
    }

    /// The current total satisfaction error.
    #[inline(always)]
    pub fn total_error(&self) -> f64 {
        self.total_error
    }

    /// Recomputes every table from scratch: refreshes each constraint cell,
    /// rebuilds the per-variable sums and the total.
    pub fn recompute(&mut self, model: &mut Model, tabu: &WeakTabuList) -> Result<(), SolverError> {
        let mut total = 0.0;
        for (c, cell) in model.constraints.iter_mut().enumerate() {
            let error = cell.refresh_error()?;
            self.constraint_errors[c] = error;
            total += error;
        }
        self.total_error = total;

        for v in 0..self.variable_errors.len() {
            self.variable_errors[v] = self.incidence[v]
                .iter()
                .map(|&c| self.constraint_errors[c])
                .sum();
        }
        self.refresh_non_tabu(tabu);
        Ok(())
    }

    /// Installs a re-evaluated constraint error, folding the difference into
    /// the running total. Per-variable sums are rebuilt afterwards through
    /// [`ErrorTables::rebuild_variable_errors`].
    #[inline]
    pub fn commit_constraint_error(&mut self, constraint: usize, new_error: f64) {
        let diff = new_error - self.constraint_errors[constraint];
        self.constraint_errors[constraint] = new_error;
        self.total_error += diff;
        if self.total_error < 0.0 {
            // Incremental float residue; the true total is nonnegative.
            self.total_error = 0.0;
        }
    }

    /// Rebuilds `variable_errors` for every watcher of the given constraints,
    /// exactly, from the constraint table.
    pub fn rebuild_variable_errors(&mut self, constraints: &[usize]) {
        self.touched.clear();
        for &c in constraints {
            for &v in &self.watchers[c] {
                self.touched.insert(v);
            }
        }
        for v in self.touched.ones() {
            self.variable_errors[v] = self.incidence[v]
                .iter()
                .map(|&c| self.constraint_errors[c])
                .sum();
        }
    }

    /// Re-derives the tabu-masked table from the per-variable sums.
    pub fn refresh_non_tabu(&mut self, tabu: &WeakTabuList) {
        for v in 0..self.variable_errors.len() {
            self.non_tabu_errors[v] = if tabu.is_tabu(v) {
                0.0
            } else {
                self.variable_errors[v]
            };
        }
    }

    /// Collects the variables attaining the maximum aggregated error into
    /// `out`. When `mask_tabu` holds, frozen variables are excluded from the
    /// competition entirely (weak tabu: the caller only masks when at least
    /// one variable is free).
    pub fn worst_variables(&self, mask_tabu: bool, tabu: &WeakTabuList, out: &mut Vec<usize>) {
        out.clear();
        let mut worst = 0.0;
        for v in 0..self.variable_errors.len() {
            if mask_tabu && tabu.is_tabu(v) {
                continue;
            }
            let error = self.variable_errors[v];
            if error > worst {
                worst = error;
                out.clear();
                out.push(v);
            } else if error == worst {
                out.push(v);
            }
        }
    }

    /// Debug-build consistency check of the table invariants against the
    /// model's constraint cells.
    pub fn debug_check(&self, model: &Model) {
        if cfg!(debug_assertions) {
            for (c, cell) in model.constraints.iter().enumerate() {
                let fresh = cell
                    .compute_error()
                    .expect("constraint error became invalid between commits");
                debug_assert!(
                    (self.constraint_errors[c] - fresh).abs() <= 1.0e-9,
                    "constraint error table out of sync for constraint {c}: table {} vs fresh {fresh}",
                    self.constraint_errors[c]
                );
            }
            for v in 0..self.variable_errors.len() {
                let sum: f64 = self.incidence[v]
                    .iter()
                    .map(|&c| self.constraint_errors[c])
                    .sum();
                debug_assert!(
                    (self.variable_errors[v] - sum).abs() <= 1.0e-9,
                    "variable error table out of sync for variable {v}"
                );
            }
            let total: f64 = self.constraint_errors.iter().sum();
            debug_assert!(
                (self.total_error - total).abs() <= 1.0e-6,
                "total error out of sync: running {} vs exact {total}",
                self.total_error
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestar_model::{
        constraint::Constraint,
        domain::Domain,
        index::VariableId,
        variable::Variable,
    };

    struct PairDiffers {
        scope: Vec<VariableId>,
    }

    impl Constraint for PairDiffers {
        fn variables(&self) -> &[VariableId] {
            &self.scope
        }

        fn error(&self, assignment: &[Variable]) -> f64 {
            if assignment[0].value() == assignment[1].value() {
                1.0
            } else {
                0.0
            }
        }
    }

    fn model() -> Model {
        let variables: Vec<Variable> = (0..3)
            .map(|i| Variable::new(VariableId::new(i), format!("v{i}"), Domain::range(0, 3), 0))
            .collect();
        let constraints: Vec<Box<dyn Constraint>> = vec![
            Box::new(PairDiffers {
                scope: vec![VariableId::new(0), VariableId::new(1)],
            }),
            Box::new(PairDiffers {
                scope: vec![VariableId::new(1), VariableId::new(2)],
            }),
        ];
        Model::new(variables, constraints, None, None).unwrap()
    }

    #[test]
    fn test_build_and_recompute() {
        let mut model = model();
        let tabu = WeakTabuList::new(3, 1, 2);
        let mut tables = ErrorTables::build(&model);
        tables.recompute(&mut model, &tabu).unwrap();

        // All variables start at 0: both pair constraints are violated.
        assert_eq!(tables.total_error(), 2.0);
        assert_eq!(tables.constraint_error(0), 1.0);
        assert_eq!(tables.variable_error(0), 1.0);
        assert_eq!(tables.variable_error(1), 2.0); // watched by both
        assert_eq!(tables.variable_error(2), 1.0);
        assert_eq!(tables.constraints_of(1), &[0, 1]);
        tables.debug_check(&model);
    }

    #[test]
    fn test_commit_and_rebuild_track_changes() {
        let mut model = model();
        let tabu = WeakTabuList::new(3, 1, 2);
        let mut tables = ErrorTables::build(&model);
        tables.recompute(&mut model, &tabu).unwrap();

        // Move variable 0 to value 1: constraint 0 becomes satisfied.
        model.variables[0].set_value(1).unwrap();
        model.constraints[0].update_variable(0, 1);
        let new_error = model.constraints[0].refresh_error().unwrap();
        tables.commit_constraint_error(0, new_error);
        tables.rebuild_variable_errors(&[0]);

        assert_eq!(tables.total_error(), 1.0);
        assert_eq!(tables.variable_error(0), 0.0);
        assert_eq!(tables.variable_error(1), 1.0);
        tables.debug_check(&model);
    }

    #[test]
    fn test_worst_variables_collects_all_ties() {
        let mut model = model();
        let tabu = WeakTabuList::new(3, 1, 2);
        let mut tables = ErrorTables::build(&model);
        tables.recompute(&mut model, &tabu).unwrap();

        let mut worst = Vec::new();
        tables.worst_variables(false, &tabu, &mut worst);
        assert_eq!(worst, vec![1], "variable 1 is watched by both violated constraints");
    }

    #[test]
    fn test_worst_variables_masks_frozen() {
        let mut model = model();
        let mut tabu = WeakTabuList::new(3, 1, 5);
        let mut tables = ErrorTables::build(&model);
        tables.recompute(&mut model, &tabu).unwrap();

        tabu.mark_local_min(1);
        tables.refresh_non_tabu(&tabu);
        assert_eq!(tables.non_tabu_error(1), 0.0);

        let mut worst = Vec::new();
        tables.worst_variables(true, &tabu, &mut worst);
        assert_eq!(worst, vec![0, 2], "frozen variable 1 must not compete");
    }
}
